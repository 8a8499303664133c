use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path error: {0}")]
    Path(String),
    #[error("Parsing error")]
    Parse,
    #[error("Storage error: {0} {1}")]
    Storage(String, String),
    #[error("Decoding error: {0}")]
    Decode(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}

impl From<base64::DecodeError> for PortfolioError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Decode(e.to_string())
    }
}
