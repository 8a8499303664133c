//! Self-describing `data:<mime>;base64,<payload>` strings.
//!
//! Overrides are persisted in this form so a single storage value is enough
//! to reconstruct the original file together with its content type.
use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose, Engine};

use crate::{PortfolioError, Result};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

pub const OCTET_STREAM: &str = "application/octet-stream";

/// An encoded data URI. Values read back from storage are not validated,
/// so holding one does not guarantee it decodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedBlob(String);

impl EncodedBlob {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EncodedBlob {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EncodedBlob {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for EncodedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary content recovered from an [`EncodedBlob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn encode(mime: &str, bytes: &[u8]) -> EncodedBlob {
    let payload = general_purpose::STANDARD.encode(bytes);
    EncodedBlob(format!("{SCHEME}{mime}{BASE64_MARKER}{payload}"))
}

pub fn decode(blob: &EncodedBlob) -> Result<DecodedBlob> {
    let (header, payload) =
        blob.as_str().split_once(BASE64_MARKER).ok_or_else(|| {
            PortfolioError::Decode("missing base64 marker".to_owned())
        })?;
    let mime = header.strip_prefix(SCHEME).ok_or_else(|| {
        PortfolioError::Decode("missing data scheme".to_owned())
    })?;
    let mime = if mime.is_empty() { OCTET_STREAM } else { mime };

    let bytes = general_purpose::STANDARD.decode(payload.trim())?;
    Ok(DecodedBlob {
        mime: mime.to_owned(),
        bytes,
    })
}

/// Content type for a picked file: the extension decides first, then the
/// bytes are sniffed for a known image format.
pub fn mime_for_path(path: &Path, bytes: &[u8]) -> String {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_for_extension(&ext.to_ascii_lowercase()));
    if let Some(mime) = by_extension {
        return mime.to_owned();
    }

    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type().to_owned(),
        Err(_) => OCTET_STREAM.to_owned(),
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

/// File extension used when materialising content of the given type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let ext = match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/x-icon" => "ico",
        "image/avif" => "avif",
        "application/pdf" => "pdf",
        _ => return None,
    };
    Some(ext)
}
