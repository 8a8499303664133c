//! Behaviour behind a single-page portfolio site.
//!
//! The page owner can swap the profile photo and the resume for local files.
//! Those overrides live in durable key-value [`storage`] as data URIs and are
//! read back by the [`store::AssetStore`], which also turns them into
//! openable handles for the consumer [`actions`].
//!
//! ```no_run
//! use portfolio::{AssetKind, AssetStore, BlobSpool, FileStorage, SiteConfig};
//! # async fn example() -> portfolio::Result<()> {
//! let config = SiteConfig::load("site.toml".as_ref())?;
//! let storage = FileStorage::open("assets", "local/assets.json".as_ref());
//! let mut store =
//!     AssetStore::load(storage, config.asset_defaults(), BlobSpool::in_temp_dir());
//!
//! store.set(AssetKind::Resume, "cv.pdf".as_ref()).await?;
//! let resume = store.resolve(AssetKind::Resume);
//! # Ok(())
//! # }
//! ```
#[macro_use]
extern crate lazy_static;

pub mod actions;
pub mod asset;
pub mod blob;
pub mod config;
pub mod contact;
pub mod data_uri;
mod errors;
pub mod storage;
pub mod store;

pub use actions::{Outcome, Shell};
pub use asset::{AssetDefaults, AssetKind, AssetRecord, AssetState};
pub use blob::{BlobHandle, BlobSpool};
pub use config::SiteConfig;
pub use data_uri::EncodedBlob;
pub use errors::{PortfolioError, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{AssetStore, ResolvedAsset, SharedAssetStore};
