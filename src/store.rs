//! The asset override store.
//!
//! Owns the current [`AssetState`], keeps it in step with durable storage
//! and turns records into something consumers can open, save or render.
//!
//! Storage is the source of truth across sessions: the store reads it once
//! in [`AssetStore::load`] and writes it on every successful
//! [`AssetStore::set`]. A reset only clears storage and asks the host to
//! reload, which runs `load` again against the now empty keys.
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::actions::Shell;
use crate::asset::{AssetDefaults, AssetKind, AssetRecord, AssetState};
use crate::blob::{BlobHandle, BlobSpool};
use crate::data_uri::{self, EncodedBlob};
use crate::storage::Storage;
use crate::{PortfolioError, Result};

/// Something a consumer can use in place of an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAsset {
    /// The configured reference, usable as-is.
    Reference(String),
    /// No asset is configured and none was provided.
    Absent,
    /// Decoded override content.
    Handle(BlobHandle),
    /// The override could not be decoded; the raw stored string.
    Encoded(String),
}

impl ResolvedAsset {
    /// A string usable as a link or image source.
    pub fn as_source(&self) -> Option<&str> {
        match self {
            ResolvedAsset::Reference(reference) => Some(reference),
            ResolvedAsset::Absent => None,
            ResolvedAsset::Handle(handle) => Some(handle.url.as_str()),
            ResolvedAsset::Encoded(raw) => Some(raw),
        }
    }
}

pub struct AssetStore<S: Storage> {
    storage: S,
    defaults: AssetDefaults,
    spool: BlobSpool,
    state: AssetState,
}

pub type SharedAssetStore<S> = Arc<Mutex<AssetStore<S>>>;

impl<S: Storage> AssetStore<S> {
    /// Build the initial state from storage. Never fails: a missing, empty
    /// or unreadable entry yields the configured default for its kind.
    pub fn load(storage: S, defaults: AssetDefaults, spool: BlobSpool) -> Self {
        let photo = Self::initial_record(&storage, &defaults, AssetKind::Photo);
        let resume =
            Self::initial_record(&storage, &defaults, AssetKind::Resume);

        Self {
            storage,
            defaults,
            spool,
            state: AssetState { photo, resume },
        }
    }

    fn initial_record(
        storage: &S,
        defaults: &AssetDefaults,
        kind: AssetKind,
    ) -> AssetRecord {
        match storage.get_item(kind.storage_key()) {
            Ok(Some(stored)) if !stored.is_empty() => {
                log::debug!("{} override restored from storage", kind);
                AssetRecord::Override {
                    data: EncodedBlob::from(stored),
                }
            }
            Ok(_) => defaults.get(kind).clone(),
            Err(e) => {
                log::warn!(
                    "{} override could not be read, using default: {}",
                    kind,
                    e
                );
                defaults.get(kind).clone()
            }
        }
    }

    pub fn state(&self) -> &AssetState {
        &self.state
    }

    pub fn record(&self, kind: AssetKind) -> &AssetRecord {
        self.state.get(kind)
    }

    pub fn defaults(&self) -> &AssetDefaults {
        &self.defaults
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn spool(&self) -> &BlobSpool {
        &self.spool
    }

    /// Read a picked file and encode it, without touching any state.
    pub async fn read_override(
        kind: AssetKind,
        path: &Path,
    ) -> Result<EncodedBlob> {
        let bytes = tokio::fs::read(path).await?;
        let mime = data_uri::mime_for_path(path, &bytes);
        log::debug!(
            "read {} bytes of {} for {} from {}",
            bytes.len(),
            mime,
            kind,
            path.display()
        );
        Ok(data_uri::encode(&mime, &bytes))
    }

    /// Make `data` the override for `kind`: storage first, then memory, so a
    /// failed write leaves both untouched.
    pub fn apply(&mut self, kind: AssetKind, data: EncodedBlob) -> Result<()> {
        self.storage
            .set_item(kind.storage_key(), data.as_str().to_owned())?;
        self.state.replace(kind, AssetRecord::Override { data });
        log::info!("{} override stored", kind);
        Ok(())
    }

    /// Replace the asset for `kind` with the file at `path`.
    ///
    /// On failure the previous record and storage entry are kept and the
    /// error is logged once before being returned.
    pub async fn set(&mut self, kind: AssetKind, path: &Path) -> Result<()> {
        let outcome = match Self::read_override(kind, path).await {
            Ok(data) => self.apply(kind, data),
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            log_rejected(kind, path, e);
        }
        outcome
    }

    /// Drop every override from storage and ask the host to reload.
    ///
    /// In-memory state is left as it is; the reload rebuilds it.
    pub fn reset<H: Shell + ?Sized>(&mut self, shell: &mut H) -> Result<()> {
        for kind in AssetKind::ALL {
            self.storage.remove_item(kind.storage_key())?;
        }
        log::info!("asset overrides cleared, reloading");
        shell.reload();
        Ok(())
    }

    /// Turn the current record for `kind` into something a consumer can use.
    ///
    /// Overrides are decoded into a fresh handle on every call. If decoding
    /// fails the raw stored string is returned instead.
    pub fn resolve(&self, kind: AssetKind) -> ResolvedAsset {
        match self.state.get(kind) {
            AssetRecord::Default { reference } => {
                ResolvedAsset::Reference(reference.clone())
            }
            AssetRecord::Absent => ResolvedAsset::Absent,
            AssetRecord::Override { data } => {
                match self.publish(kind, data) {
                    Ok(handle) => ResolvedAsset::Handle(handle),
                    Err(e) => {
                        log::error!(
                            "{} override could not be converted, \
                             falling back to the encoded value: {}",
                            kind,
                            e
                        );
                        ResolvedAsset::Encoded(data.as_str().to_owned())
                    }
                }
            }
        }
    }

    fn publish(&self, kind: AssetKind, data: &EncodedBlob) -> Result<BlobHandle> {
        let decoded = data_uri::decode(data)?;
        let extension = data_uri::extension_for_mime(&decoded.mime)
            .unwrap_or_else(|| kind.fallback_extension());
        self.spool.publish(&decoded.mime, extension, &decoded.bytes)
    }
}

impl<S: Storage + Send + 'static> AssetStore<S> {
    /// Fire-and-forget [`AssetStore::set`] for UI callers.
    ///
    /// The file is read without holding the lock; only the final update is
    /// serialized, so for a given kind the last completed read wins. Failures
    /// are logged once and leave the store as it was.
    pub fn spawn_set(
        store: SharedAssetStore<S>,
        kind: AssetKind,
        path: impl AsRef<Path> + Send + 'static,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let path: &Path = path.as_ref();
            let outcome = match Self::read_override(kind, path).await {
                Ok(data) => store.lock().await.apply(kind, data),
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                log_rejected(kind, path, &e);
            }
        })
    }
}

fn log_rejected(kind: AssetKind, path: &Path, e: &PortfolioError) {
    log::error!(
        "{} override from {} was not applied: {}",
        kind,
        path.display(),
        e
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::RecordingShell;
    use crate::storage::{FileStorage, MemoryStorage};
    use rstest::rstest;
    use tempdir::TempDir;

    const PHOTO: &str = "https://example.org/me.jpg";

    fn defaults() -> AssetDefaults {
        AssetDefaults::new(PHOTO, "#")
    }

    fn store_with(
        storage: MemoryStorage,
        dir: &TempDir,
    ) -> AssetStore<MemoryStorage> {
        AssetStore::load(storage, defaults(), BlobSpool::new(dir.path()))
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let dir = TempDir::new("store").unwrap();
        let store = store_with(MemoryStorage::new(), &dir);

        assert_eq!(
            store.record(AssetKind::Photo),
            &AssetRecord::Default {
                reference: PHOTO.to_owned()
            }
        );
        assert_eq!(store.record(AssetKind::Resume), &AssetRecord::Absent);
    }

    #[rstest]
    #[case(AssetKind::Photo)]
    #[case(AssetKind::Resume)]
    fn stored_entry_loads_as_override(#[case] kind: AssetKind) {
        let dir = TempDir::new("store").unwrap();
        let mut storage = MemoryStorage::new();
        storage
            .set_item(kind.storage_key(), "data:x/y;base64,AA==".to_owned())
            .unwrap();

        let store = store_with(storage, &dir);
        assert_eq!(
            store.record(kind),
            &AssetRecord::Override {
                data: EncodedBlob::from("data:x/y;base64,AA==")
            }
        );
    }

    #[test]
    fn empty_entry_is_treated_as_absent() {
        let dir = TempDir::new("store").unwrap();
        let mut storage = MemoryStorage::new();
        storage
            .set_item(AssetKind::Photo.storage_key(), String::new())
            .unwrap();

        let store = store_with(storage, &dir);
        assert!(!store.record(AssetKind::Photo).is_override());
    }

    #[test_log::test]
    fn unreadable_storage_loads_defaults() {
        let dir = TempDir::new("store").unwrap();
        let path = dir.path().join("assets.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = AssetStore::load(
            FileStorage::open("assets", &path),
            defaults(),
            BlobSpool::new(dir.path().join("blobs")),
        );

        assert_eq!(
            store.state(),
            &AssetState {
                photo: defaults().photo,
                resume: AssetRecord::Absent,
            }
        );
    }

    #[test]
    fn default_resolves_to_reference() {
        let dir = TempDir::new("store").unwrap();
        let store = store_with(MemoryStorage::new(), &dir);

        assert_eq!(
            store.resolve(AssetKind::Photo),
            ResolvedAsset::Reference(PHOTO.to_owned())
        );
        assert_eq!(store.resolve(AssetKind::Resume), ResolvedAsset::Absent);
    }

    #[test]
    fn malformed_override_falls_back_to_raw() {
        let dir = TempDir::new("store").unwrap();
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                AssetKind::Resume.storage_key(),
                "not a data uri".to_owned(),
            )
            .unwrap();

        let store = store_with(storage, &dir);
        assert_eq!(
            store.resolve(AssetKind::Resume),
            ResolvedAsset::Encoded("not a data uri".to_owned())
        );
    }

    #[test]
    fn override_resolves_to_fresh_handles() {
        let dir = TempDir::new("store").unwrap();
        let mut store = store_with(MemoryStorage::new(), &dir);
        store
            .apply(
                AssetKind::Resume,
                data_uri::encode("application/pdf", b"%PDF-1.7"),
            )
            .unwrap();

        let (first, second) = match (
            store.resolve(AssetKind::Resume),
            store.resolve(AssetKind::Resume),
        ) {
            (ResolvedAsset::Handle(a), ResolvedAsset::Handle(b)) => (a, b),
            other => panic!("expected handles, got {:?}", other),
        };
        assert_ne!(first.url, second.url);
        assert_eq!(first.read().unwrap(), b"%PDF-1.7");
        assert_eq!(first.read().unwrap(), second.read().unwrap());
        assert!(first.path.extension().is_some_and(|ext| ext == "pdf"));
    }

    #[test]
    fn dropping_store_releases_handles() {
        let dir = TempDir::new("store").unwrap();
        let spool_dir = dir.path().join("blobs");
        let mut store = AssetStore::load(
            MemoryStorage::new(),
            defaults(),
            BlobSpool::new(&spool_dir),
        );
        store
            .apply(
                AssetKind::Resume,
                data_uri::encode("application/pdf", b"%PDF-1.7"),
            )
            .unwrap();

        for _ in 0..5 {
            assert!(matches!(
                store.resolve(AssetKind::Resume),
                ResolvedAsset::Handle(_)
            ));
        }
        assert_eq!(store.spool().live(), 5);

        drop(store);
        assert_eq!(std::fs::read_dir(&spool_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn set_writes_storage_and_state() {
        let dir = TempDir::new("store").unwrap();
        let picked = dir.path().join("portrait.png");
        std::fs::write(&picked, [1u8, 2, 3]).unwrap();

        let mut store = store_with(MemoryStorage::new(), &dir);
        store.set(AssetKind::Photo, &picked).await.unwrap();

        let stored = store
            .storage()
            .get_item(AssetKind::Photo.storage_key())
            .unwrap()
            .unwrap();
        assert_eq!(stored, "data:image/png;base64,AQID");
        assert!(store.record(AssetKind::Photo).is_override());
        assert_eq!(store.record(AssetKind::Resume), &AssetRecord::Absent);
    }

    #[test_log::test(tokio::test)]
    async fn failed_read_changes_nothing() {
        let dir = TempDir::new("store").unwrap();
        let mut store = store_with(MemoryStorage::new(), &dir);
        let before = store.state().clone();

        let result = store
            .set(AssetKind::Resume, &dir.path().join("missing.pdf"))
            .await;

        assert!(result.is_err());
        assert_eq!(store.state(), &before);
        assert!(store.storage().is_empty());
    }

    #[test]
    fn reset_clears_storage_and_reloads() {
        let dir = TempDir::new("store").unwrap();
        let mut store = store_with(MemoryStorage::new(), &dir);
        for kind in AssetKind::ALL {
            store
                .apply(kind, data_uri::encode("image/png", &[0, 1]))
                .unwrap();
        }
        let mut shell = RecordingShell::default();

        store.reset(&mut shell).unwrap();

        assert_eq!(shell.reloads, 1);
        assert!(store.storage().is_empty());

        let reloaded = store_with(store.storage().clone(), &dir);
        assert_eq!(reloaded.state().photo, defaults().photo);
        assert_eq!(reloaded.state().resume, AssetRecord::Absent);
    }
}
