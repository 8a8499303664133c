use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use url::Url;
use uuid::Uuid;

use crate::{PortfolioError, Result};

/// Directory where decoded overrides are materialised as openable files.
///
/// Content lives as long as the spool: everything still published is
/// deleted when it is dropped, and a session directory created by
/// [`BlobSpool::in_temp_dir`] is removed with it.
#[derive(Debug)]
pub struct BlobSpool {
    root: PathBuf,
    owns_root: bool,
    published: Mutex<Vec<PathBuf>>,
}

/// Short-lived reference to binary content published by a [`BlobSpool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub url: Url,
    pub path: PathBuf,
    pub mime: String,
}

impl BlobSpool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            owns_root: false,
            published: Mutex::new(Vec::new()),
        }
    }

    /// Spool in a fresh per-session directory under the system temporary
    /// directory.
    pub fn in_temp_dir() -> Self {
        let root = std::env::temp_dir()
            .join("portfolio-blobs")
            .join(Uuid::new_v4().to_string());
        Self {
            root,
            owns_root: true,
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a fresh file and hand out a reference to it.
    /// Every call yields a distinct handle, even for identical content.
    pub fn publish(
        &self,
        mime: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<BlobHandle> {
        fs::create_dir_all(&self.root)?;
        let root = fs::canonicalize(&self.root)?;
        let path = root.join(format!("{}.{}", Uuid::new_v4(), extension));
        fs::write(&path, bytes)?;
        self.published().push(path.clone());

        let url = Url::from_file_path(&path).map_err(|_| {
            PortfolioError::Path(format!(
                "{} cannot be expressed as a URL",
                path.display()
            ))
        })?;
        log::trace!("published {} bytes of {} at {}", bytes.len(), mime, url);

        Ok(BlobHandle {
            url,
            path,
            mime: mime.to_owned(),
        })
    }

    /// Delete the content behind a handle. Revoking twice is harmless.
    pub fn revoke(&self, handle: &BlobHandle) -> Result<()> {
        self.published().retain(|path| path != &handle.path);
        remove(&handle.path)
    }

    /// Number of handles published and not yet revoked.
    pub fn live(&self) -> usize {
        self.published().len()
    }

    fn published(&self) -> std::sync::MutexGuard<'_, Vec<PathBuf>> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for BlobSpool {
    fn drop(&mut self) {
        let published = std::mem::take(&mut *self.published());
        for path in published {
            if let Err(e) = remove(&path) {
                log::warn!("failed to release {}: {}", path.display(), e);
            }
        }
        if self.owns_root {
            if let Err(e) = fs::remove_dir_all(&self.root) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!(
                        "failed to remove spool {}: {}",
                        self.root.display(),
                        e
                    );
                }
            }
        }
    }
}

fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl BlobHandle {
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn publish_yields_distinct_openable_handles() {
        let dir = TempDir::new("spool").unwrap();
        let spool = BlobSpool::new(dir.path().join("blobs"));

        let first = spool.publish("application/pdf", "pdf", b"%PDF-1.4").unwrap();
        let second =
            spool.publish("application/pdf", "pdf", b"%PDF-1.4").unwrap();

        assert_ne!(first.url, second.url);
        assert_eq!(first.url.scheme(), "file");
        assert_eq!(first.read().unwrap(), second.read().unwrap());
        assert_eq!(first.url.to_file_path().unwrap(), first.path);
    }

    #[test]
    fn revoke_removes_content() {
        let dir = TempDir::new("spool").unwrap();
        let spool = BlobSpool::new(dir.path());

        let handle = spool.publish("image/png", "png", &[1, 2, 3]).unwrap();
        assert_eq!(spool.live(), 1);
        spool.revoke(&handle).unwrap();
        assert!(!handle.path.exists());
        assert_eq!(spool.live(), 0);
        assert!(spool.revoke(&handle).is_ok());
    }

    #[test]
    fn dropping_spool_releases_published_content() {
        let dir = TempDir::new("spool").unwrap();
        let spool = BlobSpool::new(dir.path().join("blobs"));
        let handles: Vec<_> = (0..3)
            .map(|_| spool.publish("image/png", "png", &[7, 7]).unwrap())
            .collect();

        drop(spool);

        assert!(handles.iter().all(|handle| !handle.path.exists()));
        assert_eq!(fs::read_dir(dir.path().join("blobs")).unwrap().count(), 0);
    }

    #[test]
    fn session_spool_removes_its_directory() {
        let spool = BlobSpool::in_temp_dir();
        let other = BlobSpool::in_temp_dir();
        assert_ne!(spool.root(), other.root());

        let handle = spool.publish("application/pdf", "pdf", b"%PDF").unwrap();
        let root = fs::canonicalize(spool.root()).unwrap();
        assert!(handle.path.starts_with(&root));

        drop(spool);
        assert!(!root.exists());
    }
}
