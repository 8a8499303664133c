use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Storage;
use crate::{PortfolioError, Result};

const STORAGE_VERSION: i32 = 1;

/// Key-value storage persisted to a single JSON file.
///
/// Every mutation is written through immediately, so the file is always
/// the source of truth for the next session.
///
/// A file that cannot be read does not prevent opening: reads report the
/// failure until a successful write replaces the file.
pub struct FileStorage {
    label: String,
    path: PathBuf,
    data: FileStorageData,
    unreadable: Option<String>,
}

/// The data serialized to and from disk.
#[derive(Serialize, Deserialize)]
struct FileStorageData {
    version: i32,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the storage at `path` with a diagnostic label.
    ///
    /// A missing file is an empty storage; it is created on first write.
    pub fn open(label: impl Into<String>, path: &Path) -> Self {
        let mut storage = Self {
            label: label.into(),
            path: PathBuf::from(path),
            data: FileStorageData {
                version: STORAGE_VERSION,
                entries: BTreeMap::new(),
            },
            unreadable: None,
        };
        match storage.read_fs() {
            Ok(entries) => storage.data.entries = entries,
            Err(e) => {
                log::warn!(
                    "{} could not be read from {:?}: {}",
                    storage.label,
                    storage.path,
                    e
                );
                storage.unreadable = Some(e.to_string());
            }
        }
        storage
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the entries currently on disk.
    pub fn read_fs(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            log::debug!("{} has no file at {:?} yet", self.label, self.path);
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let data: FileStorageData =
            serde_json::from_str(&content).map_err(|err| {
                PortfolioError::Storage(self.label.clone(), err.to_string())
            })?;
        if data.version != STORAGE_VERSION {
            return Err(PortfolioError::Storage(
                self.label.clone(),
                format!(
                    "Storage version mismatch: expected {}, got {}",
                    STORAGE_VERSION, data.version
                ),
            ));
        }
        Ok(data.entries)
    }

    fn ensure_readable(&self) -> Result<()> {
        match &self.unreadable {
            Some(reason) => Err(PortfolioError::Storage(
                self.label.clone(),
                reason.clone(),
            )),
            None => Ok(()),
        }
    }

    /// Persist the in-memory entries, replacing the file atomically.
    fn write_fs(&mut self) -> Result<()> {
        let parent_dir = self.path.parent().ok_or_else(|| {
            PortfolioError::Storage(
                self.label.clone(),
                "Failed to get parent directory".to_owned(),
            )
        })?;
        fs::create_dir_all(parent_dir)?;

        let tmp_path =
            parent_dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let content = serde_json::to_string(&self.data)?;
        fs::write(&tmp_path, content)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }

        self.unreadable = None;
        log::info!(
            "{} {} entries have been written",
            self.label,
            self.data.entries.len()
        );
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.ensure_readable()?;
        Ok(self.data.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let previous = self.data.entries.insert(key.to_owned(), value);
        if let Err(err) = self.write_fs() {
            match previous {
                Some(value) => self.data.entries.insert(key.to_owned(), value),
                None => self.data.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if let Some(previous) = self.data.entries.remove(key) {
            if let Err(err) = self.write_fs() {
                self.data.entries.insert(key.to_owned(), previous);
                return Err(err);
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.data.entries);
        if let Err(err) = self.write_fs() {
            self.data.entries = previous;
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.ensure_readable()?;
        Ok(self.data.entries.keys().cloned().collect())
    }
}
