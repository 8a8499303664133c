pub mod file_storage;
pub mod memory_storage;

use crate::Result;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Durable string key-value storage, outliving a single session.
pub trait Storage {
    /// Look up the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Create or update an entry and persist it.
    fn set_item(&mut self, key: &str, value: String) -> Result<()>;

    /// Remove an entry if present and persist the removal.
    /// Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;

    /// Remove every entry.
    fn clear(&mut self) -> Result<()>;

    /// Keys currently stored, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
