//! Key/value persistence for client-side authentication state.
//!
//! The session and the pending OIDC attempt are each stored under their own
//! named key, the way a browser keeps them in local and session storage.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::Error;

pub mod encryption;
mod file;

pub use file::FileStorage;

/// Trait for storing string values under named keys.
///
/// Writes are synchronous so that session mutations complete before the
/// caller's next suspension point.
pub trait Storage: Send + Sync {
    /// Retrieve the value stored under `key`.
    ///
    /// # Returns
    ///
    /// `Some(value)` if found, `None` if not found.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete the value stored under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// In-memory storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("auth-storage").unwrap(), None);

        storage.set("auth-storage", "{}").unwrap();
        assert_eq!(storage.get("auth-storage").unwrap(), Some("{}".to_string()));

        storage.remove("auth-storage").unwrap();
        assert_eq!(storage.get("auth-storage").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_remove_missing_key() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("missing").is_ok());
    }
}
