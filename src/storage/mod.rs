//! Local key-value persistence
//!
//! String-keyed, string-valued storage backed by an embedded `sled`
//! database. Every write is flushed before returning, so the on-disk state
//! always matches the last completed mutation.

use crate::error::{McpbotError, Result};
use sled::Db;
use std::path::Path;
#[cfg(test)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub mod types;
pub use types::{keys, StoredSettings};

/// Persistent key-value store
///
/// # Examples
///
/// ```
/// use mcpbot::storage::KvStore;
///
/// # fn main() -> mcpbot::error::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let store = KvStore::open(dir.path().join("store"))?;
/// store.set("greeting", "hello")?;
/// assert_eq!(store.get("greeting")?, Some("hello".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KvStore {
    db: Db,
    #[cfg(test)]
    reject_writes: Arc<AtomicBool>,
}

impl KvStore {
    /// Open or create a store at `path`
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::Storage` if the database cannot be opened
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                McpbotError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| McpbotError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened key-value store at {}", path.display());
        Ok(Self {
            db,
            #[cfg(test)]
            reject_writes: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::Storage` if the read fails or the value is not UTF-8
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| McpbotError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    McpbotError::Storage(format!("Value for {} is not UTF-8: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Write a value and flush
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::Storage` if insertion or flushing fails
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| McpbotError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    /// Remove a value and flush; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns `McpbotError::Storage` if removal or flushing fails
    pub fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.db
            .remove(key.as_bytes())
            .map_err(|e| McpbotError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }

    /// Make every clone of this store fail writes until reset
    #[cfg(test)]
    pub(crate) fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(McpbotError::Storage("Writes rejected".to_string()).into());
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_writable(&self) -> Result<()> {
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| McpbotError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Helper: create a store backed by a temp directory.
    ///
    /// Returns the `TempDir` as well so the caller keeps it alive.
    fn create_test_store() -> (KvStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = KvStore::open(dir.path().join("store")).expect("failed to open store");
        (store, dir)
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.get("missing").expect("get failed"), None);
    }

    #[test]
    fn test_set_overwrites_value() {
        let (store, _dir) = create_test_store();
        store.set("k", "one").expect("set failed");
        store.set("k", "two").expect("set failed");
        assert_eq!(store.get("k").expect("get failed"), Some("two".to_string()));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store();
        store.set("k", "v").expect("set failed");
        store.remove("k").expect("first remove failed");
        store.remove("k").expect("second remove failed");
        assert_eq!(store.get("k").expect("get failed"), None);
    }

    #[test]
    fn test_rejected_writes_leave_value_untouched() {
        let (store, _dir) = create_test_store();
        store.set("k", "v").expect("set failed");
        store.set_reject_writes(true);

        assert!(store.set("k", "other").is_err());
        assert!(store.remove("k").is_err());
        assert_eq!(store.get("k").expect("get failed"), Some("v".to_string()));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("nested").join("store");
        {
            let store = KvStore::open(&path).expect("open failed");
            store.set(keys::MODEL, "gpt-4o").expect("set failed");
        }

        let reopened = KvStore::open(&path).expect("reopen failed");
        assert_eq!(
            reopened.get(keys::MODEL).expect("get failed"),
            Some("gpt-4o".to_string())
        );
    }
}
