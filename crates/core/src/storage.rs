//! Client-local key/value storage port.
//!
//! The cart and the auth oracle persist plain string values under fixed keys.
//! One store is constructed per process and handed to both by reference, so
//! every method takes `&self`; implementations use interior mutability.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Keys used in client storage.
pub mod keys {
    /// Serialized cart line items.
    pub const CART: &str = "cart";

    /// Bearer token issued by the login endpoint.
    pub const TOKEN: &str = "token";

    /// Username of the signed-in user.
    pub const USERNAME: &str = "username";

    /// Legacy admin flag (only ever removed).
    pub const LEGACY_ADMIN: &str = "admin";

    /// Legacy admin token (only ever removed).
    pub const LEGACY_ADMIN_TOKEN: &str = "adminToken";
}

/// Errors that can occur when reading or writing client storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be decoded.
    #[error("storage data is corrupt: {0}")]
    Corrupt(String),

    /// A value could not be encoded.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A synchronous string key/value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_shared_by_reference() {
        let store = MemoryStore::new();
        let a = &store;
        let b = &store;
        a.set(keys::TOKEN, "t").unwrap();
        assert_eq!(b.get(keys::TOKEN).unwrap().as_deref(), Some("t"));
    }
}
