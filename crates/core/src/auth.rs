//! Auth status oracle.
//!
//! Answers "is someone signed in, and who" from the credentials persisted in
//! client storage. Holding a token is what counts as signed in; the token is
//! not verified here.

use serde::Serialize;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Snapshot of the client's sign-in state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

/// Reads and writes the persisted credentials.
#[derive(Debug)]
pub struct AuthOracle<S> {
    storage: S,
}

impl<S: KeyValueStore> AuthOracle<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Current sign-in state. Unreadable storage counts as signed out.
    pub fn status(&self) -> AuthStatus {
        let read = |key| {
            self.storage.get(key).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Failed to read credentials");
                None
            })
        };
        let token = read(keys::TOKEN).filter(|t| !t.is_empty());
        AuthStatus {
            is_authenticated: token.is_some(),
            username: read(keys::USERNAME),
        }
    }

    /// Bearer token for authenticated requests, if signed in.
    pub fn token(&self) -> Option<String> {
        self.storage
            .get(keys::TOKEN)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }

    /// Persist credentials after a successful login.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either value cannot be written.
    pub fn sign_in(&self, token: &str, username: &str) -> Result<(), StorageError> {
        self.storage.set(keys::TOKEN, token)?;
        self.storage.set(keys::USERNAME, username)?;
        tracing::debug!(username, "Signed in");
        Ok(())
    }

    /// Remove all persisted credentials, including legacy admin keys.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a key cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in [
            keys::TOKEN,
            keys::USERNAME,
            keys::LEGACY_ADMIN,
            keys::LEGACY_ADMIN_TOKEN,
        ] {
            self.storage.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_signed_out_by_default() {
        let store = MemoryStore::new();
        let oracle = AuthOracle::new(&store);
        assert_eq!(oracle.status(), AuthStatus::default());
        assert_eq!(oracle.token(), None);
    }

    #[test]
    fn test_sign_in_then_status() {
        let store = MemoryStore::new();
        let oracle = AuthOracle::new(&store);
        oracle.sign_in("abc", "weaver").unwrap();

        assert_eq!(
            oracle.status(),
            AuthStatus {
                is_authenticated: true,
                username: Some("weaver".to_owned()),
            }
        );
        assert_eq!(oracle.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_presence_decides() {
        let store = MemoryStore::new();
        store.set(keys::USERNAME, "weaver").unwrap();
        let oracle = AuthOracle::new(&store);
        assert!(!oracle.status().is_authenticated);

        store.set(keys::TOKEN, "t").unwrap();
        assert!(oracle.status().is_authenticated);
    }

    #[test]
    fn test_clear_removes_all_credential_keys() {
        let store = MemoryStore::new();
        store.set(keys::CART, "[]").unwrap();
        store.set(keys::LEGACY_ADMIN, "true").unwrap();
        store.set(keys::LEGACY_ADMIN_TOKEN, "x").unwrap();
        let oracle = AuthOracle::new(&store);
        oracle.sign_in("abc", "weaver").unwrap();

        oracle.clear().unwrap();

        assert_eq!(oracle.status(), AuthStatus::default());
        assert_eq!(store.len(), 1);
        assert!(store.get(keys::CART).unwrap().is_some());
    }
}
