//! The session credential holder.

use crate::{MemoryStorage, SecureStorage, StorageError, StorageKeys, StorageResult};
use tracing::{debug, info};

/// Holds the bearer credential under a single well-known key.
///
/// One `TokenStore` is one session context: the HTTP client reads from it on
/// every request and the auth gate is the only writer. Share it with `Arc`.
pub struct TokenStore {
    storage: Box<dyn SecureStorage>,
}

impl TokenStore {
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Persist `credential`, replacing any previous one.
    pub fn set(&self, credential: &str) -> StorageResult<()> {
        if credential.trim().is_empty() {
            return Err(StorageError::InvalidValue(
                "refusing to store an empty credential".to_string(),
            ));
        }
        self.storage.set(StorageKeys::SESSION_TOKEN, credential)?;
        debug!("Session credential stored");
        Ok(())
    }

    /// Current credential, if any.
    pub fn get(&self) -> StorageResult<Option<String>> {
        Ok(self
            .storage
            .get(StorageKeys::SESSION_TOKEN)?
            .filter(|token| !token.is_empty()))
    }

    /// Remove the credential. Clearing an empty store is not an error.
    pub fn clear(&self) -> StorageResult<()> {
        if self.storage.delete(StorageKeys::SESSION_TOKEN)? {
            info!("Session credential cleared");
        }
        Ok(())
    }

    pub fn has_credential(&self) -> StorageResult<bool> {
        Ok(self.get()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileStorage;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_clear() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get().unwrap(), None);

        store.set("abc123").unwrap();
        assert_eq!(store.get().unwrap(), Some("abc123".to_string()));
        assert!(store.has_credential().unwrap());

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_set_replaces_previous_credential() {
        let store = TokenStore::in_memory();
        store.set("first").unwrap();
        store.set("second").unwrap();
        assert_eq!(store.get().unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_empty_credential_rejected() {
        let store = TokenStore::in_memory();
        assert!(store.set("   ").is_err());
        assert!(!store.has_credential().unwrap());
    }

    #[test]
    fn test_file_backed_store_is_durable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        TokenStore::new(Box::new(FileStorage::new(&path)))
            .set("abc123")
            .unwrap();

        let reopened = TokenStore::new(Box::new(FileStorage::new(&path)));
        assert_eq!(reopened.get().unwrap(), Some("abc123".to_string()));
    }

    #[test]
    fn test_sessions_are_independent() {
        let alice = TokenStore::in_memory();
        let bob = TokenStore::in_memory();

        alice.set("alice-token").unwrap();
        assert_eq!(bob.get().unwrap(), None);
    }
}
