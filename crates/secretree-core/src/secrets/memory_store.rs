//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// In-memory secret store for testing and local development
///
/// Secrets are scoped by project: the same identifier can hold a different
/// value in each project.
///
/// # Thread Safety
///
/// The store uses `RwLock` internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use secretree_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("acme-dev", "API_KEY", "sk-test");
/// assert_eq!(store.fetch_string("acme-dev", "API_KEY").unwrap(), "sk-test");
/// assert!(store.fetch("acme-prod", "API_KEY").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a project-scoped secret
    pub fn with_secret(self, project: &str, identifier: &str, value: impl AsRef<[u8]>) -> Self {
        self.insert(project, identifier, value);
        self
    }

    /// Insert a project-scoped secret
    pub fn insert(&self, project: &str, identifier: &str, value: impl AsRef<[u8]>) {
        self.secrets.write().insert(
            (project.to_string(), identifier.to_string()),
            value.as_ref().to_vec(),
        );
    }

    /// Remove a project-scoped secret
    pub fn remove(&self, project: &str, identifier: &str) -> bool {
        self.secrets
            .write()
            .remove(&(project.to_string(), identifier.to_string()))
            .is_some()
    }

    /// Clear all secrets from the store
    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    /// Get the number of secrets in the store
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>> {
        self.secrets
            .read()
            .get(&(project.to_string(), identifier.to_string()))
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound(identifier.to_string()))
    }
}

impl Clone for MemorySecretStore {
    fn clone(&self) -> Self {
        Self {
            secrets: RwLock::new(self.secrets.read().clone()),
        }
    }
}
