//! Chained secret store with fallback behavior

use std::sync::Arc;

use tracing::debug;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// A secret store that chains multiple stores together with fallback behavior
///
/// Fetches try each available store in order and return the first success.
/// When every store fails, the error from the last store that was tried is
/// returned, so a "not found" from a local store never masks a transport
/// failure from the authoritative one placed last.
///
/// # Example
///
/// ```
/// use secretree_core::secrets::{SecretStore, ChainSecretStore, EnvSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// let overrides = Arc::new(MemorySecretStore::new());
/// let env = Arc::new(EnvSecretStore::new());
///
/// // Try local overrides first, then fall back to the environment
/// let chain = ChainSecretStore::new(vec![overrides, env]);
/// assert_eq!(chain.name(), "chain");
/// ```
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    /// Create a new chain store
    ///
    /// Stores are tried in order.
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Get the stores in this chain
    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn is_available(&self) -> bool {
        // Chain is available if any store is available
        self.stores.iter().any(|s| s.is_available())
    }

    fn fetch(&self, project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>> {
        let mut last_error = None;
        for store in &self.stores {
            if !store.is_available() {
                continue;
            }
            match store.fetch(project, identifier) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(store = store.name(), identifier, error = %e, "chain fallthrough");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            SecretStoreError::NotAvailable("no store in the chain is available".to_string())
        }))
    }
}

// Implement Debug manually since Arc<dyn SecretStore> doesn't implement Debug
impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSecretStore")
            .field("stores", &format!("[{} stores]", self.stores.len()))
            .finish()
    }
}
