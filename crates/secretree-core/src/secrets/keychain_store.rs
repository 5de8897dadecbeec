//! System keychain secret store
//!
//! Uses the OS keychain as a local stand-in for a remote secret manager:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;
use tracing::{debug, warn};

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secret store backed by the system keychain
///
/// Each project maps to a keychain service named `<service_prefix>:<project>`
/// and each secret identifier to an account within that service, so the same
/// identifier can hold different values per project.
///
/// # Example
///
/// ```no_run
/// use secretree_core::secrets::{KeychainSecretStore, SecretStore};
///
/// let store = KeychainSecretStore::new();
/// store.put("acme-dev", "API_KEY", "sk-...").unwrap();
/// let key = store.fetch_string("acme-dev", "API_KEY").unwrap();
/// ```
pub struct KeychainSecretStore {
    service_prefix: String,
}

impl KeychainSecretStore {
    /// Create a new keychain store with the default service prefix "secretree"
    pub fn new() -> Self {
        Self::with_service_prefix("secretree")
    }

    /// Create a new keychain store with a custom service prefix
    pub fn with_service_prefix(prefix: impl Into<String>) -> Self {
        Self {
            service_prefix: prefix.into(),
        }
    }

    /// Keychain service name for a project
    pub fn service_for(&self, project: &str) -> String {
        format!("{}:{}", self.service_prefix, project)
    }

    fn entry(&self, project: &str, identifier: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_for(project), identifier)
            .map_err(|e| SecretStoreError::Other(format!("failed to open keychain entry: {}", e)))
    }

    /// Store a secret in the keychain (local seeding; the resolver only reads)
    pub fn put(&self, project: &str, identifier: &str, value: &str) -> SecretStoreResult<()> {
        self.entry(project, identifier)?
            .set_password(value)
            .map_err(|e| SecretStoreError::Other(format!("failed to store in keychain: {}", e)))
    }

    /// Remove a secret from the keychain; missing entries are not an error
    pub fn remove(&self, project: &str, identifier: &str) -> SecretStoreResult<()> {
        match self.entry(project, identifier)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretStoreError::Other(format!(
                "failed to delete from keychain: {}",
                e
            ))),
        }
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        // Creating an entry fails on headless servers without a keychain daemon
        match Entry::new(&self.service_prefix, "__secretree_availability_check__") {
            Ok(_) => true,
            Err(e) => {
                warn!(error = ?e, "keychain unavailable");
                false
            }
        }
    }

    fn fetch(&self, project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>> {
        debug!(service = %self.service_for(project), identifier, "keychain fetch");
        match self.entry(project, identifier)?.get_password() {
            Ok(password) => Ok(password.into_bytes()),
            Err(keyring::Error::NoEntry) => Err(SecretStoreError::NotFound(identifier.to_string())),
            Err(e) => Err(SecretStoreError::Other(format!("keychain error: {}", e))),
        }
    }
}
