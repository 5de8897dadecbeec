//! Core traits and types for remote secret stores

use thiserror::Error;

/// Errors that can occur while fetching a secret
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store not available: {0}")]
    NotAvailable(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Trait for remote secret stores
///
/// A store exposes one synchronous operation: fetch the latest value of a
/// secret by identifier within a project. Any error is a hard failure for
/// that secret; stores do not retry on behalf of the resolver.
///
/// Implementations:
/// - `MemorySecretStore`: in-memory, for tests and local development
/// - `EnvSecretStore`: environment variables
/// - `ChainSecretStore`: ordered fallback across stores
/// - `KeychainSecretStore`: the OS keychain
/// - `RpcSecretStore`: a JSON-RPC secret provider
///
/// # Example
///
/// ```
/// use secretree_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new().with_secret("my-project", "DB_PASSWORD", "hunter2");
/// assert_eq!(store.fetch("my-project", "DB_PASSWORD").unwrap(), b"hunter2".to_vec());
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Check if this store is available
    ///
    /// For example, a keychain store might not be available on a headless server.
    fn is_available(&self) -> bool {
        true
    }

    /// Fetch the latest value of `identifier` within `project`
    fn fetch(&self, project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>>;

    /// Fetch a secret and decode it as UTF-8
    fn fetch_string(&self, project: &str, identifier: &str) -> SecretStoreResult<String> {
        let bytes = self.fetch(project, identifier)?;
        String::from_utf8(bytes).map_err(|_| {
            SecretStoreError::InvalidPayload(format!("secret '{}' is not valid UTF-8", identifier))
        })
    }
}

/// Canonical resource name of the latest version of a secret
pub fn secret_version_name(project: &str, identifier: &str) -> String {
    format!("projects/{}/secrets/{}/versions/latest", project, identifier)
}
