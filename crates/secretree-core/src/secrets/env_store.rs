//! Environment variable secret store

use std::env;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secret store that reads from environment variables
///
/// Useful for local runs and CI, where secrets are injected into the
/// process environment instead of being fetched from a remote manager.
///
/// # Identifier Mapping
///
/// The identifier is tried as-is first, then normalized to upper snake case
/// (`db-password` → `DB_PASSWORD`). When a prefix is configured, the
/// prefixed name is tried before either of those (`APP_DB_PASSWORD`).
/// The project is ignored: the environment is a single namespace.
///
/// # Example
///
/// ```
/// use secretree_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // store.fetch("any-project", "db-password") checks $db-password, then $DB_PASSWORD
/// ```
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore {
    prefix: Option<String>,
}

impl EnvSecretStore {
    /// Create a new environment variable secret store
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a store that checks `<PREFIX>_<IDENTIFIER>` first
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable names checked for an identifier, in order
    pub fn candidate_names(&self, identifier: &str) -> Vec<String> {
        let normalized = normalize(identifier);
        let mut names = Vec::with_capacity(3);
        if let Some(prefix) = &self.prefix {
            names.push(format!("{}_{}", normalize(prefix), normalized));
        }
        names.push(identifier.to_string());
        if normalized != identifier {
            names.push(normalized);
        }
        names
    }
}

fn normalize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn fetch(&self, _project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>> {
        for name in self.candidate_names(identifier) {
            if let Ok(value) = env::var(&name) {
                if !value.is_empty() {
                    return Ok(value.into_bytes());
                }
            }
        }
        Err(SecretStoreError::NotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_store_name() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("SECRETREE_TEST_DIRECT_1", "direct");

        let store = EnvSecretStore::new();
        assert_eq!(store.fetch_string("p", "SECRETREE_TEST_DIRECT_1").unwrap(), "direct");

        env::remove_var("SECRETREE_TEST_DIRECT_1");
    }

    #[test]
    fn test_env_store_normalizes_identifier() {
        env::set_var("SECRETREE_TEST_DB_PASSWORD", "pw");

        let store = EnvSecretStore::new();
        assert_eq!(store.fetch_string("p", "secretree-test-db-password").unwrap(), "pw");

        env::remove_var("SECRETREE_TEST_DB_PASSWORD");
    }

    #[test]
    fn test_env_store_prefix_wins() {
        env::set_var("SECRETREE_TEST_PFX_TOKEN", "prefixed");
        env::set_var("TOKEN_SECRETREE_UNPREFIXED", "plain");

        let store = EnvSecretStore::with_prefix("secretree-test-pfx");
        assert_eq!(store.fetch_string("p", "token").unwrap(), "prefixed");
        assert_eq!(
            store.fetch_string("p", "TOKEN_SECRETREE_UNPREFIXED").unwrap(),
            "plain"
        );

        env::remove_var("SECRETREE_TEST_PFX_TOKEN");
        env::remove_var("TOKEN_SECRETREE_UNPREFIXED");
    }

    #[test]
    fn test_env_store_empty_value_is_missing() {
        env::set_var("SECRETREE_TEST_EMPTY", "");

        let store = EnvSecretStore::new();
        assert!(matches!(
            store.fetch("p", "SECRETREE_TEST_EMPTY"),
            Err(SecretStoreError::NotFound(_))
        ));

        env::remove_var("SECRETREE_TEST_EMPTY");
    }

    #[test]
    fn test_candidate_names() {
        let store = EnvSecretStore::with_prefix("app");
        assert_eq!(
            store.candidate_names("db.url"),
            vec!["APP_DB_URL".to_string(), "db.url".to_string(), "DB_URL".to_string()]
        );
    }
}
