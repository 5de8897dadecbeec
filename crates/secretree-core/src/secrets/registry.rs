//! Secret store registry for discovering and creating stores by name

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::env_store::EnvSecretStore;
use super::keychain_store::KeychainSecretStore;
use super::memory_store::MemorySecretStore;
use super::traits::SecretStore;

/// Factory function type for creating secret stores
pub type StoreFactory = Box<dyn Fn() -> Arc<dyn SecretStore> + Send + Sync>;

/// Definition of a registered secret store
pub struct StoreDefinition {
    /// Unique name for this store
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Factory function to create instances
    pub factory: StoreFactory,
}

impl std::fmt::Debug for StoreDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Global registry of secret stores
static REGISTRY: Lazy<RwLock<HashMap<String, StoreDefinition>>> = Lazy::new(|| {
    let mut map = HashMap::new();

    let builtins: [(&str, &str, StoreFactory); 3] = [
        (
            "env",
            "Read secrets from environment variables",
            Box::new(|| -> Arc<dyn SecretStore> { Arc::new(EnvSecretStore::new()) }),
        ),
        (
            "memory",
            "In-memory storage for testing",
            Box::new(|| -> Arc<dyn SecretStore> { Arc::new(MemorySecretStore::new()) }),
        ),
        (
            "keychain",
            "System keychain (macOS Keychain, Windows Credential Manager, Linux Secret Service)",
            Box::new(|| -> Arc<dyn SecretStore> { Arc::new(KeychainSecretStore::new()) }),
        ),
    ];

    for (name, description, factory) in builtins {
        map.insert(
            name.to_string(),
            StoreDefinition {
                name: name.to_string(),
                description: description.to_string(),
                factory,
            },
        );
    }

    RwLock::new(map)
});

/// Register a new secret store type
///
/// # Example
///
/// ```
/// use secretree_core::secrets::{register_secret_store, MemorySecretStore, SecretStore};
/// use std::sync::Arc;
///
/// register_secret_store(
///     "fixtures",
///     "Seeded fixture secrets",
///     Box::new(|| -> Arc<dyn SecretStore> {
///         Arc::new(MemorySecretStore::new().with_secret("p", "A", "1"))
///     }),
/// );
/// ```
pub fn register_secret_store(name: &str, description: &str, factory: StoreFactory) {
    REGISTRY.write().insert(
        name.to_string(),
        StoreDefinition {
            name: name.to_string(),
            description: description.to_string(),
            factory,
        },
    );
}

/// Create a secret store by name
///
/// Returns `None` if the name is not registered.
///
/// ```
/// use secretree_core::secrets::create_secret_store;
///
/// let store = create_secret_store("env").expect("env store should exist");
/// assert_eq!(store.name(), "env");
/// ```
pub fn create_secret_store(name: &str) -> Option<Arc<dyn SecretStore>> {
    REGISTRY.read().get(name).map(|def| (def.factory)())
}

/// List all registered secret stores as (name, description), sorted by name
pub fn list_secret_stores() -> Vec<(String, String)> {
    let mut stores: Vec<_> = REGISTRY
        .read()
        .values()
        .map(|def| (def.name.clone(), def.description.clone()))
        .collect();
    stores.sort();
    stores
}

/// Check if a store is registered
pub fn has_secret_store(name: &str) -> bool {
    REGISTRY.read().contains_key(name)
}

/// Unregister a secret store (mainly for testing)
pub fn unregister_secret_store(name: &str) -> bool {
    REGISTRY.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stores_registered() {
        assert!(has_secret_store("env"));
        assert!(has_secret_store("memory"));
        assert!(has_secret_store("keychain"));
    }

    #[test]
    fn test_create_builtin_stores() {
        assert_eq!(create_secret_store("env").unwrap().name(), "env");
        assert_eq!(create_secret_store("memory").unwrap().name(), "memory");
    }

    #[test]
    fn test_create_unknown_store() {
        assert!(create_secret_store("nonexistent_xyz").is_none());
    }

    #[test]
    fn test_list_stores_sorted() {
        let stores = list_secret_stores();
        let names: Vec<_> = stores.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"env"));
        assert!(names.contains(&"memory"));

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_register_custom_store() {
        register_secret_store(
            "test_custom_store",
            "A test store",
            Box::new(|| -> Arc<dyn SecretStore> {
                Arc::new(MemorySecretStore::new().with_secret("p", "K", "v"))
            }),
        );

        let store = create_secret_store("test_custom_store").unwrap();
        assert_eq!(store.fetch_string("p", "K").unwrap(), "v");

        assert!(unregister_secret_store("test_custom_store"));
        assert!(!has_secret_store("test_custom_store"));
    }
}
