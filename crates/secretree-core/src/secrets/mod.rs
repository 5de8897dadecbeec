//! Remote secret store abstractions and implementations
//!
//! This module provides the collaborator the resolver fetches from:
//! - `SecretStore` trait: one synchronous "fetch value by identifier" operation
//! - Built-in implementations: `EnvSecretStore`, `MemorySecretStore`,
//!   `ChainSecretStore`, `KeychainSecretStore` (and `RpcSecretStore` in `rpc`)
//! - A registry for discovering and creating stores by name

mod traits;
mod env_store;
mod memory_store;
mod chain_store;
mod keychain_store;
mod registry;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult, secret_version_name};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
pub use keychain_store::KeychainSecretStore;
pub use registry::{
    register_secret_store, create_secret_store, list_secret_stores,
    has_secret_store, unregister_secret_store, StoreDefinition, StoreFactory,
};
