//! Secretree Core
//!
//! Resolves secret-backed configuration fields into a nested configuration
//! tree. A schema declares which fields hold secrets; the resolver walks it,
//! fetches every secret from a `SecretStore` under bounded concurrency and
//! returns either the complete tree or one error.
//!
//! ## Resolution
//!
//! ```rust,ignore
//! use secretree_core::{SecretResolver, EnvSecretStore};
//!
//! let resolver = SecretResolver::new(Arc::new(EnvSecretStore::new()), "acme-prod")
//!     .with_concurrency(16)
//!     .with_skip_keys(["db.url"]);
//!
//! let tree = resolver.resolve(&config)?;
//! ```
//!
//! ## Configuration pipeline
//!
//! `config::ConfigLoader` layers defaults, runtime overrides, a YAML file and
//! resolved secrets, then deserializes and validates the result.

pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod resolver;
pub mod rpc;
pub mod schema;
pub mod secrets;

pub use error::{FetchFailure, FetchFailures, ResolveError, ResolveResult};

pub use schema::{walk, Composite, Field, SchemaDocument, SchemaNode, SecretRequests, SecretSchema};

pub use pool::{WorkerPool, DEFAULT_CONCURRENCY};

pub use resolver::{
    deep_merge, fetch_secrets, flatten, skip_keys, unflatten, FlatValues, KeyRemapper,
    SecretResolver, DEFAULT_DELIMITER,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore, KeychainSecretStore,
    register_secret_store, create_secret_store, list_secret_stores,
};

pub use rpc::{
    RpcClient, RpcEndpoint, RpcEndpointRegistry, RpcSecretStore,
    register_rpc_endpoint, get_rpc_endpoint,
};

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, ConfigTree, Defaults, Environment, FileLayer,
    ProjectSet, Runtime, Validate, ValidationError,
};
