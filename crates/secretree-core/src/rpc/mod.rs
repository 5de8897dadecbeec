//! RPC module for external secret providers
//!
//! This module provides a JSON-RPC client and a `SecretStore` backed by it,
//! for secret providers that run as a separate process on the same host.
//!
//! The RPC protocol uses:
//! - Unix domain sockets
//! - JSON-RPC 2.0 with Content-Length headers (LSP-style)
//! - Authentication tokens for security
//!
//! ```rust,ignore
//! register_rpc_endpoint(RpcEndpoint::secrets("vault-agent", "/run/vault.sock", token));
//! let store = RpcSecretStore::new(&get_rpc_endpoint("vault-agent").unwrap());
//! let value = store.fetch_string("acme-prod", "DB_PASSWORD")?;
//! ```

mod client;
pub mod endpoint;
mod rpc_secret_store;

pub use client::{RpcClient, RpcError, RpcResult, DEFAULT_TIMEOUT, MAX_FRAME_BYTES};
pub use endpoint::{
    RpcEndpoint, RpcEndpointRegistry, register_rpc_endpoint, get_rpc_endpoint,
    unregister_rpc_endpoint, list_rpc_endpoints,
};
pub use rpc_secret_store::RpcSecretStore;
