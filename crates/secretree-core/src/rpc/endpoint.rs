//! RPC endpoint registration and discovery
//!
//! Secret providers reachable over a socket register their endpoints here,
//! and callers (the CLI, the config loader) look them up by name.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Capability advertised by endpoints that serve `secrets/access`
pub const SECRETS_CAPABILITY: &str = "secrets";

/// Information about an RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    /// Human-readable name (e.g., "vault-agent")
    pub name: String,
    /// Path to the Unix socket
    pub socket_path: PathBuf,
    /// Authentication token required for requests
    pub auth_token: String,
    /// Capabilities this endpoint supports
    pub capabilities: Vec<String>,
}

impl RpcEndpoint {
    pub fn new(
        name: impl Into<String>,
        socket_path: impl Into<PathBuf>,
        auth_token: impl Into<String>,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            socket_path: socket_path.into(),
            auth_token: auth_token.into(),
            capabilities,
        }
    }

    /// Endpoint that only serves secrets
    pub fn secrets(
        name: impl Into<String>,
        socket_path: impl Into<PathBuf>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self::new(name, socket_path, auth_token, vec![SECRETS_CAPABILITY.to_string()])
    }

    /// Check if this endpoint supports a specific capability
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Check if this endpoint supports secrets
    pub fn supports_secrets(&self) -> bool {
        self.has_capability(SECRETS_CAPABILITY)
    }
}

/// Registry for RPC endpoints
#[derive(Default)]
pub struct RpcEndpointRegistry {
    endpoints: RwLock<HashMap<String, RpcEndpoint>>,
}

impl RpcEndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint, replacing any endpoint with the same name
    pub fn register(&self, endpoint: RpcEndpoint) {
        let name = endpoint.name.clone();
        self.endpoints.write().insert(name, endpoint);
    }

    /// Unregister an endpoint by name
    pub fn unregister(&self, name: &str) -> Option<RpcEndpoint> {
        self.endpoints.write().remove(name)
    }

    /// Get an endpoint by name
    pub fn get(&self, name: &str) -> Option<RpcEndpoint> {
        self.endpoints.read().get(name).cloned()
    }

    /// List all registered endpoint names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.endpoints.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if any endpoints are registered
    pub fn is_empty(&self) -> bool {
        self.endpoints.read().is_empty()
    }
}

// Global registry instance
static GLOBAL_REGISTRY: Lazy<RpcEndpointRegistry> = Lazy::new(RpcEndpointRegistry::new);

/// Register an RPC endpoint globally
pub fn register_rpc_endpoint(endpoint: RpcEndpoint) {
    GLOBAL_REGISTRY.register(endpoint);
}

/// Get an RPC endpoint by name from the global registry
pub fn get_rpc_endpoint(name: &str) -> Option<RpcEndpoint> {
    GLOBAL_REGISTRY.get(name)
}

/// Unregister an RPC endpoint by name
pub fn unregister_rpc_endpoint(name: &str) -> Option<RpcEndpoint> {
    GLOBAL_REGISTRY.unregister(name)
}

/// List all registered RPC endpoints
pub fn list_rpc_endpoints() -> Vec<String> {
    GLOBAL_REGISTRY.list()
}
