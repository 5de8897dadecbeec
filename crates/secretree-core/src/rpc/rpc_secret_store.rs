//! RPC-backed secret store
//!
//! Implements the SecretStore trait by making JSON-RPC calls to an external
//! secret provider (a sidecar, an IDE extension, a local vault agent).

use serde::{Deserialize, Serialize};

use super::client::{RpcClient, RpcError};
use super::endpoint::RpcEndpoint;
use crate::secrets::{secret_version_name, SecretStore, SecretStoreError, SecretStoreResult};

/// A secret store that uses JSON-RPC to communicate with an external provider
///
/// Each fetch issues one `secrets/access` call carrying the project, the
/// identifier, and the canonical version name. A `null` value in the reply
/// means the secret does not exist.
pub struct RpcSecretStore {
    name: String,
    client: RpcClient,
}

#[derive(Serialize)]
struct AccessParams<'a> {
    project: &'a str,
    name: &'a str,
    version: String,
}

#[derive(Deserialize)]
struct AccessResult {
    value: Option<String>,
}

impl RpcSecretStore {
    /// Create a new RPC secret store from an endpoint
    pub fn new(endpoint: &RpcEndpoint) -> Self {
        Self {
            name: format!("rpc:{}", endpoint.name),
            client: RpcClient::new(
                endpoint.socket_path.to_string_lossy().to_string(),
                endpoint.auth_token.clone(),
            ),
        }
    }

    /// Create from socket path and auth token directly
    pub fn from_parts(
        name: impl Into<String>,
        socket_path: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            name: format!("rpc:{}", name.into()),
            client: RpcClient::new(socket_path, auth_token),
        }
    }
}

fn into_store_error(err: RpcError) -> SecretStoreError {
    match err {
        RpcError::ConnectionFailed(msg) => SecretStoreError::NotAvailable(msg),
        RpcError::Io(e) => SecretStoreError::Io(e),
        other => SecretStoreError::Other(other.to_string()),
    }
}

impl SecretStore for RpcSecretStore {
    fn name(&self) -> &str {
        &self.name
    }

    /// A present socket counts as available; nothing is sent
    fn is_available(&self) -> bool {
        self.client.socket_exists()
    }

    fn fetch(&self, project: &str, identifier: &str) -> SecretStoreResult<Vec<u8>> {
        let result: AccessResult = self
            .client
            .call(
                "secrets/access",
                AccessParams {
                    project,
                    name: identifier,
                    version: secret_version_name(project, identifier),
                },
            )
            .map_err(into_store_error)?;

        result
            .value
            .map(String::into_bytes)
            .ok_or_else(|| SecretStoreError::NotFound(identifier.to_string()))
    }
}
