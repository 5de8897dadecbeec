//! JSON-RPC client for communicating with external secret providers
//!
//! Uses the LSP-style protocol with Content-Length headers over Unix sockets.
//! Calls are synchronous: the resolver's worker pool already provides the
//! parallelism, and each worker blocks on exactly one call.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

/// Errors that can occur during RPC operations
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

/// Default socket read/write timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Largest response body accepted from a provider
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// JSON-RPC client
pub struct RpcClient {
    socket_path: String,
    auth_token: String,
    timeout: Duration,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(socket_path: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            auth_token: auth_token.into(),
            timeout: DEFAULT_TIMEOUT,
            request_id: AtomicU64::new(0),
        }
    }

    /// Override the socket read/write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the socket this client connects to
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Make a JSON-RPC request
    pub fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> RpcResult<R> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        // Add auth token to params
        let params_value = serde_json::to_value(params)?;
        let params_with_auth = match params_value {
            Value::Object(mut map) => {
                map.insert("auth".to_string(), json!(self.auth_token));
                Value::Object(map)
            }
            Value::Null => json!({ "auth": self.auth_token }),
            _ => json!({ "auth": self.auth_token, "data": params_value }),
        };

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params_with_auth,
        });

        let response = self.send_request(&request)?;
        parse_response(response)
    }

    #[cfg(unix)]
    fn send_request(&self, request: &Value) -> RpcResult<Value> {
        debug!(socket = %self.socket_path, "connecting to RPC socket");

        let stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            error!(socket = %self.socket_path, error = %e, "RPC connection failed");
            RpcError::ConnectionFailed(e.to_string())
        })?;

        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        exchange(stream, request)
    }

    #[cfg(not(unix))]
    fn send_request(&self, _request: &Value) -> RpcResult<Value> {
        Err(RpcError::Unsupported(
            "RPC secret providers require Unix domain sockets".to_string(),
        ))
    }

    /// Whether the socket file is present; does not connect
    pub fn socket_exists(&self) -> bool {
        Path::new(&self.socket_path).exists()
    }
}

/// Write one framed request to a stream and read one framed response back
pub(crate) fn exchange<S: Read + Write>(mut stream: S, request: &Value) -> RpcResult<Value> {
    let content = serde_json::to_string(request)?;
    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("unknown");
    debug!(method, content_length = content.len(), "sending RPC request");

    write_frame(&mut stream, &content)?;

    let mut reader = BufReader::new(stream);
    read_frame(&mut reader)
}

/// Write `content` with a Content-Length header
pub(crate) fn write_frame<W: Write>(writer: &mut W, content: &str) -> RpcResult<()> {
    let message = format!("Content-Length: {}\r\n\r\n{}", content.len(), content);
    writer.write_all(message.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read one Content-Length framed JSON message
pub(crate) fn read_frame<R: BufRead>(reader: &mut R) -> RpcResult<Value> {
    // Read headers until we find Content-Length
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            return Err(RpcError::InvalidResponse("Connection closed".to_string()));
        }

        let line = line.trim();
        if line.is_empty() {
            // End of headers
            break;
        }

        if let Some(len_str) = line.strip_prefix("Content-Length:") {
            content_length = Some(
                len_str
                    .trim()
                    .parse()
                    .map_err(|_| RpcError::InvalidResponse("Invalid Content-Length".to_string()))?,
            );
        }
    }

    let length = content_length
        .ok_or_else(|| RpcError::InvalidResponse("Missing Content-Length header".to_string()))?;
    if length > MAX_FRAME_BYTES {
        return Err(RpcError::InvalidResponse(format!(
            "Content-Length {} exceeds limit of {} bytes",
            length, MAX_FRAME_BYTES
        )));
    }

    let mut content = vec![0u8; length];
    reader.read_exact(&mut content)?;

    Ok(serde_json::from_slice(&content)?)
}

fn parse_response<R: DeserializeOwned>(response: Value) -> RpcResult<R> {
    if let Some(error) = response.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(RpcError::RpcError { code, message });
    }

    let result = response
        .get("result")
        .ok_or_else(|| RpcError::InvalidResponse("Missing result field".to_string()))?;

    serde_json::from_value(result.clone()).map_err(|e| e.into())
}
