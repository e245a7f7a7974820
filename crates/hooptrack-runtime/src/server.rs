use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use hooptrack_store::Store;

use crate::controller::{ControllerError, SessionController};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between the control server and the daemon shutdown path.
pub struct AppState {
    pub controller: SessionController,
    pub store: Arc<Mutex<Store>>,
}

// ---------------------------------------------------------------------------
// JSON-RPC types (newline-delimited JSON)
// ---------------------------------------------------------------------------

fn default_jsonrpc() -> String {
    "2.0".into()
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// Error surface of a dispatched method call.
#[derive(Debug)]
pub enum RpcError {
    MethodNotFound(String),
    App(String),
}

impl RpcError {
    fn code(&self) -> i32 {
        match self {
            RpcError::MethodNotFound(_) => -32601,
            RpcError::App(_) => -32000,
        }
    }

    fn message(&self) -> String {
        match self {
            RpcError::MethodNotFound(m) => format!("method not found: {m}"),
            RpcError::App(m) => m.clone(),
        }
    }
}

impl From<ControllerError> for RpcError {
    fn from(e: ControllerError) -> Self {
        RpcError::App(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// ControlServer
// ---------------------------------------------------------------------------

/// Unix-socket server exposing the session API to local clients.
///
/// Protocol: newline-delimited JSON-RPC over Unix stream sockets.
///
/// Supported methods:
///   - `start_session` -- begin tracking, returns the new session id
///   - `end_session`   -- stop tracking, returns the ended session id
///   - `player_stats`  -- all session records, oldest first
///   - `status`        -- whether a session is currently running
pub struct ControlServer {
    socket_path: PathBuf,
    state: Arc<AppState>,
    cancel: CancellationToken,
}

impl ControlServer {
    pub fn new(
        socket_path: impl Into<PathBuf>,
        state: Arc<AppState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            state,
            cancel,
        }
    }

    /// Bind the listener and accept connections until cancelled.
    pub async fn run(self) -> std::io::Result<()> {
        if let Some(parent) = self.socket_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Clean up a stale socket file from a previous run.
        cleanup_socket(&self.socket_path).await;

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!(path = %self.socket_path.display(), "control server listening");

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _addr)) => {
                            let state = Arc::clone(&self.state);
                            tokio::spawn(async move {
                                if let Err(e) = handle_client(stream, state).await {
                                    tracing::debug!(error = %e, "client handler finished with error");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "accept failed");
                        }
                    }
                }
                _ = self.cancel.cancelled() => {
                    tracing::info!("control server: cancellation requested, shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Per-client handler
// ---------------------------------------------------------------------------

async fn handle_client(stream: UnixStream, state: Arc<AppState>) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    tracing::debug!("client connected");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => {
                tracing::debug!("client disconnected (EOF)");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(error = %e, "read error, dropping client");
                return Err(e);
            }
        };

        let req: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let resp = JsonRpcResponse {
                    jsonrpc: "2.0".into(),
                    id: None,
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32700,
                        message: format!("parse error: {e}"),
                    }),
                };
                write_json(&mut writer, &resp).await?;
                continue;
            }
        };

        tracing::debug!(method = %req.method, id = ?req.id, "request received");

        let resp = match dispatch(&state, &req.method).await {
            Ok(result) => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: req.id,
                result: Some(result),
                error: None,
            },
            Err(e) => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: req.id,
                result: None,
                error: Some(JsonRpcError {
                    code: e.code(),
                    message: e.message(),
                }),
            },
        };
        write_json(&mut writer, &resp).await?;
    }
}

/// Route a method name to its handler. All current methods take no params.
pub(crate) async fn dispatch(
    state: &AppState,
    method: &str,
) -> Result<serde_json::Value, RpcError> {
    match method {
        "start_session" => {
            let id = state.controller.start().await?;
            Ok(serde_json::json!({ "sessionId": id }))
        }
        "end_session" => {
            let id = state.controller.end().await?;
            Ok(serde_json::json!({ "sessionId": id }))
        }
        "player_stats" => {
            let sessions = {
                let store = state.store.lock().await;
                store.all_sessions().map_err(|e| RpcError::App(e.to_string()))?
            };
            serde_json::to_value(&sessions).map_err(|e| RpcError::App(e.to_string()))
        }
        "status" => {
            let active = state.controller.active_session().await;
            Ok(serde_json::json!({
                "active": active.is_some(),
                "sessionId": active,
            }))
        }
        other => Err(RpcError::MethodNotFound(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialize a value as a single JSON line terminated by `\n` and flush.
async fn write_json<T: serde::Serialize>(
    writer: &mut tokio::net::unix::OwnedWriteHalf,
    value: &T,
) -> std::io::Result<()> {
    let mut buf = serde_json::to_vec(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await
}

/// Remove a stale socket file if it exists.
async fn cleanup_socket(path: &Path) {
    if path.exists() {
        tracing::info!(path = %path.display(), "removing stale socket");
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "failed to remove stale socket"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
