use std::path::Path;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Minimal client for the hooptrack daemon JSON-RPC Unix socket API.
pub struct DaemonClient {
    stream: BufReader<UnixStream>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[allow(dead_code)]
    id: Option<u64>,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[allow(dead_code)]
    code: i32,
    message: String,
}

/// Parse a raw JSON-RPC response line into its result value.
///
/// Extracted from `DaemonClient::call` so it can be unit-tested without
/// a live socket connection.
fn parse_response(line: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let resp: JsonRpcResponse = serde_json::from_str(line)?;
    if let Some(err) = resp.error {
        return Err(format!("daemon error: {}", err.message).into());
    }
    resp.result.ok_or_else(|| "missing result in response".into())
}

impl DaemonClient {
    /// Connect to the daemon at the given Unix socket path.
    pub async fn connect(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self {
            stream: BufReader::new(stream),
        })
    }

    /// Call a parameterless method and return its result value.
    pub async fn call(
        &mut self,
        method: &str,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": {},
        });

        // Write the request as a newline-delimited JSON line.
        let writer = self.stream.get_mut();
        writer.write_all(request.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        // Read the response line.
        let mut line = String::new();
        self.stream.read_line(&mut line).await?;

        parse_response(&line)
    }
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

/// Human line printed by `hooptrack start` / `hooptrack end`.
fn format_session_line(verb: &str, result: &serde_json::Value) -> String {
    match result.get("sessionId").and_then(|v| v.as_i64()) {
        Some(id) => format!("session {id} {verb}"),
        None => format!("session {verb}"),
    }
}

/// Human line printed by `hooptrack status`.
fn format_status(result: &serde_json::Value) -> String {
    match result.get("sessionId").and_then(|v| v.as_i64()) {
        Some(id) => format!("session {id} running"),
        None => "no session running".to_string(),
    }
}

// ---------------------------------------------------------------------------
// One-shot subcommand entry points
// ---------------------------------------------------------------------------

async fn connect_or_hint(socket: &str) -> Result<DaemonClient, Box<dyn std::error::Error>> {
    DaemonClient::connect(socket).await.map_err(|e| {
        format!(
            "failed to connect to daemon at {socket}: {e} \
             (is the daemon running? start it with: hooptrack daemon)"
        )
        .into()
    })
}

pub async fn cmd_start(socket: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect_or_hint(socket).await?;
    let result = client.call("start_session").await?;
    println!("{}", format_session_line("started", &result));
    Ok(())
}

pub async fn cmd_end(socket: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect_or_hint(socket).await?;
    let result = client.call("end_session").await?;
    println!("{}", format_session_line("ended", &result));
    Ok(())
}

pub async fn cmd_stats(socket: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect_or_hint(socket).await?;
    let result = client.call("player_stats").await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub async fn cmd_status(socket: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = connect_or_hint(socket).await?;
    let result = client.call("status").await?;
    println!("{}", format_status(&result));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_success() {
        let json = r#"{"jsonrpc":"2.0","id":1,"result":{"sessionId":3}}"#;
        let result = parse_response(json).expect("should parse successfully");
        assert_eq!(result["sessionId"], serde_json::json!(3));
    }

    #[test]
    fn parse_response_error() {
        let json = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"a session is already running"}}"#;
        let result = parse_response(json);
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(
            err_msg.contains("already running"),
            "error message should contain the daemon error: {}",
            err_msg,
        );
    }

    #[test]
    fn parse_response_missing_result() {
        let json = r#"{"jsonrpc":"2.0","id":1}"#;
        let result = parse_response(json);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing result"));
    }

    #[test]
    fn parse_response_invalid_json() {
        assert!(parse_response("not json at all").is_err());
    }

    #[test]
    fn parse_response_without_jsonrpc_still_works() {
        // Responses without the jsonrpc field should still parse.
        let json = r#"{"id":1,"result":[]}"#;
        let result = parse_response(json).expect("should parse successfully");
        assert_eq!(result, serde_json::json!([]));
    }

    #[test]
    fn session_line_includes_id() {
        let result = serde_json::json!({"sessionId": 7});
        assert_eq!(format_session_line("started", &result), "session 7 started");
        assert_eq!(format_session_line("ended", &result), "session 7 ended");
    }

    #[test]
    fn session_line_without_id_degrades() {
        let result = serde_json::json!({});
        assert_eq!(format_session_line("started", &result), "session started");
    }

    #[tokio::test]
    async fn connect_failure_reports_hint_once() {
        let err = match connect_or_hint("/nonexistent/hooptrack.sock").await {
            Ok(_) => panic!("connect to a missing socket should fail"),
            Err(e) => e,
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to connect"), "got: {msg}");
        assert!(msg.contains("hooptrack daemon"), "got: {msg}");
        // The hint lives in the error itself, so the caller prints
        // the failure exactly once.
        assert_eq!(msg.matches("failed to connect").count(), 1);
    }

    #[test]
    fn status_line_running_and_idle() {
        let running = serde_json::json!({"active": true, "sessionId": 2});
        assert_eq!(format_status(&running), "session 2 running");

        let idle = serde_json::json!({"active": false, "sessionId": null});
        assert_eq!(format_status(&idle), "no session running");
    }
}
