//! Stdio transport for MCP protocol.
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout. Logs go to stderr so that
//! stdout carries protocol messages only.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use super::McpServer;
use super::protocol::{INVALID_REQUEST, JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};

/// Serve requests read from `input` until EOF, writing replies to `output`.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio<R, W>(server: &McpServer, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut line = String::new();

    tracing::info!("MCP stdio server ready, waiting for requests...");

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_request(trimmed) {
            Ok(request) => server.dispatch(request).await,
            Err(response) => Some(response),
        };

        if let Some(response) = response {
            let mut bytes = serde_json::to_vec(&response)?;
            bytes.push(b'\n');
            output.write_all(&bytes).await?;
            output.flush().await?;
        }
    }

    Ok(())
}

/// Parse one message, producing the error reply for malformed input.
pub(crate) fn parse_request(text: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}")))?;
    let id = value.get("id").cloned();
    serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TroveClient;
    use crate::config::Config;
    use serde_json::{Value, json};

    async fn run(input: &str) -> Vec<Value> {
        let server = McpServer::new(TroveClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap());
        let mut output = Vec::new();
        run_stdio(&server, input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_session_over_lines() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
        );
        let replies = run(input).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(replies[0]["result"]["serverInfo"]["name"], "trove-mcp");
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_parse_error_reply() {
        let replies = run("{not json\n").await;
        assert_eq!(replies[0]["error"]["code"], -32700);
        assert_eq!(replies[0]["id"], Value::Null);
    }

    #[test]
    fn test_invalid_request_keeps_id() {
        let err = parse_request(r#"{"jsonrpc":"2.0","id":5}"#).unwrap_err();
        assert_eq!(err.id, Some(json!(5)));
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);
    }
}
