//! MCP server implementation.
//!
//! One dispatcher serves both transports: line-delimited JSON-RPC over
//! stdio and Streamable HTTP (`POST /mcp`).

pub mod protocol;
pub mod stdio;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::client::TroveClient;
use crate::tools::{self, McpTool, ToolContext};
use protocol::{
    INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest, JsonRpcResponse, McpToolInfo,
    METHOD_NOT_FOUND, TOOL_ERROR,
};

/// Protocol version offered when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server for Trove.
pub struct McpServer {
    /// Tool execution context.
    ctx: ToolContext,

    /// Registered tools.
    tools: Vec<Box<dyn McpTool>>,
}

impl McpServer {
    /// Create a new MCP server with every tool registered.
    #[must_use]
    pub fn new(client: TroveClient) -> Self {
        let ctx = ToolContext::new(Arc::new(client));
        let tools = tools::register_all_tools();

        Self { ctx, tools }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server in stdio mode");
        stdio::run_stdio(&self, tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run the server in HTTP mode until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self, port: u16, auth_token: Option<String>) -> anyhow::Result<()> {
        tracing::info!(port, tools = self.tools.len(), "Starting MCP server in HTTP mode");
        if auth_token.is_none() {
            tracing::warn!("No MCP_SERVER_AUTH_TOKEN set; /mcp accepts unauthenticated requests");
        }

        let router = transport::create_router(Arc::new(self), auth_token);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        tracing::info!("HTTP server listening on http://{}", addr);
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }

    /// Get tool by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// List all available tools.
    #[must_use]
    pub fn list_tools(&self) -> Vec<(&str, &str)> {
        self.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Get tool context for execution.
    #[must_use]
    pub const fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Handle one request. Returns `None` for notifications, which get no reply.
    pub async fn dispatch(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %req.method, "Received request");

        if req.jsonrpc != JsonRpcResponse::VERSION {
            return (!req.is_notification()).then(|| {
                JsonRpcResponse::error(req.id.clone(), INVALID_REQUEST, "jsonrpc must be \"2.0\"")
            });
        }

        if req.is_notification() {
            match req.method.as_str() {
                "notifications/initialized" => tracing::info!("Client initialized"),
                "notifications/cancelled" => tracing::debug!("Client cancelled a request"),
                other => tracing::debug!(method = %other, "Ignoring notification"),
            }
            return None;
        }

        let id = req.id;
        let response = match req.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(&req.params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({"tools": self.tool_infos()})),
            "tools/call" => self.call_tool(id, &req.params).await,
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", req.method)),
        };
        Some(response)
    }

    fn tool_infos(&self) -> Vec<McpToolInfo> {
        self.tools
            .iter()
            .map(|t| McpToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    async fn call_tool(&self, id: Option<Value>, params: &Value) -> JsonRpcResponse {
        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'name' parameter");
        };
        let Some(tool) = self.get_tool(tool_name) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Tool not found: {tool_name}"));
        };
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args) => args.clone(),
        };

        tracing::info!(tool = %tool_name, "Executing tool");

        match tool.call(&self.ctx, arguments).await {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{"type": "text", "text": text}]
                }),
            ),
            Err(e) if e.is_invalid_input() => {
                tracing::debug!(tool = %tool_name, error = %e, "Rejected tool arguments");
                JsonRpcResponse::error(id, INVALID_PARAMS, e.to_user_message())
            }
            Err(e) => {
                tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
                JsonRpcResponse::error(id, TOOL_ERROR, e.to_user_message())
            }
        }
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.tools.len()).finish()
    }
}

fn initialize_result(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    tracing::info!("MCP initialize: protocol version {}", protocol_version);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {"listChanged": false}
        },
        "serverInfo": {
            "name": "trove-mcp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn server() -> McpServer {
        McpServer::new(TroveClient::new(Config::for_testing("http://127.0.0.1:1")).unwrap())
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let req: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(server().dispatch(req).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server()
            .dispatch(JsonRpcRequest::new(7, "resources/list", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);
        assert_eq!(response.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_schema_violation_is_invalid_params() {
        let response = server()
            .dispatch(JsonRpcRequest::new(
                1,
                "tools/call",
                json!({"name": "trove_search", "arguments": {"categories": ["book"], "pageSize": 500}}),
            ))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert!(error.message.contains("pageSize"));
    }

    #[tokio::test]
    async fn test_wrong_version_rejected() {
        let mut req = JsonRpcRequest::new(1, "ping", Value::Null);
        req.jsonrpc = "1.0".to_string();
        let response = server().dispatch(req).await.unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_REQUEST);
    }
}
