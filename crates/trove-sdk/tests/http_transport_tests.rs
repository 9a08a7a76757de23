//! Tests for the Streamable HTTP transport, driven through axum's Router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trove_sdk::server::McpServer;
use trove_sdk::server::transport::{SESSION_HEADER, create_router};
use trove_sdk::{Config, TroveClient};

const AUTH_TOKEN: &str = "test-secret-token-12345";

fn build_router(base_url: &str, auth_token: Option<&str>) -> axum::Router {
    let client = TroveClient::new(Config::for_testing(base_url)).unwrap();
    create_router(Arc::new(McpServer::new(client)), auth_token.map(str::to_string))
}

fn rpc(body: &Value) -> Request<Body> {
    Request::post("/mcp")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health and readiness
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = build_router("http://127.0.0.1:1", Some(AUTH_TOKEN));

    for uri in ["/", "/health"] {
        let response = app.clone().oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "trove-mcp");
    }
}

#[tokio::test]
async fn test_ready_reports_missing_api_key() {
    let app = build_router("http://127.0.0.1:1", None);
    let response = app.clone().oneshot(Request::get("/ready").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["tools"], 11);

    let mut config = Config::for_testing("http://127.0.0.1:1");
    config.api_key = None;
    let client = TroveClient::new(config).unwrap();
    let app = create_router(Arc::new(McpServer::new(client)), None);

    let response = app.oneshot(Request::get("/ready").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "missing_api_key");
}

// =============================================================================
// Bearer authentication
// =============================================================================

#[tokio::test]
async fn test_mcp_requires_bearer_token() {
    let app = build_router("http://127.0.0.1:1", Some(AUTH_TOKEN));
    let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

    let response = app.clone().oneshot(rpc(&ping)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "Bearer");

    let wrong = Request::post("/mcp")
        .header("Authorization", "Bearer not-the-token")
        .body(Body::from(ping.to_string()))
        .unwrap();
    assert_eq!(app.clone().oneshot(wrong).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    let right = Request::post("/mcp")
        .header("Authorization", format!("Bearer {AUTH_TOKEN}"))
        .body(Body::from(ping.to_string()))
        .unwrap();
    let response = app.oneshot(right).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["result"], json!({}));
}

#[tokio::test]
async fn test_health_is_open_with_token_configured() {
    let app = build_router("http://127.0.0.1:1", Some(AUTH_TOKEN));
    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// JSON-RPC over POST /mcp
// =============================================================================

#[tokio::test]
async fn test_initialize_sets_session_header() {
    let app = build_router("http://127.0.0.1:1", None);
    let init = json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize",
        "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
    });

    let response = app.clone().oneshot(rpc(&init)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = response.headers().get(SESSION_HEADER).unwrap().to_str().unwrap().to_string();
    assert_eq!(session.len(), 36);

    let body = json_body(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(body["result"]["serverInfo"]["name"], "trove-mcp");

    // Later requests echo the session back.
    let list = Request::post("/mcp")
        .header(SESSION_HEADER, session.as_str())
        .body(Body::from(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string()))
        .unwrap();
    let response = app.oneshot(list).await.unwrap();
    assert_eq!(response.headers().get(SESSION_HEADER).unwrap(), session.as_str());
}

#[tokio::test]
async fn test_tools_list() {
    let app = build_router("http://127.0.0.1:1", None);
    let response = app
        .oneshot(rpc(&json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})))
        .await
        .unwrap();

    let body = json_body(response).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
    assert!(tools.iter().any(|t| t["name"] == "trove_search"));
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[tokio::test]
async fn test_notification_is_accepted_without_body() {
    let app = build_router("http://127.0.0.1:1", None);
    let response = app
        .oneshot(rpc(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_parse_error() {
    let app = build_router("http://127.0.0.1:1", None);
    let request = Request::post("/mcp").body(Body::from("{not json")).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], -32700);
}

#[tokio::test]
async fn test_tool_call_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contributor/ANL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ANL", "name": "National Library of Australia"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_router(&mock_server.uri(), None);
    let call = json!({
        "jsonrpc": "2.0", "id": 3, "method": "tools/call",
        "params": {"name": "trove_get_contributor", "arguments": {"nuc": "ANL"}}
    });

    let body = json_body(app.clone().oneshot(rpc(&call)).await.unwrap()).await;
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("# National Library of Australia"));

    // Invalid arguments are a protocol error, not a tool failure.
    let bad = json!({
        "jsonrpc": "2.0", "id": 4, "method": "tools/call",
        "params": {"name": "trove_get_contributor", "arguments": {}}
    });
    let body = json_body(app.oneshot(rpc(&bad)).await.unwrap()).await;
    assert_eq!(body["error"]["code"], -32602);
}
