//! Streamable HTTP transport.
//!
//! `POST /mcp` carries one JSON-RPC message per request. `/health` and
//! `/ready` stay open; `/mcp` requires `Authorization: Bearer <token>` when
//! a token is configured.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::McpServer;
use super::stdio::parse_request;

/// Session header set on `initialize` and echoed afterwards.
pub const SESSION_HEADER: &str = "Mcp-Session-Id";

/// Requests served concurrently on `/mcp`.
pub const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub server: Arc<McpServer>,
    pub auth_token: Option<Arc<str>>,
}

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>, auth_token: Option<String>) -> Router {
    let state = HttpState { server, auth_token: auth_token.map(Arc::from) };

    let mcp = Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .merge(mcp)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "trove-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<HttpState>) -> Response {
    let has_key = state.server.context().client.has_api_key();
    let status = if has_key { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = Json(json!({
        "status": if has_key { "ready" } else { "missing_api_key" },
        "service": "trove-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": state.server.tool_count()
    }));
    (status, body).into_response()
}

async fn require_bearer(State(state): State<HttpState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided.is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes())) {
        next.run(request).await
    } else {
        tracing::warn!("Rejected /mcp request without a valid bearer token");
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Bearer")],
            Json(json!({"error": "unauthorized"})),
        )
            .into_response()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(State(state): State<HttpState>, headers: HeaderMap, body: Bytes) -> Response {
    let text = String::from_utf8_lossy(&body);
    let request = match parse_request(&text) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    let session = if request.method == "initialize" {
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()).ok()
    } else {
        headers.get(SESSION_HEADER).cloned()
    };

    let Some(response) = state.server.dispatch(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let mut res = Json(response).into_response();
    if let Some(session) = session {
        res.headers_mut().insert(SESSION_HEADER, session);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret-longer"));
    }
}
