//! Errors for the Trove client and the MCP tools.

use std::time::Duration;

/// Errors from the HTTP client layer and the parameter model.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Every v3 endpoint needs a key; requests fail fast without one.
    #[error("No Trove API key configured (set TROVE_API_KEY)")]
    MissingApiKey,

    /// 401 or 403: the key is missing, invalid or lacks access.
    #[error("Trove rejected the API key ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// 429. `retry_after` comes from the `Retry-After` header when sent.
    #[error("Rate limited by Trove, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// 404 for a record, title or contributor path.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// 400: Trove could not use the query as sent.
    #[error("Trove rejected the request: {message}")]
    BadRequest { message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode JSON response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to decode XML response: {0}")]
    Xml(String),

    /// Parameters rejected locally; no request was sent. `field` names the
    /// query parameter (`l-year`, `category`, `s`).
    #[error("Invalid parameter '{field}': {message}")]
    Validation { field: String, message: String },

    /// 5xx after retries were exhausted.
    #[error("Trove server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

impl ClientError {
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    #[must_use]
    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized { status, message: message.into() }
    }

    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    #[must_use]
    pub fn xml(message: impl std::fmt::Display) -> Self {
        Self::Xml(message.to_string())
    }

    /// Rate limits, timeouts and 5xx responses may succeed on a later attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }

    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Arguments failed the tool's schema or a cross-field rule.
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    /// Arguments passed the schema but did not fit the input type.
    /// Only argument decoding produces this; failures encoding a tool's
    /// own output are `Internal`.
    #[error("Invalid arguments: {0}")]
    Serialization(serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the caller sent bad arguments (JSON-RPC -32602) rather than
    /// the tool failing (-32000).
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Serialization(_) | Self::Client(ClientError::Validation { .. })
        )
    }

    /// Message returned to the MCP client.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!("Trove is rate limiting requests; wait {}s and try again.", retry_after.as_secs())
            }
            Self::Client(ClientError::NotFound { resource }) => {
                format!("Not found: {resource}. Check the ID and record type.")
            }
            Self::Client(ClientError::MissingApiKey | ClientError::Unauthorized { .. }) => {
                "The Trove API rejected the request. Check that TROVE_API_KEY is set and valid."
                    .to_string()
            }
            Self::Client(ClientError::Validation { field, message }) | Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

pub type ToolResult<T> = Result<T, ToolError>;
