//! Configuration for the Trove client and MCP server.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Trove v3 API.
    pub const BASE_URL: &str = "https://api.trove.nla.gov.au/v3";

    /// Host serving persistent identifiers (`https://nla.gov.au/nla.obj-...`).
    pub const PID_HOST: &str = "https://nla.gov.au";

    /// Header carrying the API key.
    pub const API_KEY_HEADER: &str = "X-API-KEY";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests per minute allowed for a standard API key.
    pub const REQUESTS_PER_MINUTE: u32 = 200;

    /// Requests allowed back-to-back before the quota starts spacing them out.
    pub const BURST: u32 = 5;

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Retries for transient failures (5xx, 429, timeouts).
    pub const MAX_RETRIES: u32 = 3;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Default user agent.
    pub const USER_AGENT: &str = concat!("trove-sdk-rs/", env!("CARGO_PKG_VERSION"));
}

/// Bounds enforced by the parameter model and the harvesting helpers.
pub mod limits {
    /// Largest page size (`n`) the API accepts.
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// Page size used when none is given.
    pub const DEFAULT_PAGE_SIZE: u32 = 20;

    /// Upper bound on records a single harvest tool call may collect.
    pub const MAX_HARVEST_RECORDS: usize = 1000;

    /// Upper bound on pages per category for multi-category iteration.
    pub const MAX_PAGES_PER_CATEGORY: usize = 10;

    /// Concurrent requests issued by batch helpers such as `get_works`.
    pub const BATCH_CONCURRENCY: usize = 4;
}

/// Client and server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trove API key.
    pub api_key: Option<String>,

    /// Bearer token required by the MCP HTTP transport (optional).
    pub auth_token: Option<String>,

    /// Base URL for the API (overridden by tests with mock servers).
    pub base_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Requests per minute; `None` disables client-side rate limiting.
    pub requests_per_minute: Option<u32>,

    /// Burst size for the rate limiter.
    pub burst: u32,

    /// Whether responses are cached.
    pub cache_enabled: bool,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Config {
    /// Create a configuration with production defaults.
    #[must_use]
    pub fn new(api_key: Option<String>, auth_token: Option<String>) -> Self {
        Self {
            api_key,
            auth_token,
            base_url: api::BASE_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            requests_per_minute: Some(api::REQUESTS_PER_MINUTE),
            burst: api::BURST,
            cache_enabled: true,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            max_retries: api::MAX_RETRIES,
            user_agent: api::USER_AGENT.to_string(),
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            auth_token: None,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            requests_per_minute: None,
            burst: 1,
            cache_enabled: false,
            cache_ttl: Duration::from_secs(0),
            cache_max_size: 0,
            max_retries: 0,
            user_agent: api::USER_AGENT.to_string(),
        }
    }

    /// Create configuration from environment variables (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns error if a numeric variable or `TROVE_API_URL` cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let api_key = std::env::var("TROVE_API_KEY").ok().filter(|k| !k.is_empty());
        let auth_token = std::env::var("MCP_SERVER_AUTH_TOKEN").ok().filter(|t| !t.is_empty());
        let mut config = Self::new(api_key, auth_token);

        if let Ok(raw) = std::env::var("TROVE_API_URL") {
            let parsed = url::Url::parse(&raw).map_err(|e| anyhow::anyhow!("TROVE_API_URL: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("TROVE_API_URL: unsupported scheme '{}'", parsed.scheme());
            }
            config.base_url = raw.trim_end_matches('/').to_string();
        }
        if let Ok(rpm) = std::env::var("TROVE_RATE_LIMIT_PER_MINUTE") {
            let rpm: u32 = rpm
                .parse()
                .map_err(|e| anyhow::anyhow!("TROVE_RATE_LIMIT_PER_MINUTE: {e}"))?;
            config.requests_per_minute = (rpm > 0).then_some(rpm);
        }
        if let Ok(ttl) = std::env::var("TROVE_CACHE_TTL_SECS") {
            let ttl: u64 =
                ttl.parse().map_err(|e| anyhow::anyhow!("TROVE_CACHE_TTL_SECS: {e}"))?;
            config.cache_enabled = ttl > 0;
            config.cache_ttl = Duration::from_secs(ttl);
        }
        if let Ok(retries) = std::env::var("TROVE_MAX_RETRIES") {
            config.max_retries =
                retries.parse().map_err(|e| anyhow::anyhow!("TROVE_MAX_RETRIES: {e}"))?;
        }

        Ok(config)
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Replace the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Enable caching with the given TTL.
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration, max_size: u64) -> Self {
        self.cache_enabled = true;
        self.cache_ttl = ttl;
        self.cache_max_size = max_size;
        self
    }

    /// Set the client-side rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: u32, burst: u32) -> Self {
        self.requests_per_minute = Some(requests_per_minute);
        self.burst = burst;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None)
    }
}
