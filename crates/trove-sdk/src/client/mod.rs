//! Trove API client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Client-side rate limiting (token bucket)
//! - Response caching with a TTL, keyed on normalised request parameters

mod middleware;

use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use self::middleware::{RateLimiter, cache_key};
use crate::citation::{Pid, PidTarget};
use crate::config::{Config, api, limits};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    AnyRecord, Article, ContributorList, Contributor, Encoding, Include, People, Record,
    RecordLevel, RecordType, SearchResponse, Title, TitleKind, TitleList, UserList, Work, xml,
};
use crate::query::SearchParams;

/// Options for single-record endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOptions {
    pub record_level: RecordLevel,
    pub include: Vec<Include>,
    pub encoding: Encoding,
}

impl RecordOptions {
    /// Full records.
    #[must_use]
    pub fn full() -> Self {
        Self { record_level: RecordLevel::Full, ..Self::default() }
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.record_level != RecordLevel::Brief {
            pairs.push(("reclevel".to_string(), self.record_level.as_str().to_string()));
        }
        if !self.include.is_empty() {
            let include = self.include.iter().map(|i| i.as_str()).collect::<Vec<_>>().join(",");
            pairs.push(("include".to_string(), include));
        }
        if self.encoding != Encoding::Json {
            pairs.push(("encoding".to_string(), self.encoding.as_str().to_string()));
        }
        pairs
    }
}

/// Options for `/<kind>/title/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleOptions {
    /// Include issue counts per year.
    pub include_years: bool,
    /// Restrict issue listings to a date range, as `YYYYMMDD-YYYYMMDD`.
    pub range: Option<String>,
}

/// Options for `/<kind>/titles`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleListOptions {
    /// State code ("nsw", "vic", "national", ...).
    pub state: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// What a PID resolved to.
#[derive(Debug, Clone)]
pub enum Resolved {
    Record(AnyRecord),
    Title(Record<Title>),
}

/// Trove API client. Cheap to clone; clones share the connection pool,
/// cache and rate limiter.
#[derive(Clone)]
pub struct TroveClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache (`None` when disabled).
    cache: Option<Cache<String, Value>>,

    /// Rate limiter (`None` when disabled).
    limiter: Option<RateLimiter>,

    api_key: Option<String>,

    base_url: String,

    request_timeout: Duration,
}

impl TroveClient {
    /// Create a new client with the given configuration.
    ///
    /// A missing API key is not an error here; requests fail with
    /// [`ClientError::MissingApiKey`] instead.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse()?);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = config.cache_enabled.then(|| {
            Cache::builder()
                .max_capacity(config.cache_max_size)
                .time_to_live(config.cache_ttl)
                .build()
        });

        let limiter = config
            .requests_per_minute
            .and_then(|rpm| RateLimiter::per_minute(rpm, config.burst));

        if config.api_key.is_none() {
            warn!("No Trove API key configured; requests will fail until TROVE_API_KEY is set");
        }

        Ok(Self {
            client,
            cache,
            limiter,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    /// Number of cached responses.
    ///
    /// Moka applies writes lazily; pending housekeeping runs first so the
    /// count is current.
    pub async fn cache_entry_count(&self) -> u64 {
        match &self.cache {
            Some(cache) => {
                cache.run_pending_tasks().await;
                cache.entry_count()
            }
            None => 0,
        }
    }

    /// Run one page of a search.
    ///
    /// # Errors
    ///
    /// Returns error on invalid parameters or API failure.
    pub async fn search(&self, params: &SearchParams) -> ClientResult<SearchResponse> {
        let value = self.search_raw(params).await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Run one page of a search, returning the untyped response.
    ///
    /// # Errors
    ///
    /// Returns error on invalid parameters or API failure.
    pub async fn search_raw(&self, params: &SearchParams) -> ClientResult<Value> {
        let pairs = params.to_query_pairs()?;
        self.get_value("/result", &pairs).await
    }

    /// Run several independent searches concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn search_many(&self, params: &[SearchParams]) -> ClientResult<Vec<SearchResponse>> {
        futures::future::try_join_all(params.iter().map(|p| self.search(p))).await
    }

    /// Get a work.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_work(&self, id: &str, options: &RecordOptions) -> ClientResult<Record<Work>> {
        self.get_record_path(RecordType::Work, id, options).await
    }

    /// Get a newspaper article.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_newspaper_article(
        &self,
        id: &str,
        options: &RecordOptions,
    ) -> ClientResult<Record<Article>> {
        self.get_record_path(RecordType::Newspaper, id, options).await
    }

    /// Get a government gazette article.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_gazette_article(
        &self,
        id: &str,
        options: &RecordOptions,
    ) -> ClientResult<Record<Article>> {
        self.get_record_path(RecordType::Gazette, id, options).await
    }

    /// Get a person or organisation.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_people(&self, id: &str, options: &RecordOptions) -> ClientResult<Record<People>> {
        self.get_record_path(RecordType::People, id, options).await
    }

    /// Get a user list.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_list(&self, id: &str, options: &RecordOptions) -> ClientResult<Record<UserList>> {
        self.get_record_path(RecordType::List, id, options).await
    }

    /// Get any record type.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_record(
        &self,
        record_type: RecordType,
        id: &str,
        options: &RecordOptions,
    ) -> ClientResult<AnyRecord> {
        Ok(match record_type {
            RecordType::Work => AnyRecord::Work(self.get_work(id, options).await?),
            RecordType::Newspaper => {
                AnyRecord::Article(self.get_newspaper_article(id, options).await?)
            }
            RecordType::Gazette => AnyRecord::Article(self.get_gazette_article(id, options).await?),
            RecordType::People => AnyRecord::People(self.get_people(id, options).await?),
            RecordType::List => AnyRecord::List(self.get_list(id, options).await?),
        })
    }

    /// Get several works concurrently, at most
    /// [`BATCH_CONCURRENCY`](limits::BATCH_CONCURRENCY) in flight. Results keep
    /// the order of `ids`.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn get_works(&self, ids: &[String], options: &RecordOptions) -> ClientResult<Vec<Record<Work>>> {
        stream::iter(ids)
            .map(|id| self.get_work(id, options))
            .buffered(limits::BATCH_CONCURRENCY)
            .try_collect()
            .await
    }

    /// Get a newspaper, magazine or gazette title.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_title(
        &self,
        kind: TitleKind,
        id: &str,
        options: &TitleOptions,
    ) -> ClientResult<Record<Title>> {
        let path = format!("/{}/title/{}", kind.as_str(), path_segment(id)?);
        let mut pairs = Vec::new();
        if options.include_years {
            pairs.push(("include".to_string(), "years".to_string()));
        }
        if let Some(range) = &options.range {
            pairs.push(("range".to_string(), range.clone()));
        }
        self.get(&path, &pairs).await
    }

    /// List titles of one kind.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn list_titles(&self, kind: TitleKind, options: &TitleListOptions) -> ClientResult<TitleList> {
        let path = format!("/{}/titles", kind.as_str());
        let mut pairs = Vec::new();
        if let Some(state) = &options.state {
            pairs.push(("state".to_string(), state.clone()));
        }
        if let Some(offset) = options.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = options.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        self.get(&path, &pairs).await
    }

    /// Search contributing libraries by name.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_contributors(&self, query: &str) -> ClientResult<ContributorList> {
        let mut pairs = Vec::new();
        if !query.trim().is_empty() {
            pairs.push(("q".to_string(), query.trim().to_string()));
        }
        self.get("/contributor", &pairs).await
    }

    /// Get a contributing library by NUC symbol.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_contributor(&self, nuc: &str) -> ClientResult<Record<Contributor>> {
        let path = format!("/contributor/{}", path_segment(nuc)?);
        self.get(&path, &[]).await
    }

    /// Fetch whatever a PID names.
    ///
    /// # Errors
    ///
    /// Returns a validation error for PIDs the API does not serve
    /// (pages, digitised objects, catalogue records), or the API error.
    pub async fn resolve_pid(&self, pid: &Pid, options: &RecordOptions) -> ClientResult<Resolved> {
        match pid.target() {
            Some(PidTarget::Record(record_type)) => {
                Ok(Resolved::Record(self.get_record(record_type, &pid.id, options).await?))
            }
            Some(PidTarget::Title(kind)) => {
                Ok(Resolved::Title(self.get_title(kind, &pid.id, &TitleOptions::default()).await?))
            }
            None => Err(ClientError::validation(
                "pid",
                format!("{} cannot be fetched through the API", pid.persistent_url()),
            )),
        }
    }

    async fn get_record_path<T: DeserializeOwned>(
        &self,
        record_type: RecordType,
        id: &str,
        options: &RecordOptions,
    ) -> ClientResult<T> {
        let path = format!("/{}/{}", record_type.as_str(), path_segment(id)?);
        self.get(&path, &options.to_pairs()).await
    }

    /// Make a GET request and deserialize the result.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(String, String)]) -> ClientResult<T> {
        let value = self.get_value(path, params).await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Make a GET request through the cache and rate limiter.
    async fn get_value(&self, path: &str, params: &[(String, String)]) -> ClientResult<Value> {
        let key = cache_key("GET", path, params);
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&key).await {
                debug!(path, "cache hit");
                return Ok(cached);
            }
        }

        let api_key = self.api_key.as_deref().ok_or(ClientError::MissingApiKey)?;

        if let Some(limiter) = &self.limiter {
            if !limiter.try_acquire() {
                debug!(path, "waiting for rate limiter");
                limiter.acquire().await;
            }
        }

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, params = params.len(), "GET");

        let response = self
            .client
            .get(&url)
            .header(api::API_KEY_HEADER, api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = handle_response(response, path).await?;

        let is_xml = params.iter().any(|(k, v)| k == "encoding" && v == Encoding::Xml.as_str());
        let value = if is_xml {
            let body = response.text().await?;
            xml::xml_to_value(&body)?
        } else {
            let body = response.bytes().await?;
            serde_json::from_slice(&body)?
        };

        if let Some(cache) = &self.cache {
            cache.insert(key, value.clone()).await;
        }

        Ok(value)
    }

    fn map_send_error(&self, error: reqwest_middleware::Error) -> ClientError {
        match &error {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                ClientError::Timeout(self.request_timeout)
            }
            _ => ClientError::from(error),
        }
    }
}

/// Map API status codes to errors.
async fn handle_response(response: reqwest::Response, path: &str) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 | 403 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::unauthorized(status.as_u16(), text))
        }
        429 => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => Err(ClientError::not_found(path)),
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Reject IDs that would change the request path.
fn path_segment(id: &str) -> ClientResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::validation("id", "identifier cannot be empty"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')) {
        return Err(ClientError::validation("id", format!("'{id}' is not a valid identifier")));
    }
    Ok(id)
}

impl std::fmt::Debug for TroveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TroveClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.has_api_key())
            .field("cache_enabled", &self.cache.is_some())
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}
