//! Request pacing and cache keys.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovRateLimiter};
use md5::{Digest, Md5};
use url::form_urlencoded;

/// Token bucket shared by every clone of a client.
#[derive(Clone)]
pub(crate) struct RateLimiter {
    limiter: Arc<GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    /// A limiter allowing `requests_per_minute` with bursts of `burst`.
    ///
    /// Returns `None` when `requests_per_minute` is zero (no limiting).
    pub(crate) fn per_minute(requests_per_minute: u32, burst: u32) -> Option<Self> {
        let rate = NonZeroU32::new(requests_per_minute)?;
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(rate).allow_burst(burst);
        Some(Self { limiter: Arc::new(GovRateLimiter::direct(quota)) })
    }

    /// Wait for a permit.
    pub(crate) async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is free.
    pub(crate) fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Cache key over method, path and parameters.
///
/// Parameters are sorted first, so the order callers add them in does not
/// split the cache. Keys and values are form-encoded before hashing so a
/// value holding `&` or `=` cannot collide with a different parameter set.
/// Credentials never enter the key.
pub(crate) fn cache_key(method: &str, path: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut hasher = Md5::new();
    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(path.as_bytes());
    hasher.update(b"|");

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    hasher.update(encoded.as_bytes());

    format!("{:x}", hasher.finalize())
}
