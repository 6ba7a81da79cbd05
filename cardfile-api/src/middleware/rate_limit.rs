//! Rate limiting middleware
//!
//! This module implements token bucket rate limiting keyed by client address.
//! Bucket state lives in process memory: the server is a single node, so no
//! external coordination store is involved.
//!
//! # Algorithm
//!
//! Token bucket:
//! - Tokens refill at constant rate
//! - Each request consumes 1 token
//! - Request blocked if bucket empty
//!
//! With the default ceiling of 5 requests/minute, a client gets a burst of 5
//! and then one token every 12 seconds.
//!
//! # Client identity
//!
//! The first `X-Forwarded-For` hop is trusted when present (the server sits
//! behind at most one proxy); otherwise the socket peer address is used.
//! Requests with no attributable address all share a single bucket.
//!
//! # Headers
//!
//! Responses from limited routes include:
//! - `X-RateLimit-Limit`: Total requests allowed per window
//! - `X-RateLimit-Remaining`: Tokens remaining
//! - `X-RateLimit-Reset`: Unix timestamp when tokens fully replenish
//! - `Retry-After`: Seconds to wait (429 responses only)

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Buckets idle longer than this are dropped during sweeps.
const BUCKET_TTL_SECS: u64 = 120;

/// Sweep stale buckets once the map grows past this many clients.
const SWEEP_THRESHOLD: usize = 1024;

/// Rate limit configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Maximum requests per minute
    pub requests_per_minute: u32,

    /// Token refill rate (tokens per second)
    pub refill_rate: f64,

    /// Maximum tokens in bucket (burst capacity)
    pub bucket_capacity: u32,
}

impl RateLimit {
    /// Builds a rate limit allowing `requests_per_minute` requests per minute
    /// per client, with burst capacity equal to the per-minute ceiling.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        RateLimit {
            requests_per_minute,
            refill_rate: f64::from(requests_per_minute) / 60.0,
            bucket_capacity: requests_per_minute,
        }
    }
}

/// Token bucket state for one client
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        TokenBucket {
            tokens: f64::from(capacity),
            last_refill: unix_now(),
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = unix_now();
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(f64::from(capacity));
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Result of a rate limit check
#[derive(Debug)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub ok: bool,

    /// Tokens remaining
    pub remaining: u32,

    /// Seconds until the relevant token count is available (1 token when
    /// denied, a full bucket when allowed)
    pub reset_after: u64,
}

/// Per-client-address token bucket limiter
///
/// Shared across requests via [`AppState`]. The bucket map is guarded by a
/// mutex held only for the duration of a check, never across an await point.
pub struct RateLimiter {
    limit: RateLimit,
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
}

impl RateLimiter {
    /// Creates a limiter with the given per-client limit
    pub fn new(limit: RateLimit) -> Self {
        RateLimiter {
            limit,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// The configured per-client limit
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Checks whether a request from `addr` is allowed, consuming one token
    /// if so.
    pub fn check(&self, addr: IpAddr) -> RateLimitResult {
        let mut buckets = self.buckets.lock().unwrap();

        if buckets.len() > SWEEP_THRESHOLD {
            let cutoff = unix_now().saturating_sub(BUCKET_TTL_SECS);
            buckets.retain(|_, bucket| bucket.last_refill >= cutoff);
        }

        let bucket = buckets
            .entry(addr)
            .or_insert_with(|| TokenBucket::new(self.limit.bucket_capacity));

        bucket.refill(self.limit.refill_rate, self.limit.bucket_capacity);

        if bucket.try_consume(1.0) {
            RateLimitResult {
                ok: true,
                remaining: bucket.tokens.floor() as u32,
                reset_after: bucket.seconds_until_available(
                    f64::from(self.limit.bucket_capacity),
                    self.limit.refill_rate,
                ),
            }
        } else {
            RateLimitResult {
                ok: false,
                remaining: 0,
                reset_after: bucket.seconds_until_available(1.0, self.limit.refill_rate),
            }
        }
    }
}

/// Rate limiting middleware layer
///
/// Checks the per-client limit before processing a request. Returns 429 with
/// a `Retry-After` header if exceeded; otherwise stamps the rate limit
/// headers onto the response.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let addr = client_addr(&request);
    let result = state.rate_limiter.check(addr);

    if !result.ok {
        tracing::warn!(client = %addr, retry_after = result.reset_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.reset_after,
            message: format!(
                "Rate limit exceeded. Try again in {} seconds",
                result.reset_after
            ),
        });
    }

    let limit = state.rate_limiter.limit();
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        "X-RateLimit-Limit",
        HeaderValue::from_str(&limit.requests_per_minute.to_string()).unwrap(),
    );
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from_str(&result.remaining.to_string()).unwrap(),
    );
    headers.insert(
        "X-RateLimit-Reset",
        HeaderValue::from_str(&(unix_now() + result.reset_after).to_string()).unwrap(),
    );

    Ok(response)
}

/// Resolves the client address a request is attributed to
fn client_addr(request: &Request) -> IpAddr {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
    {
        return forwarded;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_per_minute() {
        let limit = RateLimit::per_minute(5);
        assert_eq!(limit.requests_per_minute, 5);
        assert_eq!(limit.bucket_capacity, 5);
        assert!((limit.refill_rate - 5.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_bucket_new() {
        let bucket = TokenBucket::new(5);
        assert_eq!(bucket.tokens, 5.0);
        assert!(bucket.last_refill > 0);
    }

    #[test]
    fn test_token_bucket_consume() {
        let mut bucket = TokenBucket::new(10);
        assert!(bucket.try_consume(1.0));
        assert_eq!(bucket.tokens, 9.0);
        assert!(bucket.try_consume(5.0));
        assert_eq!(bucket.tokens, 4.0);
        assert!(!bucket.try_consume(10.0));
        assert_eq!(bucket.tokens, 4.0); // Unchanged after failed attempt
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket {
            tokens: 2.0,
            last_refill: unix_now() - 12, // 12 seconds ago
        };

        // 5/min refills one token every 12 seconds.
        bucket.refill(5.0 / 60.0, 5);
        assert!((bucket.tokens - 3.0).abs() < 0.25);
    }

    #[test]
    fn test_token_bucket_refill_capped() {
        let mut bucket = TokenBucket {
            tokens: 4.5,
            last_refill: unix_now() - 600,
        };

        bucket.refill(5.0 / 60.0, 5);
        assert_eq!(bucket.tokens, 5.0); // Capped at capacity
    }

    #[test]
    fn test_token_bucket_seconds_until_available() {
        let bucket = TokenBucket {
            tokens: 0.0,
            last_refill: unix_now(),
        };

        // Need 1 token at 1/12 tokens per second -> 12 seconds.
        assert_eq!(bucket.seconds_until_available(1.0, 5.0 / 60.0), 12);

        let full = TokenBucket::new(5);
        assert_eq!(full.seconds_until_available(1.0, 5.0 / 60.0), 0);
    }

    #[test]
    fn test_limiter_denies_sixth_request() {
        let limiter = RateLimiter::new(RateLimit::per_minute(5));
        let addr: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..5 {
            assert!(limiter.check(addr).ok);
        }

        let denied = limiter.check(addr);
        assert!(!denied.ok);
        assert!(denied.reset_after > 0);
    }

    #[test]
    fn test_limiter_isolates_addresses() {
        let limiter = RateLimiter::new(RateLimit::per_minute(5));
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        for _ in 0..5 {
            assert!(limiter.check(first).ok);
        }
        assert!(!limiter.check(first).ok);

        // A different client still has a full bucket.
        assert!(limiter.check(second).ok);
    }
}
