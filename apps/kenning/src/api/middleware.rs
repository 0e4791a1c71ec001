//! # Middleware Module
//!
//! Global rate limiting for the Kenning HTTP API.
//!
//! `KENNING_RATE_LIMIT` sets the requests per second (default 100, 0
//! disables the limiter). Rejected requests get `429` with a `Retry-After`
//! header in whole seconds.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default rate limit: 100 requests per second.
const DEFAULT_RPS: u32 = 100;

/// Shared limiter for all clients.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a global limiter; zero falls back to the default rate.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .or(NonZeroU32::new(DEFAULT_RPS))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Requests per second from `KENNING_RATE_LIMIT`, or the default.
pub fn get_rate_limit_from_env() -> u32 {
    parse_rate_limit(std::env::var("KENNING_RATE_LIMIT").ok().as_deref())
}

fn parse_rate_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RPS)
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(()) => next.run(request).await,
        Err(not_until) => {
            let wait = not_until.wait_time_from(limiter.clock().now());
            let retry_after = wait.as_secs().max(1);
            tracing::warn!(retry_after, "Rate limit exceeded");

            let mut response = (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
