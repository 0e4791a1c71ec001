//! # Authentication Module
//!
//! Optional API key authentication for the Kenning HTTP API.
//!
//! When `KENNING_API_KEY` is set and non-empty, every endpoint except
//! `/health` requires:
//!
//! ```text
//! Authorization: Bearer <your-api-key>
//! ```
//!
//! A raw key without the `Bearer ` prefix is accepted too.

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Paths reachable without a key (load balancer probes).
const PUBLIC_PATHS: [&str; 1] = ["/health"];

/// Get API key from environment variable.
///
/// Returns `None` (authentication disabled) when `KENNING_API_KEY` is unset
/// or empty.
pub fn get_api_key_from_env() -> Option<String> {
    std::env::var("KENNING_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// The key carried by an `Authorization` header value.
fn provided_key(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
}

/// Constant-time key comparison.
///
/// Both sides are zero-padded to a common length so the comparison always
/// covers the same number of bytes; the length check happens afterwards.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let len = provided.len().max(expected.len());
    let mut a = vec![0u8; len];
    let mut b = vec![0u8; len];
    a[..provided.len()].copy_from_slice(provided);
    b[..expected.len()].copy_from_slice(expected);

    let bytes_match: bool = a.ct_eq(&b).into();
    bytes_match && provided.len() == expected.len()
}

/// API key authentication middleware.
pub async fn api_key_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let Some(expected) = get_api_key_from_env() else {
        return Ok(next.run(request).await);
    };

    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header_value) = header_value else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_authorization_header",
            path = %request.uri().path(),
            "Missing Authorization header"
        );
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    };

    if keys_match(provided_key(header_value).as_bytes(), expected.as_bytes()) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(
            event = "auth_failure",
            reason = "invalid_api_key",
            path = %request.uri().path(),
            "Authentication failed: invalid API key"
        );
        Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

// =============================================================================
// TESTS
// =============================================================================
