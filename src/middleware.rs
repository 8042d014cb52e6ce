use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::metrics::{RATE_LIMITED_TOTAL, RATE_LIMIT_TRACKED};
use crate::rate_limit::RateLimitConfig;
use crate::state::AppState;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Caller key: first `x-forwarded-for` hop, then `x-real-ip`, then "anonymous".
///
/// Both headers are client-controlled. Unless a trusted proxy in front of the
/// gateway overwrites them, a caller can pick its own key and dodge the limit.
pub fn client_identifier(headers: &HeaderMap) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .or_else(|| header_str(headers, "x-real-ip"))
        .unwrap_or("anonymous")
        .to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

// Gate in front of every /api route
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let limiter = &state.rate_limiter;
    let identifier = client_identifier(request.headers());

    let limited = limiter.is_rate_limited(&identifier);
    RATE_LIMIT_TRACKED.set(limiter.tracked() as f64);

    if limited {
        RATE_LIMITED_TOTAL.inc();
        debug!(identifier = %identifier, "Rate limit exceeded");
        return too_many_requests(limiter.config(), limiter.now_ms());
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limiter.config().max));
    headers.insert(
        X_RATELIMIT_REMAINING,
        HeaderValue::from(limiter.get_remaining(&identifier)),
    );
    response
}

fn too_many_requests(config: RateLimitConfig, now_ms: u64) -> Response {
    let reset = now_ms + config.window.as_millis() as u64;

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": "Too many requests" })),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(RETRY_AFTER, HeaderValue::from(config.window.as_secs()));
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(config.max));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset));
    response
}
