use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::AppState;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build a limiter allowing `requests` per `period_secs`, bursting up to
/// `requests`. Returns `None` when either value is zero.
pub fn build_rate_limiter(requests: u32, period_secs: u64) -> Option<GlobalRateLimiter> {
    let burst = NonZeroU32::new(requests)?;
    let quota = Quota::with_period(Duration::from_secs(period_secs) / requests)?.allow_burst(burst);
    Some(RateLimiter::direct(quota))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}
