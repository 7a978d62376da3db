//! Per-client rate limiting for lookup and checkout routes.
//!
//! The limiter is keyed by client IP and action. The socket address is the
//! client unless the service runs behind a proxy that sets
//! `X-Forwarded-For`; only then are proxy headers read, since any caller
//! can send them. When the limiter backend is unavailable the request is
//! let through with a warning.
//!
//! ```ignore
//! let route = post(verify_email).layer(middleware::from_fn_with_state(
//!     RateLimitState::new(limiter, RateLimitedAction::VerifyEmail).trusting_proxy(true),
//!     rate_limit_middleware,
//! ));
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::payment::GateError;
use crate::ports::{RateLimitKey, RateLimitResult, RateLimitedAction, RateLimiter};

use super::super::error::ApiError;

pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<dyn RateLimiter>,
    action: RateLimitedAction,
    trust_proxy: bool,
}

impl RateLimitState {
    pub fn new(limiter: Arc<dyn RateLimiter>, action: RateLimitedAction) -> Self {
        Self {
            limiter,
            action,
            trust_proxy: false,
        }
    }

    /// Keys clients by `X-Forwarded-For` / `X-Real-IP` when set.
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let client = extract_client_ip(request.headers(), connect_info.as_ref(), state.trust_proxy)
        .unwrap_or_else(|| "unknown".to_string());
    let key = RateLimitKey::new(state.action, client);

    let allowed = match state.limiter.check(&key).await {
        Ok(RateLimitResult::Denied { retry_after_secs }) => {
            tracing::info!(action = %state.action, client = %key.client, "Rate limit exceeded");
            return ApiError::from(GateError::RateLimited { retry_after_secs }).into_response();
        }
        Ok(RateLimitResult::Allowed { remaining, reset_at }) => Some((remaining, reset_at)),
        Err(e) => {
            tracing::warn!(error = %e, action = %state.action, "Rate limiter unavailable");
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some((remaining, reset_at)) = allowed {
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
            headers.insert(X_RATELIMIT_REMAINING.clone(), value);
        }
        if let Ok(value) = HeaderValue::from_str(&reset_at.as_unix_secs().to_string()) {
            headers.insert(X_RATELIMIT_RESET.clone(), value);
        }
    }
    response
}

/// Client IP. Proxy headers win over the socket address only when trusted.
fn extract_client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<String> {
    if !trust_proxy {
        return connect_info.map(|ci| ci.0.ip().to_string());
    }

    if let Some(forwarded) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(first_ip) = forwarded.split(',').next() {
            let first_ip = first_ip.trim();
            if !first_ip.is_empty() {
                return Some(first_ip.to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        return Some(real_ip.trim().to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}
