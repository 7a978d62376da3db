//! Router for access endpoints.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::ports::RateLimitedAction;

use super::super::middleware::{rate_limit_middleware, RateLimitState};
use super::super::state::AppState;
use super::handlers::{form_access, verify_email};

/// - `POST /verify-email` - Rate limited; an email lookup is an enumeration oracle
/// - `GET /form-access` - Evaluates the guard for one device
pub fn access_routes(state: &AppState, trust_proxy: bool) -> Router<AppState> {
    let limited = RateLimitState::new(state.rate_limiter.clone(), RateLimitedAction::VerifyEmail)
        .trusting_proxy(trust_proxy);

    Router::new()
        .route(
            "/verify-email",
            post(verify_email).layer(middleware::from_fn_with_state(limited, rate_limit_middleware)),
        )
        .route("/form-access", get(form_access))
}
