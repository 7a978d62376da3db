//! Router for payment endpoints.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::ports::RateLimitedAction;

use super::super::middleware::{rate_limit_middleware, RateLimitState};
use super::super::state::AppState;
use super::handlers::{create_checkout_session, payment_status, payment_webhook};

/// - `POST /create-checkout-session` - Rate limited per client
/// - `POST /payment-webhook` - Signature verified, never rate limited
/// - `GET /payment-status` - Ledger lookup for success-page polling
pub fn payment_routes(state: &AppState, trust_proxy: bool) -> Router<AppState> {
    let limited = RateLimitState::new(state.rate_limiter.clone(), RateLimitedAction::CreateCheckout)
        .trusting_proxy(trust_proxy);

    Router::new()
        .route(
            "/create-checkout-session",
            post(create_checkout_session)
                .layer(middleware::from_fn_with_state(limited, rate_limit_middleware)),
        )
        .route("/payment-webhook", post(payment_webhook))
        .route("/payment-status", get(payment_status))
}
