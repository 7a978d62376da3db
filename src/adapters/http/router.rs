//! Top-level router and cross-cutting layers.

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::access::access_routes;
use super::payment::payment_routes;
use super::state::AppState;
use super::submission::submission_routes;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Rate limit by proxy-supplied client IPs instead of the socket address.
    pub trust_proxy: bool,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            trust_proxy: false,
        }
    }
}

pub fn build_router(state: AppState, settings: &RouterSettings) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(payment_routes(&state, settings.trust_proxy))
        .merge(access_routes(&state, settings.trust_proxy))
        .merge(submission_routes())
        .with_state(state)
        .layer(cors_layer(&settings.cors_origins))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
}

/// An empty origin list allows any origin, for local development.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}
