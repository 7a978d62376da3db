//! Router for submission endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::state::AppState;
use super::handlers::{pending_submission, submit_form};

/// - `POST /submit-form` - Stores a submission, deciding whether it needs payment
/// - `GET /pending-submissions/:correlation_id` - Resolves a checkout redirect
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/submit-form", post(submit_form))
        .route("/pending-submissions/:correlation_id", get(pending_submission))
}
