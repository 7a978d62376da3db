//! HTTP adapter - REST endpoints over the application handlers.
//!
//! Routes are grouped by area, each with its own DTOs and handlers, and
//! merged into one router that carries tracing, CORS, timeouts and
//! request ids.

pub mod access;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod router;
pub mod state;
pub mod submission;

pub use error::{ApiError, ErrorResponse};
pub use router::{build_router, RouterSettings};
pub use state::AppState;
