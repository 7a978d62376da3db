//! HTTP middleware for axum.
//!
//! - `rate_limit` - Per-client throttling of lookup and checkout routes

pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimitState};
