//! HTTP adapter for submission endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::submission_routes;
