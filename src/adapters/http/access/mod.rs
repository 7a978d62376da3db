//! HTTP adapter for access endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::access_routes;
