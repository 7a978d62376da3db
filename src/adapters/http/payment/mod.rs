//! HTTP adapter for checkout, webhook and payment status endpoints.

pub mod dto;
mod handlers;
mod routes;

pub use routes::payment_routes;
