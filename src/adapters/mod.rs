//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `stripe` - Hosted checkout and webhook verification
//! - `postgres` - Ledger and submission persistence
//! - `memory` - In-process stores with the same semantics, for tests and local runs
//! - `storage` - Durable client store (YAML files or memory)
//! - `rate_limiter` - Fixed-window limiter (memory or Redis)
//! - `account` - External account directory over HTTP
//! - `http` - axum routes

pub mod account;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod storage;
pub mod stripe;
