//! Rate limiter adapters.
//!
//! - `InMemoryRateLimiter` - In-memory for testing and single-server
//! - `RedisRateLimiter` - Redis-backed for production multi-server
//!
//! ```ignore
//! let limiter = InMemoryRateLimiter::with_defaults();
//! let limiter = RedisRateLimiter::connect("redis://127.0.0.1/", RateLimitConfig::default()).await?;
//! ```

mod config;
mod in_memory;
mod redis;

pub use config::{ActionLimit, RateLimitConfig};
pub use in_memory::InMemoryRateLimiter;
pub use redis::RedisRateLimiter;
