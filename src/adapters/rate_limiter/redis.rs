//! Fixed-window rate limiting shared across instances through Redis.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateLimitError, RateLimitKey, RateLimitResult, RateLimiter};

use super::config::RateLimitConfig;

/// Redis-backed rate limiter for multi-server deployments.
///
/// Each check runs one `MULTI` block: `INCR`, `EXPIRE .. NX`, `TTL`. The
/// window starts at the first hit and a crashed caller cannot leave a
/// counter without an expiry. Needs Redis 7 for `EXPIRE NX`.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: MultiplexedConnection,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(conn: MultiplexedConnection, config: RateLimitConfig) -> Self {
        Self { conn, config }
    }

    /// Opens a multiplexed connection to `redis_url`.
    pub async fn connect(redis_url: &str, config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self::new(conn, config))
    }
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::Unavailable(e.to_string())
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        let redis_key = key.to_redis_key();
        let (limit, window_secs) = self.config.limit_for(key.action);

        let mut conn = self.conn.clone();
        let (count, ttl): (i64, i64) = redis::pipe()
            .atomic()
            .incr(&redis_key, 1_i64)
            .cmd("EXPIRE")
            .arg(&redis_key)
            .arg(window_secs)
            .arg("NX")
            .ignore()
            .ttl(&redis_key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        let reset_secs = if ttl > 0 { ttl } else { i64::from(window_secs) };

        if count > limit as i64 {
            return Ok(RateLimitResult::Denied {
                retry_after_secs: (reset_secs as u32).max(1),
            });
        }

        Ok(RateLimitResult::Allowed {
            remaining: limit.saturating_sub(count as u32),
            reset_at: Timestamp::now().plus_secs(reset_secs),
        })
    }
}

impl std::fmt::Debug for RedisRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
