//! In-memory rate limiter implementation for testing and development.
//!
//! Uses a fixed-window counter algorithm with an in-memory HashMap.
//! Expired windows are pruned at most once per second, so keys that stop
//! calling do not accumulate. Not suitable for production multi-server
//! deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{RateLimitError, RateLimitKey, RateLimitResult, RateLimiter};

use super::config::RateLimitConfig;

/// In-memory rate limiter for testing and single-server deployments.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<Windows>>,
}

#[derive(Debug, Default)]
struct Windows {
    entries: HashMap<String, WindowState>,
    last_pruned: i64,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: i64,
    window_secs: u32,
}

impl WindowState {
    fn window_end(&self) -> i64 {
        self.window_start + self.window_secs as i64
    }
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(Windows::default())),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimitConfig::default())
    }

    async fn check_at(&self, key: &RateLimitKey, now: i64) -> RateLimitResult {
        let (limit, window_secs) = self.config.limit_for(key.action);
        let mut windows = self.windows.write().await;

        if now > windows.last_pruned {
            windows.entries.retain(|_, w| now < w.window_end());
            windows.last_pruned = now;
        }

        let state = windows
            .entries
            .entry(key.to_redis_key())
            .or_insert_with(|| WindowState {
                count: 0,
                window_start: now,
                window_secs,
            });

        if now >= state.window_end() {
            state.count = 0;
            state.window_start = now;
            state.window_secs = window_secs;
        }

        let window_end = state.window_end();
        if state.count >= limit {
            let retry_after = (window_end - now).max(1) as u32;
            return RateLimitResult::Denied {
                retry_after_secs: retry_after,
            };
        }

        state.count += 1;
        RateLimitResult::Allowed {
            remaining: limit.saturating_sub(state.count),
            reset_at: Timestamp::from_unix_secs(window_end).unwrap_or_else(Timestamp::now),
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, Timestamp::now().as_unix_secs()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::ActionLimit;
    use crate::ports::RateLimitedAction;

    fn limiter(requests: u32) -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            verify_email: ActionLimit::per_minute(requests),
            ..RateLimitConfig::default()
        })
    }

    fn key(client: &str) -> RateLimitKey {
        RateLimitKey::new(RateLimitedAction::VerifyEmail, client)
    }

    #[tokio::test]
    async fn allows_up_to_limit_then_denies() {
        let limiter = limiter(2);
        let now = 1_700_000_000;

        assert!(limiter.check_at(&key("ip"), now).await.is_allowed());
        assert!(limiter.check_at(&key("ip"), now).await.is_allowed());
        assert_eq!(
            limiter.check_at(&key("ip"), now + 10).await,
            RateLimitResult::Denied {
                retry_after_secs: 50
            }
        );
    }

    #[tokio::test]
    async fn window_expiry_restores_capacity() {
        let limiter = limiter(1);
        let now = 1_700_000_000;

        assert!(limiter.check_at(&key("ip"), now).await.is_allowed());
        assert!(!limiter.check_at(&key("ip"), now + 1).await.is_allowed());
        assert!(limiter.check_at(&key("ip"), now + 60).await.is_allowed());
    }

    #[tokio::test]
    async fn clients_have_separate_windows() {
        let limiter = limiter(1);
        let now = 1_700_000_000;

        assert!(limiter.check_at(&key("a"), now).await.is_allowed());
        assert!(limiter.check_at(&key("b"), now).await.is_allowed());
    }

    #[tokio::test]
    async fn expired_windows_are_pruned() {
        let limiter = limiter(1);
        let now = 1_700_000_000;

        for i in 0..50 {
            limiter.check_at(&key(&format!("10.0.0.{}", i)), now).await;
        }
        assert_eq!(limiter.windows.read().await.entries.len(), 50);

        limiter.check_at(&key("10.0.1.1"), now + 60).await;
        assert_eq!(limiter.windows.read().await.entries.len(), 1);
    }

    #[tokio::test]
    async fn check_uses_the_wall_clock() {
        let limiter = limiter(1);
        assert!(limiter.check(&key("ip")).await.unwrap().is_allowed());
        assert!(!limiter.check(&key("ip")).await.unwrap().is_allowed());
    }
}
