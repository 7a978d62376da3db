//! Rate limit configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::rate_limiter::{ActionLimit, RateLimitConfig};

/// Per-client limits for the public endpoints. Backed by Redis when
/// `redis_url` is set, otherwise by process memory.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub redis_url: Option<String>,

    #[serde(default = "default_verify_email_per_minute")]
    pub verify_email_per_minute: u32,

    #[serde(default = "default_checkout_per_minute")]
    pub checkout_per_minute: u32,
}

impl RateLimitSettings {
    pub fn limits(&self) -> RateLimitConfig {
        RateLimitConfig {
            verify_email: ActionLimit::per_minute(self.verify_email_per_minute),
            create_checkout: ActionLimit::per_minute(self.checkout_per_minute),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.verify_email_per_minute == 0 || self.checkout_per_minute == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        if let Some(url) = &self.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        Ok(())
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            verify_email_per_minute: default_verify_email_per_minute(),
            checkout_per_minute: default_checkout_per_minute(),
        }
    }
}

fn default_verify_email_per_minute() -> u32 {
    10
}

fn default_checkout_per_minute() -> u32 {
    20
}
