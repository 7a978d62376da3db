//! Rate limit configuration types.
//!
//! One fixed window per rate-limited action.

use serde::{Deserialize, Serialize};

use crate::ports::RateLimitedAction;

/// Limits for every rate-limited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Email lookups per client. Kept tight to slow down enumeration.
    pub verify_email: ActionLimit,
    /// Checkout session creations per client.
    pub create_checkout: ActionLimit,
}

/// A fixed-window limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLimit {
    /// Maximum requests per window.
    pub requests_per_window: u32,
    /// Window duration in seconds.
    pub window_secs: u32,
}

impl ActionLimit {
    pub fn per_minute(requests: u32) -> Self {
        Self {
            requests_per_window: requests,
            window_secs: 60,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            verify_email: ActionLimit::per_minute(10),
            create_checkout: ActionLimit::per_minute(20),
        }
    }
}

impl RateLimitConfig {
    /// Returns (limit, window_secs) for an action.
    pub fn limit_for(&self, action: RateLimitedAction) -> (u32, u32) {
        let limit = match action {
            RateLimitedAction::VerifyEmail => self.verify_email,
            RateLimitedAction::CreateCheckout => self.create_checkout,
        };
        (limit.requests_per_window, limit.window_secs.max(1))
    }
}
