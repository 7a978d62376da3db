//! Rate limiting port for the public lookup and checkout endpoints.
//!
//! Email verification answers "has this address paid", so it is throttled
//! per client to keep it from being used to enumerate customers.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::Timestamp;

/// Fixed-window rate limiter.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Consumes one request from the key's window.
    async fn check(&self, key: &RateLimitKey) -> Result<RateLimitResult, RateLimitError>;
}

/// Which endpoint family a limit applies to.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum RateLimitedAction {
    VerifyEmail,
    CreateCheckout,
}

impl RateLimitedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitedAction::VerifyEmail => "verify_email",
            RateLimitedAction::CreateCheckout => "create_checkout",
        }
    }
}

impl fmt::Display for RateLimitedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub action: RateLimitedAction,
    /// Client identifier, usually the remote IP.
    pub client: String,
}

impl RateLimitKey {
    pub fn new(action: RateLimitedAction, client: impl Into<String>) -> Self {
        Self {
            action,
            client: client.into(),
        }
    }

    pub fn to_redis_key(&self) -> String {
        format!("ratelimit:{}:{}", self.action.as_str(), self.client)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32, reset_at: Timestamp },
    Denied { retry_after_secs: u32 },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
