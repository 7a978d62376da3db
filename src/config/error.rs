//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid host or port")]
    InvalidSocketAddr,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool needs at least one connection")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Webhook tolerance must be positive")]
    InvalidWebhookTolerance,

    #[error("Site URL must be absolute http(s)")]
    InvalidSiteUrl,

    #[error("Return paths must start with '/'")]
    InvalidReturnPath,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    #[error("Rate limit windows and quotas must be positive")]
    InvalidRateLimit,

    #[error("Retention periods must be positive")]
    InvalidRetention,

    #[error("Account service URL must be absolute http(s)")]
    InvalidAccountServiceUrl,
}
