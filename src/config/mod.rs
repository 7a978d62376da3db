//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `INTAKE_GATE` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use intake_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod accounts;
mod database;
mod error;
mod payment;
mod rate_limit;
mod retention;
mod server;

pub use accounts::{AccountsConfig, ClientStoreConfig};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use rate_limit::RateLimitSettings;
pub use retention::RetentionConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL. When absent the service runs on in-memory stores.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Payment provider (Stripe)
    pub payment: PaymentConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub client_store: ClientStoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `INTAKE_GATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `INTAKE_GATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `INTAKE_GATE__PAYMENT__STRIPE_API_KEY=...` -> `payment.stripe_api_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("INTAKE_GATE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        match &self.database {
            Some(database) => database.validate()?,
            None if self.is_production() => {
                return Err(ValidationError::MissingRequired("DATABASE_URL"))
            }
            None => {}
        }
        self.payment.validate()?;
        self.rate_limit.validate()?;
        self.retention.validate()?;
        self.accounts.validate()?;
        if self.is_production() {
            if self.accounts.service_url.is_none() {
                return Err(ValidationError::MissingRequired("ACCOUNTS_SERVICE_URL"));
            }
            // An empty list means any origin.
            if self.server.cors_origins_list().is_empty() {
                return Err(ValidationError::MissingRequired("SERVER_CORS_ORIGINS"));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "INTAKE_GATE__PAYMENT__STRIPE_API_KEY",
        "INTAKE_GATE__PAYMENT__STRIPE_WEBHOOK_SECRET",
        "INTAKE_GATE__DATABASE__URL",
        "INTAKE_GATE__SERVER__PORT",
        "INTAKE_GATE__SERVER__ENVIRONMENT",
        "INTAKE_GATE__RATE_LIMIT__VERIFY_EMAIL_PER_MINUTE",
    ];

    fn set_minimal_env() {
        env::set_var("INTAKE_GATE__PAYMENT__STRIPE_API_KEY", "sk_test_xxx");
        env::set_var("INTAKE_GATE__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.payment.stripe_api_key.expose_secret(), "sk_test_xxx");
        assert!(config.database.is_none());
        assert_eq!(config.retention.pending_payment_ttl_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTAKE_GATE__SERVER__PORT", "3000");
        env::set_var("INTAKE_GATE__RATE_LIMIT__VERIFY_EMAIL_PER_MINUTE", "3");
        env::set_var("INTAKE_GATE__DATABASE__URL", "postgresql://test@localhost/intake");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rate_limit.verify_email_per_minute, 3);
        assert_eq!(
            config.database.map(|d| d.url.expose_secret().clone()).as_deref(),
            Some("postgresql://test@localhost/intake")
        );
    }

    #[test]
    fn test_production_requires_database() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("INTAKE_GATE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_missing_payment_section_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
