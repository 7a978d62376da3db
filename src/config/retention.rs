//! Retention and reconciliation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How long unpaid submissions are kept and how often the sweep runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Age after which a `pending_payment` submission expires
    #[serde(default = "default_pending_payment_ttl_hours")]
    pub pending_payment_ttl_hours: i64,

    /// Interval between sweep runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pending_payment_ttl_hours <= 0 || self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidRetention);
        }
        Ok(())
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            pending_payment_ttl_hours: default_pending_payment_ttl_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_pending_payment_ttl_hours() -> i64 {
    24
}

fn default_sweep_interval_secs() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ttl_is_rejected() {
        let config = RetentionConfig {
            pending_payment_ttl_hours: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
