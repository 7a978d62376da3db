//! Account service and client storage configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// External account service. When `service_url` is unset an in-memory
/// directory is used, which only makes sense in development.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsConfig {
    pub service_url: Option<String>,
    pub api_token: Option<SecretString>,
}

impl AccountsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.service_url {
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                Err(ValidationError::InvalidAccountServiceUrl)
            }
            _ => Ok(()),
        }
    }
}

/// Where per-device client hints are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientStoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ClientStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/client")
}
