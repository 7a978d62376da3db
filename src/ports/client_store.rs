//! Durable client storage port.
//!
//! A namespaced key-value store that survives full-page navigation. Each
//! browser or device gets its own namespace. Contents are hints only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::access::AccessState;
use crate::domain::foundation::{CorrelationId, EmailAddress, ValidationError};
use crate::domain::payment::GateError;
use crate::domain::submission::{FormType, SubmissionFlowState};

pub const ACCESS_STATE_KEY: &str = "access_state";
pub const SUBMISSION_DRAFT_KEY: &str = "submission_draft";

#[derive(Debug, thiserror::Error)]
pub enum ClientStoreError {
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Failed to serialize value: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize value: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<ClientStoreError> for GateError {
    fn from(err: ClientStoreError) -> Self {
        match err {
            ClientStoreError::InvalidNamespace(ns) => GateError::Validation(
                ValidationError::invalid_format("namespace", format!("unsupported value {:?}", ns)),
            ),
            other => GateError::persistence(other.to_string()),
        }
    }
}

/// In-flight submission pointer kept on the client across the redirect.
///
/// Only references the server-side pending submission; losing it is
/// recoverable from the correlation id in the success URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    pub correlation_id: CorrelationId,
    pub email: EmailAddress,
    pub form_type: FormType,
    pub flow_state: SubmissionFlowState,
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ClientStoreError>;

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ClientStoreError>;

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), ClientStoreError>;

    /// Loads the access cache, defaulting to empty when absent.
    async fn load_access_state(&self, namespace: &str) -> Result<AccessState, ClientStoreError> {
        match self.get(namespace, ACCESS_STATE_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| ClientStoreError::DeserializationFailed(e.to_string())),
            None => Ok(AccessState::default()),
        }
    }

    async fn save_access_state(
        &self,
        namespace: &str,
        state: &AccessState,
    ) -> Result<(), ClientStoreError> {
        let value = serde_json::to_value(state)
            .map_err(|e| ClientStoreError::SerializationFailed(e.to_string()))?;
        self.set(namespace, ACCESS_STATE_KEY, value).await
    }

    async fn load_draft(&self, namespace: &str) -> Result<Option<ClientDraft>, ClientStoreError> {
        match self.get(namespace, SUBMISSION_DRAFT_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ClientStoreError::DeserializationFailed(e.to_string())),
            None => Ok(None),
        }
    }

    async fn save_draft(&self, namespace: &str, draft: &ClientDraft) -> Result<(), ClientStoreError> {
        let value = serde_json::to_value(draft)
            .map_err(|e| ClientStoreError::SerializationFailed(e.to_string()))?;
        self.set(namespace, SUBMISSION_DRAFT_KEY, value).await
    }
}

/// Namespaces become file names and key prefixes; keep them boring.
pub fn validate_namespace(namespace: &str) -> Result<(), ClientStoreError> {
    let ok = !namespace.is_empty()
        && namespace.len() <= 128
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ClientStoreError::InvalidNamespace(namespace.to_string()))
    }
}
