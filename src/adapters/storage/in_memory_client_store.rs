//! In-Memory Client Store Adapter
//!
//! Useful for testing and single-process development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{validate_namespace, ClientStore, ClientStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryClientStore {
    entries: Arc<RwLock<HashMap<(String, String), serde_json::Value>>>,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every key in `namespace`, like clearing site data.
    pub async fn clear_namespace(&self, namespace: &str) {
        self.entries.write().await.retain(|(ns, _), _| ns != namespace);
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ClientStoreError> {
        validate_namespace(namespace)?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ClientStoreError> {
        validate_namespace(namespace)?;
        self.entries
            .write()
            .await
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), ClientStoreError> {
        validate_namespace(namespace)?;
        self.entries
            .write()
            .await
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}
