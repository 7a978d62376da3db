//! File-based Client Store Adapter
//!
//! Keeps one YAML document per namespace under a base directory. Values are
//! written to a temp file and renamed into place so a crash never leaves a
//! half-written document behind.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use crate::ports::{validate_namespace, ClientStore, ClientStoreError};

type Document = BTreeMap<String, serde_json::Value>;

/// File-based storage for client hints
#[derive(Debug, Clone)]
pub struct FileClientStore {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileClientStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let store = FileClientStore::new("./data/client");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn document_path(&self, namespace: &str) -> PathBuf {
        self.base_path.join(format!("{}.yaml", namespace))
    }

    async fn read_document(&self, namespace: &str) -> Result<Document, ClientStoreError> {
        let path = self.document_path(namespace);
        if !path.exists() {
            return Ok(Document::new());
        }

        let yaml = fs::read_to_string(&path)
            .await
            .map_err(|e| ClientStoreError::IoError(e.to_string()))?;

        if yaml.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_yaml::from_str(&yaml)
            .map_err(|e| ClientStoreError::DeserializationFailed(e.to_string()))
    }

    async fn write_document(
        &self,
        namespace: &str,
        document: &Document,
    ) -> Result<(), ClientStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| ClientStoreError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(document)
            .map_err(|e| ClientStoreError::SerializationFailed(e.to_string()))?;

        let path = self.document_path(namespace);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml)
            .await
            .map_err(|e| ClientStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ClientStoreError::IoError(e.to_string()))
    }
}

#[async_trait]
impl ClientStore for FileClientStore {
    async fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, ClientStoreError> {
        validate_namespace(namespace)?;
        let mut document = self.read_document(namespace).await?;
        Ok(document.remove(key))
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), ClientStoreError> {
        validate_namespace(namespace)?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document(namespace).await?;
        document.insert(key.to_string(), value);
        self.write_document(namespace, &document).await
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), ClientStoreError> {
        validate_namespace(namespace)?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document(namespace).await?;
        if document.remove(key).is_some() {
            self.write_document(namespace, &document).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::AccessState;
    use crate::domain::foundation::EmailAddress;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn values_survive_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let store = FileClientStore::new(dir.path());
        store.set("device-1", "k", json!({"a": 1})).await.unwrap();

        let reopened = FileClientStore::new(dir.path());
        assert_eq!(reopened.get("device-1", "k").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn missing_namespace_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileClientStore::new(dir.path());
        assert_eq!(store.get("nobody", "k").await.unwrap(), None);
        assert_eq!(
            store.load_access_state("nobody").await.unwrap(),
            AccessState::default()
        );
    }

    #[tokio::test]
    async fn access_state_round_trips_through_yaml() {
        let dir = TempDir::new().unwrap();
        let store = FileClientStore::new(dir.path());
        let mut state = AccessState::default();
        state.mark_paid_pending_account(EmailAddress::parse("a@x.com").unwrap());

        store.save_access_state("device-1", &state).await.unwrap();
        assert_eq!(store.load_access_state("device-1").await.unwrap(), state);
    }

    #[tokio::test]
    async fn remove_deletes_only_the_key() {
        let dir = TempDir::new().unwrap();
        let store = FileClientStore::new(dir.path());
        store.set("ns", "a", json!(1)).await.unwrap();
        store.set("ns", "b", json!(2)).await.unwrap();

        store.remove("ns", "a").await.unwrap();

        assert_eq!(store.get("ns", "a").await.unwrap(), None);
        assert_eq!(store.get("ns", "b").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn rejects_traversal_namespaces() {
        let dir = TempDir::new().unwrap();
        let store = FileClientStore::new(dir.path());
        let err = store.set("../escape", "k", json!(1)).await.unwrap_err();
        assert!(matches!(err, ClientStoreError::InvalidNamespace(_)));
    }
}
