use super::backend::BlobStore;
use crate::error::StorageError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

type Container = BTreeMap<String, Vec<u8>>;

/// In-process blob store
///
/// Containers must exist before blobs can be written to them, mirroring the
/// remote service. Blob names enumerate in lexicographic order.
pub struct MemoryBlobStore {
    account_name: String,
    containers: RwLock<HashMap<String, Container>>,
}

impl MemoryBlobStore {
    pub fn new(account_name: impl Into<String>) -> Self {
        MemoryBlobStore {
            account_name: account_name.into(),
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Create an empty container if it does not exist yet
    pub fn with_container(self, container: impl Into<String>) -> Self {
        self.containers.write().entry(container.into()).or_default();
        self
    }

    /// Raw bytes of a stored blob
    #[cfg(test)]
    pub fn get_blob(&self, container: &str, name: &str) -> Option<Vec<u8>> {
        self.containers
            .read()
            .get(container)
            .and_then(|blobs| blobs.get(name).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn account_name(&self) -> &str {
        &self.account_name
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let mut containers = self.containers.write();
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        blobs.insert(name.to_string(), bytes);
        Ok(())
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StorageError> {
        let containers = self.containers.read();
        let blobs = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        Ok(blobs.keys().cloned().collect())
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StorageError> {
        let mut containers = self.containers.write();
        let blobs = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;
        blobs
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::BlobNotFound {
                container: container.to_string(),
                name: name.to_string(),
            })
    }
}
