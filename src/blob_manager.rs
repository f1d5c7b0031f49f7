use crate::config::Config;
use crate::error::{DeleteError, InitializationError, StorageError, UploadError};
use crate::reference::{build_reference, destination_name, parse_reference, BlobReference};
use crate::storage::{create_storage, BlobStore};
use std::sync::Arc;
use uuid::Uuid;

/// Storage client shared by all request handlers
///
/// Wraps one blob store handle and the container uploads go to. Remote
/// failures never reach callers: `upload` yields `None`, `delete` yields
/// `false` and `list` yields an empty list, with the cause logged. The
/// `try_*` variants return the structured error instead.
pub struct BlobManager {
    store: Arc<dyn BlobStore>,
    container: String,
}

impl BlobManager {
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        BlobManager {
            store,
            container: container.into(),
        }
    }

    /// Build the client from configuration; fails on missing or invalid credentials
    pub fn initialize(config: &Config) -> Result<Self, InitializationError> {
        let store = create_storage(config)?;
        tracing::info!(
            "Blob manager ready: account={} container={}",
            store.account_name(),
            config.container_name
        );
        Ok(BlobManager::new(store, config.container_name.clone()))
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub async fn try_upload(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<BlobReference, UploadError> {
        let blob_name = destination_name(Uuid::new_v4(), file_name);

        self.store
            .put_blob(&self.container, &blob_name, content)
            .await
            .map_err(|source| UploadError::Store {
                file_name: file_name.to_string(),
                blob_name: blob_name.clone(),
                source,
            })?;

        Ok(build_reference(
            self.store.account_name(),
            &self.container,
            &blob_name,
        ))
    }

    /// Upload one file; `None` is the only failure signal
    pub async fn upload(&self, file_name: &str, content: Vec<u8>) -> Option<BlobReference> {
        match self.try_upload(file_name, content).await {
            Ok(reference) => {
                tracing::info!("Uploaded {} to {}", file_name, reference);
                Some(reference)
            }
            Err(e) => {
                tracing::error!("Failed to upload blob: {}", e);
                None
            }
        }
    }

    pub async fn try_list(&self) -> Result<Vec<BlobReference>, StorageError> {
        let names = self.store.list_blobs(&self.container).await?;
        let account = self.store.account_name();

        Ok(names
            .iter()
            .map(|name| build_reference(account, &self.container, name))
            .collect())
    }

    /// References of every blob in the container, in enumeration order
    pub async fn list(&self) -> Vec<BlobReference> {
        self.try_list().await.unwrap_or_else(|e| {
            tracing::error!("Failed to list blobs in {}: {}", self.container, e);
            Vec::new()
        })
    }

    /// Delete the blob a reference points at
    ///
    /// The container is taken from the reference itself, not from this client.
    pub async fn try_delete(&self, reference: &str) -> Result<(), DeleteError> {
        let (container, name) = parse_reference(reference)?;

        self.store
            .delete_blob(container, name)
            .await
            .map_err(|source| DeleteError::Store {
                container: container.to_string(),
                name: name.to_string(),
                source,
            })
    }

    pub async fn delete(&self, reference: &str) -> bool {
        match self.try_delete(reference).await {
            Ok(()) => {
                tracing::info!("Deleted {}", reference);
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete blob: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::StorageType;
    use crate::storage::MemoryBlobStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that delegates to memory but fails the put calls listed in `fail_on`
    pub(crate) struct FlakyStore {
        pub inner: MemoryBlobStore,
        pub fail_on: Vec<usize>,
        pub puts: AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        fn account_name(&self) -> &str {
            self.inner.account_name()
        }

        async fn put_blob(
            &self,
            container: &str,
            name: &str,
            bytes: Vec<u8>,
        ) -> Result<(), StorageError> {
            let call = self.puts.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&call) {
                return Err(StorageError::Signing("injected failure".to_string()));
            }
            self.inner.put_blob(container, name, bytes).await
        }

        async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StorageError> {
            self.inner.list_blobs(container).await
        }

        async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StorageError> {
            self.inner.delete_blob(container, name).await
        }
    }

    fn memory_manager() -> (Arc<MemoryBlobStore>, BlobManager) {
        let store = Arc::new(MemoryBlobStore::new("photostore").with_container("photos"));
        let manager = BlobManager::new(store.clone(), "photos");
        (store, manager)
    }

    #[tokio::test]
    async fn test_upload_then_list_contains_reference() {
        let (store, manager) = memory_manager();

        let reference = manager.upload("photo.jpg", b"jpeg-bytes".to_vec()).await.unwrap();
        assert!(reference.starts_with("https://photostore.blob.core.windows.net/photos/"));

        let listed = manager.list().await;
        assert_eq!(listed, vec![reference.clone()]);

        let (_, blob_id) = parse_reference(&reference).unwrap();
        assert_eq!(store.get_blob("photos", blob_id), Some(b"jpeg-bytes".to_vec()));
    }

    #[tokio::test]
    async fn test_uploaded_name_keeps_undotted_extension() {
        let (_, manager) = memory_manager();

        let reference = manager.upload("photo.jpg", vec![1, 2, 3]).await.unwrap();
        let (_, blob_id) = parse_reference(&reference).unwrap();

        assert!(blob_id.ends_with("jpg"));
        assert!(!blob_id.ends_with(".jpg"));
        let id_part = &blob_id[..blob_id.len() - "jpg".len()];
        assert!(Uuid::parse_str(id_part).is_ok());
    }

    #[tokio::test]
    async fn test_identical_content_gets_distinct_references() {
        let (_, manager) = memory_manager();

        let first = manager.upload("same.png", vec![7; 16]).await.unwrap();
        let second = manager.upload("same.png", vec![7; 16]).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(manager.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_succeeds_exactly_once() {
        let (_, manager) = memory_manager();
        let reference = manager.upload("photo.jpg", vec![1]).await.unwrap();

        assert!(manager.delete(&reference).await);
        assert!(!manager.delete(&reference).await);
        assert!(manager.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_malformed_or_unknown_container_returns_false() {
        let (_, manager) = memory_manager();

        assert!(!manager.delete("").await);
        assert!(!manager.delete("not-a-url").await);
        assert!(
            !manager
                .delete("https://photostore.blob.core.windows.net/missing/abcjpg")
                .await
        );

        let err = manager.try_delete("not-a-url").await.unwrap_err();
        assert!(matches!(err, DeleteError::MalformedReference(_)));
    }

    #[tokio::test]
    async fn test_delete_uses_container_from_reference() {
        let store = Arc::new(
            MemoryBlobStore::new("photostore")
                .with_container("photos")
                .with_container("archive"),
        );
        store.put_blob("archive", "old.png", vec![1]).await.unwrap();
        let manager = BlobManager::new(store.clone(), "photos");

        assert!(
            manager
                .delete("https://photostore.blob.core.windows.net/archive/old.png")
                .await
        );
        assert!(store.get_blob("archive", "old.png").is_none());
    }

    #[tokio::test]
    async fn test_failed_upload_returns_none() {
        let store = Arc::new(FlakyStore {
            inner: MemoryBlobStore::new("photostore").with_container("photos"),
            fail_on: vec![0],
            puts: AtomicUsize::new(0),
        });
        let manager = BlobManager::new(store, "photos");

        assert!(manager.upload("photo.jpg", vec![1]).await.is_none());
        assert!(manager.upload("photo.jpg", vec![1]).await.is_some());
    }

    #[tokio::test]
    async fn test_upload_into_missing_container_fails() {
        let store = Arc::new(MemoryBlobStore::new("photostore"));
        let manager = BlobManager::new(store, "photos");

        let err = manager.try_upload("photo.jpg", vec![1]).await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::Store {
                source: StorageError::ContainerNotFound(_),
                ..
            }
        ));
        assert!(manager.list().await.is_empty());
        assert!(manager.try_list().await.is_err());
    }

    #[test]
    fn test_initialize_requires_valid_credentials() {
        let mut config = Config {
            connection_string: "AccountName=photostore".to_string(),
            container_name: "photos".to_string(),
            storage_type: StorageType::Memory,
            server_port: 3000,
            max_upload_bytes: 1024,
            latency_targets: None,
        };
        assert!(BlobManager::initialize(&config).is_err());

        config.connection_string =
            "AccountName=photostore;AccountKey=dGVzdGtleXRlc3RrZXl0ZXN0a2V5dGVzdGtleQ=="
                .to_string();
        let manager = BlobManager::initialize(&config).unwrap();
        assert_eq!(manager.container(), "photos");
    }
}
