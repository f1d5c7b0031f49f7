pub mod azure;
pub mod backend;
pub mod connection_string;
pub mod memory;

pub use azure::AzureBlobStore;
pub use backend::BlobStore;
pub use connection_string::ConnectionString;
pub use memory::MemoryBlobStore;

use crate::config::{Config, StorageType};
use crate::error::InitializationError;
use std::sync::Arc;

/// Factory function to create the appropriate blob store backend
pub fn create_storage(config: &Config) -> Result<Arc<dyn BlobStore>, InitializationError> {
    let connection = ConnectionString::parse(&config.connection_string)?;

    match config.storage_type {
        StorageType::Azure => Ok(Arc::new(AzureBlobStore::new(connection)?)),
        StorageType::Memory => {
            tracing::warn!("Using in-memory blob store, uploads will not survive a restart");
            Ok(Arc::new(
                MemoryBlobStore::new(connection.account_name)
                    .with_container(config.container_name.clone()),
            ))
        }
    }
}
