use crate::error::StorageError;
use async_trait::async_trait;

/// Trait defining the interface for blob store backends
///
/// A backend is addressed by container and blob name; it knows nothing about
/// reference URLs or how blob names are generated.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Storage account the blobs live in
    fn account_name(&self) -> &str;

    /// Store `bytes` as blob `name` in `container`, replacing any existing blob
    async fn put_blob(&self, container: &str, name: &str, bytes: Vec<u8>)
        -> Result<(), StorageError>;

    /// Names of all blobs in `container`, in the store's enumeration order
    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StorageError>;

    /// Delete blob `name` from `container`; a missing blob is an error
    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StorageError>;
}

/// Guess a MIME type from the blob name's trailing extension
///
/// Destination names carry the extension without a dot, so this matches on
/// the lowercase suffix of the whole name.
pub fn content_type_for(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    const TYPES: &[(&str, &str)] = &[
        ("jpeg", "image/jpeg"),
        ("jpg", "image/jpeg"),
        ("png", "image/png"),
        ("gif", "image/gif"),
        ("webp", "image/webp"),
        ("svg", "image/svg+xml"),
        ("bmp", "image/bmp"),
        ("tiff", "image/tiff"),
        ("tif", "image/tiff"),
        ("ico", "image/x-icon"),
    ];
    TYPES
        .iter()
        .find(|(ext, _)| lower.ends_with(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_undotted_names() {
        assert_eq!(content_type_for("0b7c1f1e-0000-4000-8000-000000000000jpg"), "image/jpeg");
        assert_eq!(content_type_for("0b7c1f1e-0000-4000-8000-000000000000PNG"), "image/png");
        assert_eq!(content_type_for("abc.tiff"), "image/tiff");
        assert_eq!(content_type_for("abcdoc"), "application/octet-stream");
    }
}
