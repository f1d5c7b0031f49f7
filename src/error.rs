use thiserror::Error;

/// Failures while building the storage client at startup
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("connection string is missing required key {0}")]
    MissingKey(&'static str),

    #[error("malformed connection string segment: {0}")]
    MalformedSegment(String),

    #[error("AccountKey is not valid base64: {0}")]
    InvalidAccountKey(#[from] base64::DecodeError),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failures reported by a blob store backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("request to blob service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("blob not found: {container}/{name}")]
    BlobNotFound { container: String, name: String },

    #[error("invalid blob URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected response from blob service: {0}")]
    MalformedResponse(String),

    #[error("failed to sign request: {0}")]
    Signing(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload of {file_name} as {blob_name} failed: {source}")]
    Store {
        file_name: String,
        blob_name: String,
        #[source]
        source: StorageError,
    },
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("malformed blob reference: {0}")]
    MalformedReference(String),

    #[error("delete of {container}/{name} failed: {source}")]
    Store {
        container: String,
        name: String,
        #[source]
        source: StorageError,
    },
}
