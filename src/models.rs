use serde::{Deserialize, Serialize};

/// Field name of the file input on the upload form
pub const UPLOAD_FIELD: &str = "photos";

#[derive(Debug, Serialize, Deserialize)]
pub struct BlobListResponse {
    pub container: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub url: String,
}

/// A file that made it into storage during one upload request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub url: String,
}
