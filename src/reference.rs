use crate::error::DeleteError;
use uuid::Uuid;

/// Public host suffix baked into every reference URL
const BLOB_HOST_SUFFIX: &str = "blob.core.windows.net";

/// Fully qualified URL handle for a stored blob
pub type BlobReference = String;

/// Build `https://{account}.blob.core.windows.net/{container}/{blob_id}`
pub fn build_reference(account_name: &str, container: &str, blob_id: &str) -> BlobReference {
    format!(
        "https://{}.{}/{}/{}",
        account_name, BLOB_HOST_SUFFIX, container, blob_id
    )
}

/// Recover `(container, blob_id)` from the last two `/`-separated segments
pub fn parse_reference(reference: &str) -> Result<(&str, &str), DeleteError> {
    let mut segments = reference.rsplit('/');
    match (segments.next(), segments.next()) {
        (Some(blob_id), Some(container)) if !blob_id.is_empty() && !container.is_empty() => {
            Ok((container, blob_id))
        }
        _ => Err(DeleteError::MalformedReference(reference.to_string())),
    }
}

/// Everything after the last `.` of a file name, or the whole name without one
pub fn extension_of(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(file_name)
}

/// Destination blob name for an upload
///
/// The extension is appended without a `.` separator. Existing blobs were
/// stored under this scheme, so `photo.jpg` becomes `{id}jpg`.
pub fn destination_name(id: Uuid, file_name: &str) -> String {
    format!("{}{}", id, extension_of(file_name))
}
