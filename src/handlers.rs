use crate::blob_manager::BlobManager;
use crate::latency::LatencyProbe;
use crate::models::{BlobListResponse, DeleteForm, UploadedFile, UPLOAD_FIELD};
use crate::views;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, Json},
    Form,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub blobs: Arc<BlobManager>,
    pub latency: Arc<LatencyProbe>,
}

/// GET / - Upload form
pub async fn upload_form() -> Html<String> {
    Html(views::upload_form())
}

/// POST / - Upload every file in the `photos` field
///
/// Files are stored one after another. A file that fails to upload is left
/// out of the result and the remaining files are still processed.
/// A `photos` part without a file name, which browsers send when no file was
/// picked, is skipped rather than stored as a bare `{uuid}` blob.
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, (StatusCode, String)> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart data: {}", e),
        )
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // Browsers submit an empty, unnamed part when no file was chosen
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                tracing::debug!("Skipping {} part without a file name", UPLOAD_FIELD);
                continue;
            }
        };

        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file: {}", e),
            )
        })?;

        match state.blobs.upload(&file_name, data.to_vec()).await {
            Some(url) => uploaded.push(UploadedFile { file_name, url }),
            None => continue,
        }
    }

    tracing::debug!("Upload request stored {} files", uploaded.len());
    Ok(Html(views::upload_result(&uploaded)))
}

/// GET /photos - Render every blob in the container
pub async fn list_photos(State(state): State<AppState>) -> Html<String> {
    let urls = state.blobs.list().await;
    Html(views::gallery(state.blobs.container(), &urls))
}

/// GET /api/photos - Blob reference URLs as JSON
pub async fn list_photos_json(State(state): State<AppState>) -> Json<BlobListResponse> {
    Json(BlobListResponse {
        container: state.blobs.container().to_string(),
        urls: state.blobs.list().await,
    })
}

/// POST /delete - Delete the blob a reference URL points at
pub async fn delete_photo(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Html<String>, (StatusCode, String)> {
    if state.blobs.delete(&form.url).await {
        Ok(Html(views::deleted(&form.url)))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("Could not delete {}", form.url),
        ))
    }
}

/// GET /latency - Time a GET of the probe image in each region
pub async fn latency(State(state): State<AppState>) -> Html<String> {
    let samples = state.latency.measure().await;
    Html(views::latency_table(&samples))
}
