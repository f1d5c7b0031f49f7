use crate::handlers::{self, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::upload_form).post(handlers::upload_photos))
        .route("/photos", get(handlers::list_photos))
        .route("/api/photos", get(handlers::list_photos_json))
        .route("/delete", post(handlers::delete_photo))
        .route("/latency", get(handlers::latency))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
