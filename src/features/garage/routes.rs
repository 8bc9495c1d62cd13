use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, post},
    Router,
};
use std::sync::Arc;

use super::handler::{delete_photo, upload_photo};
use super::service::GarageService;
use crate::shared::constants::MAX_PHOTO_SIZE;

/// Photo management for cars in a member's garage
pub fn routes(garage_service: Arc<GarageService>) -> Router {
    Router::new()
        .route(
            "/api/cars/{id}/photos",
            // Room for multipart framing on top of the photo itself
            post(upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_SIZE + 1024 * 1024)),
        )
        .route("/api/cars/{id}/photos/{photo_id}", delete(delete_photo))
        .with_state(garage_service)
}
