use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::gallery::handlers::{
    get_car, get_club, get_event, get_leaderboard, list_cars, list_clubs, list_events,
};
use crate::features::gallery::services::GalleryService;

/// Public, CDN-cacheable gallery routes
pub fn routes(gallery_service: Arc<GalleryService>) -> Router {
    Router::new()
        .route("/api/clubs", get(list_clubs))
        .route("/api/clubs/{id}", get(get_club))
        .route("/api/cars", get(list_cars))
        .route("/api/cars/{id}", get(get_car))
        .route("/api/events", get(list_events))
        .route("/api/events/{id}", get(get_event))
        .route("/api/leaderboards/{board}", get(get_leaderboard))
        .with_state(gallery_service)
}
