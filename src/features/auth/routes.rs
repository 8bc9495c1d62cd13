use axum::{routing::get, Router};

use crate::features::auth::handler;

/// Protected auth routes (require bearer authentication)
pub fn protected_routes() -> Router {
    Router::new().route("/api/me", get(handler::get_me))
}
