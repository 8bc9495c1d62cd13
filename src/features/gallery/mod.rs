//! Public gallery listings for clubs, cars, events and leaderboards.
//!
//! Every endpoint is a thin wrapper over one aggregation procedure; results
//! are reshaped and served with a shared-cache policy.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::GalleryService;
