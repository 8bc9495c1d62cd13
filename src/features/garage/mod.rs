//! Garage: photos attached to a member's cars, kept in object storage.
//!
//! Only the car's owner may add or remove photos. Objects are stored under
//! `cars/{car_id}/{uuid}.{ext}` and served from their public URL.

pub mod handler;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;

pub use repository::{GarageRepository, PgGarageRepository};
pub use routes::routes;
pub use service::GarageService;
