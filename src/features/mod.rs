pub mod auth;
pub mod gallery;
pub mod garage;
pub mod inbox;
