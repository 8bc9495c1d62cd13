//! Pitlane: backend for a car-enthusiast community.
//!
//! The binary in `main.rs` wires these modules into an axum server; the
//! [`client`] module is the cache layer used by consumers of the inbox API.

pub mod client;
pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
