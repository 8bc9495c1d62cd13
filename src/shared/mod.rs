pub mod cache_control;
pub mod constants;
pub mod relations;
pub mod test_helpers;
pub mod types;
pub mod validation;
