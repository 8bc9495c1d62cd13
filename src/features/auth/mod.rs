//! Authentication: bearer-token verification and profile resolution.
//!
//! The identity provider issues RS256 tokens; [`JwtValidator`] checks them
//! against the provider's JWKS and [`ProfileResolver`] maps the token subject
//! onto a row in `users`. The resolved [`CurrentUser`] is cached in the
//! request extensions by the auth middleware.

mod jwks;
mod resolver;
mod validator;

pub mod handler;
pub mod model;
pub mod routes;

use std::sync::Arc;

pub use jwks::JwksClient;
pub use model::{AuthenticatedUser, CurrentUser};
pub use resolver::{PgProfileRepository, ProfileRepository, ProfileResolver};
pub use validator::{JwtValidator, TokenVerifier};

/// State shared by the auth middleware
pub struct AuthState {
    pub validator: Arc<dyn TokenVerifier>,
    pub resolver: ProfileResolver,
}
