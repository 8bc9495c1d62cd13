use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use super::model::{AuthenticatedUser, CurrentUser, UserProfile};
use crate::core::error::{AppError, Result};

/// Lookup of application profiles by identity-provider subject
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<UserProfile>>;
}

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, auth_subject, email, username, display_name, avatar_url,
                   last_seen_inbox, created_at
            FROM users
            WHERE auth_subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

/// Maps a verified token identity onto its application profile
pub struct ProfileResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn resolve(&self, identity: &AuthenticatedUser) -> Result<CurrentUser> {
        let profile = self
            .profiles
            .find_by_subject(&identity.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!(sub = %identity.sub, "No profile for authenticated subject");
                AppError::Unauthorized("Profile not found".to_string())
            })?;

        Ok(CurrentUser::from_profile(profile, identity.roles.clone()))
    }
}
