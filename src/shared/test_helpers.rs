#![cfg(test)]

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Utc};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::{CurrentUser, UserProfile};
use crate::features::auth::ProfileRepository;

pub fn sample_profile(subject: &str) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        auth_subject: subject.to_string(),
        email: SafeEmail().fake(),
        username: Username().fake(),
        display_name: Some(Name().fake()),
        avatar_url: None,
        last_seen_inbox: DateTime::<Utc>::UNIX_EPOCH,
        created_at: Utc::now(),
    }
}

pub fn current_user_from(profile: &UserProfile) -> CurrentUser {
    CurrentUser::from_profile(profile.clone(), vec!["member".to_string()])
}

/// Profiles keyed by auth subject
#[derive(Default)]
pub struct MemoryProfiles {
    profiles: HashMap<String, UserProfile>,
}

impl MemoryProfiles {
    pub fn with(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.auth_subject.clone(), p))
                .collect(),
        }
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfiles {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(subject).cloned())
    }
}

/// Pretend `user` passed the auth middleware on every request
pub fn with_current_user(router: Router, user: CurrentUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}
