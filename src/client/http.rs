use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::ClientError;
use crate::features::inbox::dtos::{MarkReadResponseDto, UnreadCountResponseDto};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Inbox endpoints as seen by a client
#[async_trait]
pub trait InboxApi: Send + Sync {
    async fn unread_count(&self) -> Result<UnreadCountResponseDto, ClientError>;

    async fn mark_read(&self) -> Result<MarkReadResponseDto, ClientError>;
}

/// [`InboxApi`] over HTTP with a bearer token
pub struct HttpInboxClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpInboxClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pitlane-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl InboxApi for HttpInboxClient {
    async fn unread_count(&self) -> Result<UnreadCountResponseDto, ClientError> {
        let response = self
            .client
            .get(self.url("/api/inbox/unread-count"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn mark_read(&self) -> Result<MarkReadResponseDto, ClientError> {
        let response = self
            .client
            .post(self.url("/api/inbox/mark-read"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(response).await
    }
}
