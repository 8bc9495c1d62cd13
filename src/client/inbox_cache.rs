use std::sync::Arc;

use uuid::Uuid;

use super::{ClientError, InboxApi, QueryCache};
use crate::shared::cache_control::{inbox_messages_key, unread_count_key};

/// Inbox view of a [`QueryCache`] for one signed-in user.
///
/// Only [`force_refetch_count`](Self::force_refetch_count) and a read-through
/// miss in [`unread_count`](Self::unread_count) go to the network.
pub struct InboxCache {
    cache: Arc<QueryCache>,
    api: Arc<dyn InboxApi>,
    user_id: Uuid,
}

impl InboxCache {
    pub fn new(cache: Arc<QueryCache>, api: Arc<dyn InboxApi>, user_id: Uuid) -> Self {
        Self {
            cache,
            api,
            user_id,
        }
    }

    pub fn count_key(&self) -> String {
        unread_count_key(self.user_id)
    }

    pub fn messages_key(&self) -> String {
        inbox_messages_key(self.user_id)
    }

    pub async fn invalidate_count(&self) {
        self.cache.invalidate(&self.count_key()).await;
    }

    pub async fn invalidate_messages(&self) {
        self.cache.invalidate(&self.messages_key()).await;
    }

    pub async fn invalidate_all(&self) {
        self.invalidate_count().await;
        self.invalidate_messages().await;
    }

    /// Fetch the count from the server and store it, whatever the cache holds
    pub async fn force_refetch_count(&self) -> Result<i64, ClientError> {
        let response = self.api.unread_count().await?;
        self.cache.set(&self.count_key(), &response.count).await?;
        tracing::debug!(user_id = %self.user_id, count = response.count, "Unread count refetched");
        Ok(response.count)
    }

    /// Show `count` right away; no request is made
    pub async fn set_count_optimistic(&self, count: i64) -> Result<(), ClientError> {
        self.cache.set(&self.count_key(), &count).await
    }

    /// Cached count while fresh, otherwise a refetch
    pub async fn unread_count(&self) -> Result<i64, ClientError> {
        match self.cache.get_fresh::<i64>(&self.count_key()).await? {
            Some(count) => Ok(count),
            None => self.force_refetch_count().await,
        }
    }

    /// Mark the inbox read on the server, zero the badge and drop the listing
    pub async fn mark_read(&self) -> Result<i64, ClientError> {
        let response = self.api.mark_read().await?;
        self.set_count_optimistic(0).await?;
        self.invalidate_messages().await;
        Ok(response.marked_count)
    }
}
