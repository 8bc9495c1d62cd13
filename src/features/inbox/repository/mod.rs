mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::inbox::dtos::InboxCursor;
use crate::features::inbox::models::{InboxRow, Message, NewMessage, UnreadSnapshot};

pub use postgres::PgInboxRepository;

/// Storage operations behind the inbox endpoints
#[async_trait]
pub trait InboxRepository: Send + Sync {
    async fn insert_message(&self, message: NewMessage) -> Result<Message>;

    /// Flip every unread message of `receiver_id` to read and advance the
    /// watermark, atomically. Returns the number of rows flipped.
    async fn mark_all_read(&self, receiver_id: Uuid) -> Result<i64>;

    async fn unread_snapshot(&self, receiver_id: Uuid) -> Result<UnreadSnapshot>;

    /// Newest first by `(created_at, id)`, strictly after `before` when given
    async fn list_for_receiver(
        &self,
        receiver_id: Uuid,
        before: Option<InboxCursor>,
        limit: i64,
    ) -> Result<Vec<InboxRow>>;

    async fn user_exists(&self, user_id: Uuid) -> Result<bool>;

    async fn club_exists(&self, club_id: Uuid) -> Result<bool>;
}
