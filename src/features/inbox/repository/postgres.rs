use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::InboxRepository;
use crate::core::error::{AppError, Result};
use crate::features::inbox::dtos::InboxCursor;
use crate::features::inbox::models::{InboxRow, Message, NewMessage, UnreadSnapshot};

pub struct PgInboxRepository {
    pool: PgPool,
}

impl PgInboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InboxRepository for PgInboxRepository {
    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, receiver_id, subject, message, message_type, club_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, sender_id, receiver_id, subject, message, message_type, club_id,
                      is_read, created_at, updated_at
            "#,
        )
        .bind(message.sender_id)
        .bind(message.receiver_id)
        .bind(message.subject)
        .bind(message.message)
        .bind(message.message_type)
        .bind(message.club_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert message: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn mark_all_read(&self, receiver_id: Uuid) -> Result<i64> {
        // One statement: concurrent calls cannot both count the same row
        let marked: i64 = sqlx::query_scalar(
            r#"
            WITH marked AS (
                UPDATE messages
                SET is_read = TRUE, updated_at = NOW()
                WHERE receiver_id = $1 AND is_read = FALSE
                RETURNING id
            ), watermark AS (
                UPDATE users
                SET last_seen_inbox = NOW(), updated_at = NOW()
                WHERE id = $1
            )
            SELECT COUNT(*) FROM marked
            "#,
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark inbox read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(marked)
    }

    async fn unread_snapshot(&self, receiver_id: Uuid) -> Result<UnreadSnapshot> {
        let snapshot = sqlx::query_as::<_, UnreadSnapshot>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM messages m
                 WHERE m.receiver_id = $1 AND m.is_read = FALSE) AS count,
                (SELECT u.last_seen_inbox FROM users u WHERE u.id = $1) AS last_seen_inbox
            "#,
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(snapshot)
    }

    async fn list_for_receiver(
        &self,
        receiver_id: Uuid,
        before: Option<InboxCursor>,
        limit: i64,
    ) -> Result<Vec<InboxRow>> {
        let rows = sqlx::query_as::<_, InboxRow>(
            r#"
            SELECT
                m.id, m.sender_id, m.receiver_id, m.subject, m.message, m.message_type,
                m.club_id, m.is_read, m.created_at, m.updated_at,
                (SELECT json_agg(json_build_object(
                        'id', u.id,
                        'username', u.username,
                        'display_name', u.display_name,
                        'avatar_url', u.avatar_url))
                 FROM users u WHERE u.id = m.sender_id) AS sender,
                (SELECT json_agg(json_build_object('id', c.id, 'name', c.name))
                 FROM clubs c WHERE c.id = m.club_id) AS club
            FROM messages m
            WHERE m.receiver_id = $1
              AND ($2::timestamptz IS NULL OR (m.created_at, m.id) < ($2::timestamptz, $3::uuid))
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $4
            "#,
        )
        .bind(receiver_id)
        .bind(before.map(|c| c.created_at))
        .bind(before.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn club_exists(&self, club_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clubs WHERE id = $1)")
            .bind(club_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
