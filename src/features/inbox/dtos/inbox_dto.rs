use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::inbox::models::{InboxRow, Message};
use crate::shared::relations::{normalize_relation, relation_str};
use crate::shared::validation::MESSAGE_TYPE_REGEX;

// =============================================================================
// MARK READ
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkReadMeta {
    pub generated_at: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponseDto {
    pub success: bool,
    /// Number of messages flipped from unread to read
    pub marked_count: i64,
    pub meta: MarkReadMeta,
}

// =============================================================================
// UNREAD COUNT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountMeta {
    pub generated_at: DateTime<Utc>,
    pub cache_key: String,
    /// Watermark of the last mark-read (epoch when never marked)
    pub last_seen_inbox: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponseDto {
    pub count: i64,
    pub meta: UnreadCountMeta,
}

// =============================================================================
// LISTING
// =============================================================================

/// Keyset position of a listed message.
///
/// Messages order by `(created_at, id)` descending; ids break timestamp ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboxCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl InboxCursor {
    /// True when `(created_at, id)` sorts strictly after this cursor in the listing
    pub fn precedes(&self, created_at: DateTime<Utc>, id: Uuid) -> bool {
        (created_at, id) < (self.created_at, self.id)
    }
}

/// Request body for the inbox listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesRequestDto {
    /// Inbox owner; must be the authenticated user
    pub user_id: Option<Uuid>,
    /// Page size (default 50, max 100)
    pub limit: Option<i64>,
    /// Exclusive cursor copied from a previous page's `next_cursor`
    pub before: Option<InboxCursor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SenderSummaryDto {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClubSummaryDto {
    pub id: Uuid,
    pub name: String,
}

/// Message as shown in the inbox, with sender and club flattened in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InboxMessageDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub subject: Option<String>,
    pub message: String,
    pub message_type: String,
    pub club_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sender: Option<SenderSummaryDto>,
    pub club: Option<ClubSummaryDto>,
    pub sender_username: Option<String>,
    pub sender_display_name: Option<String>,
    pub sender_avatar_url: Option<String>,
    pub club_name: Option<String>,
}

impl From<InboxRow> for InboxMessageDto {
    fn from(row: InboxRow) -> Self {
        let sender_value = normalize_relation(row.sender);
        let club_value = normalize_relation(row.club);

        let sender_username = relation_str(sender_value.as_ref(), "username");
        let sender_display_name = relation_str(sender_value.as_ref(), "display_name");
        let sender_avatar_url = relation_str(sender_value.as_ref(), "avatar_url");
        let club_name = relation_str(club_value.as_ref(), "name");

        let sender = sender_value.and_then(|value| {
            serde_json::from_value::<SenderSummaryDto>(value)
                .map_err(|e| tracing::warn!(message_id = %row.message.id, "Malformed sender relation: {}", e))
                .ok()
        });
        let club = club_value.and_then(|value| {
            serde_json::from_value::<ClubSummaryDto>(value)
                .map_err(|e| tracing::warn!(message_id = %row.message.id, "Malformed club relation: {}", e))
                .ok()
        });

        let m = row.message;
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            subject: m.subject,
            message: m.message,
            message_type: m.message_type,
            club_id: m.club_id,
            is_read: m.is_read,
            created_at: m.created_at,
            updated_at: m.updated_at,
            sender,
            club,
            sender_username,
            sender_display_name,
            sender_avatar_url,
            club_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InboxListMeta {
    pub generated_at: DateTime<Utc>,
    pub cache_key: String,
    /// Messages in this page
    pub count: usize,
    pub limit: i64,
    /// Pass as `before` to fetch the next page; null on the last page
    pub next_cursor: Option<InboxCursor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListMessagesResponseDto {
    pub messages: Vec<InboxMessageDto>,
    pub meta: InboxListMeta,
}

// =============================================================================
// SEND
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    pub receiver_id: Uuid,

    #[validate(length(max = 200, message = "Subject must not exceed 200 characters"))]
    pub subject: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,

    /// Lowercase tag such as `direct` or `club_invite` (default `direct`)
    #[validate(regex(
        path = *MESSAGE_TYPE_REGEX,
        message = "Message type must be 1-32 lowercase letters or underscores"
    ))]
    pub message_type: Option<String>,

    pub club_id: Option<Uuid>,
}

/// A stored message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponseDto {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub subject: Option<String>,
    pub message: String,
    pub message_type: String,
    pub club_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Message> for MessageResponseDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            subject: m.subject,
            message: m.message,
            message_type: m.message_type,
            club_id: m.club_id,
            is_read: m.is_read,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// =============================================================================
// REALTIME
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InboxAction {
    MarkRead,
    NewMessage,
}

/// Payload broadcast on `inbox:{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboxEventDto {
    pub user_id: Uuid,
    pub action: InboxAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marked_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl InboxEventDto {
    pub fn mark_read(user_id: Uuid, marked_count: i64) -> Self {
        Self {
            user_id,
            action: InboxAction::MarkRead,
            marked_count: Some(marked_count),
            message_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn new_message(receiver_id: Uuid, message_id: Uuid) -> Self {
        Self {
            user_id: receiver_id,
            action: InboxAction::NewMessage,
            marked_count: None,
            message_id: Some(message_id),
            timestamp: Utc::now(),
        }
    }
}
