use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a message
#[derive(Debug, Clone, FromRow)]
pub struct Message {
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

/// Values for a message insert
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub subject: Option<String>,
    pub message: String,
    pub message_type: String,
    pub club_id: Option<Uuid>,
}

/// Inbox listing row with embedded relations.
///
/// `sender` and `club` come from `json_agg` sub-selects, so each is a JSON
/// array holding zero or one object.
#[derive(Debug, Clone, FromRow)]
pub struct InboxRow {
    #[sqlx(flatten)]
    pub message: Message,
    pub sender: Option<serde_json::Value>,
    pub club: Option<serde_json::Value>,
}

/// Unread count and watermark read in one statement
#[derive(Debug, Clone, FromRow)]
pub struct UnreadSnapshot {
    pub count: i64,
    pub last_seen_inbox: Option<DateTime<Utc>>,
}
