//! In-memory inbox store for handler and service tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::InboxRepository;
use crate::core::error::Result;
use crate::features::inbox::dtos::InboxCursor;
use crate::features::auth::model::UserProfile;
use crate::features::inbox::models::{InboxRow, Message, NewMessage, UnreadSnapshot};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserProfile>,
    clubs: HashMap<Uuid, String>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemoryInbox {
    state: Mutex<State>,
}

impl MemoryInbox {
    pub fn with_users(users: Vec<UserProfile>) -> Self {
        let inbox = Self::default();
        {
            let mut state = inbox.state.lock().unwrap();
            for user in users {
                state.users.insert(user.id, user);
            }
        }
        inbox
    }

    pub fn add_club(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .lock()
            .unwrap()
            .clubs
            .insert(id, name.to_string());
        id
    }

    /// Insert an unread message with an explicit timestamp
    pub fn insert_at(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().messages.push(Message {
            id,
            sender_id,
            receiver_id,
            subject: None,
            message: text.to_string(),
            message_type: "direct".to_string(),
            club_id: None,
            is_read: false,
            created_at,
            updated_at: created_at,
        });
        id
    }

    pub fn last_seen(&self, user_id: Uuid) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .map(|u| u.last_seen_inbox)
    }

    pub fn unread_ids(&self, receiver_id: Uuid) -> Vec<Uuid> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
            .map(|m| m.id)
            .collect()
    }
}

#[async_trait]
impl InboxRepository for MemoryInbox {
    async fn insert_message(&self, new: NewMessage) -> Result<Message> {
        let now = Utc::now();
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            subject: new.subject,
            message: new.message,
            message_type: new.message_type,
            club_id: new.club_id,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().messages.push(message.clone());
        Ok(message)
    }

    async fn mark_all_read(&self, receiver_id: Uuid) -> Result<i64> {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        let mut marked = 0;
        for message in state
            .messages
            .iter_mut()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
        {
            message.is_read = true;
            message.updated_at = now;
            marked += 1;
        }
        if let Some(user) = state.users.get_mut(&receiver_id) {
            user.last_seen_inbox = now;
        }
        Ok(marked)
    }

    async fn unread_snapshot(&self, receiver_id: Uuid) -> Result<UnreadSnapshot> {
        let state = self.state.lock().unwrap();
        let count = state
            .messages
            .iter()
            .filter(|m| m.receiver_id == receiver_id && !m.is_read)
            .count() as i64;
        Ok(UnreadSnapshot {
            count,
            last_seen_inbox: state.users.get(&receiver_id).map(|u| u.last_seen_inbox),
        })
    }

    async fn list_for_receiver(
        &self,
        receiver_id: Uuid,
        before: Option<InboxCursor>,
        limit: i64,
    ) -> Result<Vec<InboxRow>> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<&Message> = state
            .messages
            .iter()
            .filter(|m| m.receiver_id == receiver_id)
            .filter(|m| before.is_none_or(|cursor| cursor.precedes(m.created_at, m.id)))
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let rows = messages
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|m| {
                // Mirror json_agg: zero or one element arrays
                let sender = state.users.get(&m.sender_id).map_or(json!([]), |u| {
                    json!([{
                        "id": u.id,
                        "username": u.username,
                        "display_name": u.display_name,
                        "avatar_url": u.avatar_url,
                    }])
                });
                let club = m.club_id.map(|club_id| {
                    state
                        .clubs
                        .get(&club_id)
                        .map_or(json!([]), |name| json!([{ "id": club_id, "name": name }]))
                });
                InboxRow {
                    message: m.clone(),
                    sender: Some(sender),
                    club,
                }
            })
            .collect();

        Ok(rows)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.state.lock().unwrap().users.contains_key(&user_id))
    }

    async fn club_exists(&self, club_id: Uuid) -> Result<bool> {
        Ok(self.state.lock().unwrap().clubs.contains_key(&club_id))
    }
}
