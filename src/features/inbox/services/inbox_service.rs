use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::InboxConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::CurrentUser;
use crate::features::inbox::dtos::{
    InboxCursor, InboxEventDto, InboxListMeta, InboxMessageDto, ListMessagesRequestDto,
    ListMessagesResponseDto, MarkReadMeta, MarkReadResponseDto, MessageResponseDto,
    SendMessageDto, UnreadCountMeta, UnreadCountResponseDto,
};
use crate::features::inbox::models::NewMessage;
use crate::features::inbox::repository::InboxRepository;
use crate::features::inbox::services::InboxNotifier;
use crate::shared::cache_control::{inbox_messages_key, unread_count_key};
use crate::shared::constants::DEFAULT_MESSAGE_TYPE;

pub struct InboxService {
    repo: Arc<dyn InboxRepository>,
    notifier: Arc<InboxNotifier>,
    config: InboxConfig,
}

impl InboxService {
    pub fn new(
        repo: Arc<dyn InboxRepository>,
        notifier: Arc<InboxNotifier>,
        config: InboxConfig,
    ) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    /// Browser cache lifetime for listing responses
    pub fn list_max_age(&self) -> u64 {
        self.config.list_max_age_secs
    }

    /// Mark every unread message of `user` as read.
    ///
    /// One `mark_read` event is published when at least one row changed.
    pub async fn mark_all_read(&self, user: &CurrentUser) -> Result<MarkReadResponseDto> {
        let marked_count = self.repo.mark_all_read(user.id).await?;
        info!(user_id = %user.id, marked_count, "Inbox marked read");

        if marked_count > 0 {
            self.notifier
                .notify(InboxEventDto::mark_read(user.id, marked_count))
                .await;
        }

        Ok(MarkReadResponseDto {
            success: true,
            marked_count,
            meta: MarkReadMeta {
                generated_at: Utc::now(),
                user_id: user.id,
            },
        })
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<UnreadCountResponseDto> {
        let snapshot = self.repo.unread_snapshot(user_id).await?;
        debug!(user_id = %user_id, count = snapshot.count, "Unread count");

        Ok(UnreadCountResponseDto {
            count: snapshot.count,
            meta: UnreadCountMeta {
                generated_at: Utc::now(),
                cache_key: unread_count_key(user_id),
                last_seen_inbox: snapshot
                    .last_seen_inbox
                    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            },
        })
    }

    pub async fn list_messages(
        &self,
        user: &CurrentUser,
        request: ListMessagesRequestDto,
    ) -> Result<ListMessagesResponseDto> {
        let owner = request
            .user_id
            .ok_or_else(|| AppError::BadRequest("userId is required".to_string()))?;

        if owner != user.id {
            return Err(AppError::Forbidden(
                "Cannot read another user's inbox".to_string(),
            ));
        }

        let limit = self.config.page_size(request.limit);
        // One extra row tells us whether another page exists
        let mut rows = self
            .repo
            .list_for_receiver(owner, request.before, limit + 1)
            .await?;

        let has_more = rows.len() as i64 > limit;
        rows.truncate(limit as usize);

        let messages: Vec<InboxMessageDto> = rows.into_iter().map(InboxMessageDto::from).collect();
        let next_cursor = if has_more {
            messages.last().map(|m| InboxCursor {
                created_at: m.created_at,
                id: m.id,
            })
        } else {
            None
        };

        Ok(ListMessagesResponseDto {
            meta: InboxListMeta {
                generated_at: Utc::now(),
                cache_key: inbox_messages_key(owner),
                count: messages.len(),
                limit,
                next_cursor,
            },
            messages,
        })
    }

    pub async fn send_message(
        &self,
        sender: &CurrentUser,
        dto: SendMessageDto,
    ) -> Result<MessageResponseDto> {
        let text = dto.message.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message must not be blank".to_string()));
        }

        if dto.receiver_id == sender.id {
            return Err(AppError::BadRequest(
                "Cannot send a message to yourself".to_string(),
            ));
        }

        if !self.repo.user_exists(dto.receiver_id).await? {
            return Err(AppError::NotFound("Receiver not found".to_string()));
        }

        if let Some(club_id) = dto.club_id {
            if !self.repo.club_exists(club_id).await? {
                return Err(AppError::NotFound("Club not found".to_string()));
            }
        }

        let subject = dto
            .subject
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let message = self
            .repo
            .insert_message(NewMessage {
                sender_id: sender.id,
                receiver_id: dto.receiver_id,
                subject,
                message: text.to_string(),
                message_type: dto
                    .message_type
                    .unwrap_or_else(|| DEFAULT_MESSAGE_TYPE.to_string()),
                club_id: dto.club_id,
            })
            .await?;

        info!(
            message_id = %message.id,
            sender_id = %sender.id,
            receiver_id = %message.receiver_id,
            "Message sent"
        );

        self.notifier
            .notify(InboxEventDto::new_message(message.receiver_id, message.id))
            .await;

        Ok(MessageResponseDto::from(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::inbox::repository::memory::MemoryInbox;
    use crate::modules::realtime::RealtimeHub;
    use crate::shared::test_helpers::{current_user_from, sample_profile};
    use chrono::Duration;

    struct Fixture {
        service: InboxService,
        repo: Arc<MemoryInbox>,
        hub: Arc<RealtimeHub>,
        alice: CurrentUser,
        bob: CurrentUser,
    }

    fn fixture() -> Fixture {
        let alice = sample_profile("alice");
        let bob = sample_profile("bob");
        let (alice_user, bob_user) = (current_user_from(&alice), current_user_from(&bob));
        let repo = Arc::new(MemoryInbox::with_users(vec![alice, bob]));
        let hub = Arc::new(RealtimeHub::new(8));
        let notifier = Arc::new(InboxNotifier::new(hub.clone(), 1));
        let service = InboxService::new(repo.clone(), notifier, InboxConfig::default());

        Fixture {
            service,
            repo,
            hub,
            alice: alice_user,
            bob: bob_user,
        }
    }

    fn send(receiver_id: Uuid, text: &str) -> SendMessageDto {
        SendMessageDto {
            receiver_id,
            subject: None,
            message: text.to_string(),
            message_type: None,
            club_id: None,
        }
    }

    #[tokio::test]
    async fn test_unread_count_defaults() {
        let f = fixture();
        let result = f.service.unread_count(f.bob.id).await.unwrap();

        assert_eq!(result.count, 0);
        assert_eq!(result.meta.cache_key, format!("unread-count:{}", f.bob.id));
        assert_eq!(result.meta.last_seen_inbox, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_mark_read_twice_reports_k_then_zero() {
        let f = fixture();
        for text in ["one", "two", "three"] {
            f.repo.insert_at(f.alice.id, f.bob.id, text, Utc::now());
        }
        let mut receiver = f
            .hub
            .subscribe(&InboxNotifier::channel_for(f.bob.id))
            .await;

        let first = f.service.mark_all_read(&f.bob).await.unwrap();
        let second = f.service.mark_all_read(&f.bob).await.unwrap();

        assert_eq!(first.marked_count, 3);
        assert_eq!(second.marked_count, 0);
        assert!(f.repo.unread_ids(f.bob.id).is_empty());
        assert!(f.repo.last_seen(f.bob.id).unwrap() > DateTime::<Utc>::UNIX_EPOCH);

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.payload["markedCount"], 3);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_listing_paginates_with_cursor() {
        let f = fixture();
        let base = Utc::now() - Duration::minutes(10);
        for i in 0..5 {
            f.repo
                .insert_at(f.alice.id, f.bob.id, &format!("m{}", i), base + Duration::minutes(i));
        }

        let page = f
            .service
            .list_messages(
                &f.bob,
                ListMessagesRequestDto {
                    user_id: Some(f.bob.id),
                    limit: Some(2),
                    before: None,
                },
            )
            .await
            .unwrap();

        let texts: Vec<&str> = page.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["m4", "m3"]);
        assert_eq!(page.meta.limit, 2);
        let cursor = page.meta.next_cursor.unwrap();

        let next = f
            .service
            .list_messages(
                &f.bob,
                ListMessagesRequestDto {
                    user_id: Some(f.bob.id),
                    limit: Some(10),
                    before: Some(cursor),
                },
            )
            .await
            .unwrap();

        let texts: Vec<&str> = next.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m1", "m0"]);
        assert!(next.meta.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_listing_keeps_messages_sharing_a_timestamp() {
        let f = fixture();
        let at = Utc::now() - Duration::minutes(1);
        for text in ["a", "b", "c"] {
            f.repo.insert_at(f.alice.id, f.bob.id, text, at);
        }

        let request = |before: Option<InboxCursor>| ListMessagesRequestDto {
            user_id: Some(f.bob.id),
            limit: Some(2),
            before,
        };

        let first = f.service.list_messages(&f.bob, request(None)).await.unwrap();
        assert_eq!(first.messages.len(), 2);
        let cursor = first.meta.next_cursor.unwrap();
        assert_eq!(cursor.created_at, at);
        assert_eq!(cursor.id, first.messages[1].id);

        let second = f
            .service
            .list_messages(&f.bob, request(Some(cursor)))
            .await
            .unwrap();
        assert_eq!(second.messages.len(), 1);
        assert!(second.meta.next_cursor.is_none());

        let mut seen: Vec<Uuid> = first
            .messages
            .iter()
            .chain(second.messages.iter())
            .map(|m| m.id)
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_listing_requires_own_user_id() {
        let f = fixture();

        let missing = f
            .service
            .list_messages(&f.bob, ListMessagesRequestDto::default())
            .await;
        assert!(matches!(missing, Err(AppError::BadRequest(m)) if m == "userId is required"));

        let foreign = f
            .service
            .list_messages(
                &f.bob,
                ListMessagesRequestDto {
                    user_id: Some(f.alice.id),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_send_message_notifies_receiver() {
        let f = fixture();
        let mut receiver = f
            .hub
            .subscribe(&InboxNotifier::channel_for(f.bob.id))
            .await;

        let sent = f
            .service
            .send_message(&f.alice, send(f.bob.id, "  hi  "))
            .await
            .unwrap();

        assert_eq!(sent.message, "hi");
        assert_eq!(sent.message_type, "direct");
        assert!(!sent.is_read);

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.payload["action"], "new_message");
        assert_eq!(event.payload["messageId"], sent.id.to_string());
    }

    #[tokio::test]
    async fn test_send_message_rejections() {
        let f = fixture();

        let to_self = f.service.send_message(&f.alice, send(f.alice.id, "hi")).await;
        assert!(matches!(to_self, Err(AppError::BadRequest(_))));

        let blank = f.service.send_message(&f.alice, send(f.bob.id, "   ")).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        let unknown = f
            .service
            .send_message(&f.alice, send(Uuid::new_v4(), "hi"))
            .await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        let mut with_club = send(f.bob.id, "join us");
        with_club.club_id = Some(Uuid::new_v4());
        let unknown_club = f.service.send_message(&f.alice, with_club).await;
        assert!(matches!(unknown_club, Err(AppError::NotFound(m)) if m == "Club not found"));
    }

    #[tokio::test]
    async fn test_send_message_with_club_lists_club_name() {
        let f = fixture();
        let club_id = f.repo.add_club("Rotary Club");
        let mut dto = send(f.bob.id, "meet at the track");
        dto.club_id = Some(club_id);
        dto.message_type = Some("club_invite".to_string());
        f.service.send_message(&f.alice, dto).await.unwrap();

        let page = f
            .service
            .list_messages(
                &f.bob,
                ListMessagesRequestDto {
                    user_id: Some(f.bob.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let message = &page.messages[0];
        assert_eq!(message.club_name.as_deref(), Some("Rotary Club"));
        assert_eq!(message.sender_username.as_deref(), Some(f.alice.username.as_str()));
        assert_eq!(message.message_type, "club_invite");
    }
}
