use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::features::inbox::dtos::InboxEventDto;
use crate::modules::realtime::{BroadcastMessage, RealtimePublisher};
use crate::shared::constants::{INBOX_CHANNEL_PREFIX, INBOX_UPDATE_EVENT};

/// Best-effort delivery of inbox events to a user's realtime channel.
///
/// Failures are logged and swallowed: the database write that triggered the
/// event has already succeeded and must not be reported as failed.
pub struct InboxNotifier {
    publisher: Arc<dyn RealtimePublisher>,
    retries: u32,
}

impl InboxNotifier {
    pub fn new(publisher: Arc<dyn RealtimePublisher>, retries: u32) -> Self {
        Self { publisher, retries }
    }

    pub fn channel_for(user_id: Uuid) -> String {
        format!("{}:{}", INBOX_CHANNEL_PREFIX, user_id)
    }

    /// Publish `event` on the channel of `event.user_id`
    pub async fn notify(&self, event: InboxEventDto) {
        let channel = Self::channel_for(event.user_id);
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(channel = %channel, "Failed to encode inbox event: {}", e);
                return;
            }
        };
        let message = BroadcastMessage {
            event: INBOX_UPDATE_EVENT.to_string(),
            payload,
        };

        let attempts = self.retries + 1;
        for attempt in 1..=attempts {
            match self.publisher.send(&channel, message.clone()).await {
                Ok(delivered) => {
                    debug!(channel = %channel, delivered, "Inbox event published");
                    return;
                }
                Err(e) => {
                    warn!(channel = %channel, attempt, "Inbox event publish failed: {}", e);
                }
            }
        }

        error!(channel = %channel, attempts, "Giving up on inbox event");
    }
}
