use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::{BroadcastMessage, RealtimeError, RealtimePublisher};

/// In-process hub keeping one broadcast channel per topic
pub struct RealtimeHub {
    channels: RwLock<HashMap<String, broadcast::Sender<BroadcastMessage>>>,
    capacity: usize,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Attach a new receiver to `channel`, creating the channel on first use
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<BroadcastMessage> {
        if let Some(sender) = self.channels.read().await.get(channel) {
            return sender.subscribe();
        }

        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tracing::debug!(channel, subscribers = sender.receiver_count() + 1, "Subscribed");
        sender.subscribe()
    }

    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |sender| sender.receiver_count())
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Guard that prunes `channel` when dropped; hold it alongside a receiver
    pub fn channel_guard(self: &Arc<Self>, channel: &str) -> ChannelGuard {
        ChannelGuard {
            hub: Arc::clone(self),
            channel: channel.to_string(),
        }
    }

    /// Drop the channel once nobody listens on it
    async fn prune(&self, channel: &str) {
        let mut channels = self.channels.write().await;
        if channels
            .get(channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(channel);
            tracing::debug!(channel, "Removed idle channel");
        }
    }
}

/// Removes an idle channel from its hub when the owning stream goes away.
///
/// The check runs on a spawned task, after the receiver held next to the
/// guard has been dropped.
pub struct ChannelGuard {
    hub: Arc<RealtimeHub>,
    channel: String,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let hub = Arc::clone(&self.hub);
        let channel = std::mem::take(&mut self.channel);
        runtime.spawn(async move { hub.prune(&channel).await });
    }
}

#[async_trait]
impl RealtimePublisher for RealtimeHub {
    async fn send(&self, channel: &str, message: BroadcastMessage) -> Result<usize, RealtimeError> {
        let result = match self.channels.read().await.get(channel) {
            Some(sender) => sender.send(message),
            None => return Ok(0),
        };

        match result {
            Ok(delivered) => Ok(delivered),
            // Every receiver went away since the last publish
            Err(_) => {
                self.prune(channel).await;
                Ok(0)
            }
        }
    }
}
