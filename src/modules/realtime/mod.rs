//! Realtime publish/subscribe
//!
//! Channels are named topics (`inbox:{user_id}`). Publishers send a
//! [`BroadcastMessage`]; subscribers attached through the SSE endpoint receive
//! every message sent after they subscribed.

mod hub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use hub::{ChannelGuard, RealtimeHub};

/// One event on a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Raised by out-of-process transports
    #[allow(dead_code)]
    #[error("Realtime transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    /// Send `message` on `channel`, returning how many subscribers received it
    async fn send(&self, channel: &str, message: BroadcastMessage) -> Result<usize, RealtimeError>;
}
