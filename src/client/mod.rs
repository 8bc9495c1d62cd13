//! Client-side cache layer for consumers of the inbox API.
//!
//! A [`QueryCache`] is created once per app session and handed to an
//! [`InboxCache`] together with an [`InboxApi`] implementation. Call
//! [`QueryCache::clear`] when the session ends.

mod http;
mod inbox_cache;
mod query_cache;

pub use http::{HttpInboxClient, InboxApi};
pub use inbox_cache::InboxCache;
pub use query_cache::QueryCache;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to encode or decode cached value: {0}")]
    Codec(#[from] serde_json::Error),
}
