//! Cache-control policies attached to API responses.

use std::convert::Infallible;

use axum::http::{header, HeaderName, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use uuid::Uuid;

/// Browsers must never reuse the response.
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";

const CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");
const SURROGATE_CONTROL: HeaderName = HeaderName::from_static("surrogate-control");

/// Key under which clients cache a user's unread count
pub fn unread_count_key(user_id: Uuid) -> String {
    format!("unread-count:{}", user_id)
}

/// Key under which clients cache a user's inbox listing
pub fn inbox_messages_key(user_id: Uuid) -> String {
    format!("inbox-messages:{}", user_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Always-fresh reads: no client, proxy or CDN may store the body
    NoStore,
    /// Per-user data the browser may reuse for `max_age` seconds
    Private { max_age: u64 },
    /// Shared data, cacheable by browsers and CDNs
    Public { max_age: u64, shared_max_age: u64 },
}

impl CachePolicy {
    pub fn header_value(&self) -> String {
        match self {
            CachePolicy::NoStore => NO_STORE.to_string(),
            CachePolicy::Private { max_age } => format!("private, max-age={}", max_age),
            CachePolicy::Public {
                max_age,
                shared_max_age,
            } => format!("public, max-age={}, s-maxage={}", max_age, shared_max_age),
        }
    }
}

impl IntoResponseParts for CachePolicy {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let headers = res.headers_mut();

        if let Ok(value) = HeaderValue::from_str(&self.header_value()) {
            headers.insert(header::CACHE_CONTROL, value);
        }

        if self == CachePolicy::NoStore {
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
            headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
            headers.insert(CDN_CACHE_CONTROL, HeaderValue::from_static("no-store"));
            headers.insert(SURROGATE_CONTROL, HeaderValue::from_static("no-store"));
        }

        Ok(res)
    }
}
