/// Default page size for gallery listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed for gallery listings and leaderboards
pub const MAX_PAGE_SIZE: i64 = 100;

/// Prefix of the per-user realtime channel carrying inbox events
pub const INBOX_CHANNEL_PREFIX: &str = "inbox";

/// Event name used for every inbox broadcast
pub const INBOX_UPDATE_EVENT: &str = "inbox_update";

/// Message type used when the sender does not provide one
pub const DEFAULT_MESSAGE_TYPE: &str = "direct";

/// Largest accepted car photo upload (10 MiB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted for car photos, with the stored file extension
pub const ALLOWED_PHOTO_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];
