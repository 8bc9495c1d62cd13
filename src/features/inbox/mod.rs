//! Inbox: direct and club messages between members, unread counts and
//! realtime notifications.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/inbox/mark-read` | Yes | Mark every unread message read |
//! | GET | `/api/inbox/unread-count` | Yes | Unread count, never cached |
//! | POST | `/api/inbox/messages` | Yes | Paginated inbox listing |
//! | POST | `/api/inbox/send` | Yes | Send a message |
//! | GET | `/api/inbox/stream` | Yes | SSE stream of inbox events |
//!
//! Unread means `is_read = false`. The `last_seen_inbox` watermark is
//! advanced by mark-read and reported as metadata only.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{InboxRepository, PgInboxRepository};
pub use routes::routes;
pub use services::{InboxNotifier, InboxService};
