use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::inbox::handlers::{
    list_messages, mark_read, send_message, stream_inbox, unread_count,
};
use crate::features::inbox::services::InboxService;
use crate::modules::realtime::RealtimeHub;

/// Inbox routes; every one of them requires an authenticated caller
pub fn routes(inbox_service: Arc<InboxService>, hub: Arc<RealtimeHub>) -> Router {
    let inbox = Router::new()
        .route("/api/inbox/mark-read", post(mark_read))
        .route("/api/inbox/unread-count", get(unread_count))
        .route("/api/inbox/messages", post(list_messages))
        .route("/api/inbox/send", post(send_message))
        .with_state(inbox_service);

    let stream = Router::new()
        .route("/api/inbox/stream", get(stream_inbox))
        .with_state(hub);

    inbox.merge(stream)
}
