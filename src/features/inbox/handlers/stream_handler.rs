use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::features::auth::CurrentUser;
use crate::features::inbox::services::InboxNotifier;
use crate::modules::realtime::{BroadcastMessage, RealtimeHub};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Turn one broadcast item into an SSE event; lagged gaps are skipped
fn to_event(
    channel: &str,
    item: std::result::Result<BroadcastMessage, BroadcastStreamRecvError>,
) -> Option<Event> {
    match item {
        Ok(message) => match Event::default().event(message.event).json_data(&message.payload) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(channel, "Failed to encode SSE event: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(channel, skipped, "Inbox subscriber lagged");
            None
        }
    }
}

/// Stream inbox events for the caller
///
/// Each `inbox_update` published on the caller's channel arrives as one SSE
/// event whose data is the JSON payload.
#[utoipa::path(
    get,
    path = "/api/inbox/stream",
    tag = "inbox",
    responses(
        (status = 200, description = "Server-sent event stream", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stream_inbox(
    user: CurrentUser,
    State(hub): State<Arc<RealtimeHub>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let channel = InboxNotifier::channel_for(user.id);
    let receiver = hub.subscribe(&channel).await;
    // Lives as long as the stream; prunes the channel once the client disconnects
    let guard = hub.channel_guard(&channel);
    tracing::info!(user_id = %user.id, "Inbox stream opened");

    let stream = BroadcastStream::new(receiver).filter_map(move |item| {
        let _guard = &guard;
        let event = to_event(&channel, item).map(Ok);
        async move { event }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"))
}
