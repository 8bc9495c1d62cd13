use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::auth::CurrentUser;
use crate::features::inbox::dtos::{
    ListMessagesRequestDto, ListMessagesResponseDto, MarkReadResponseDto, MessageResponseDto,
    SendMessageDto, UnreadCountResponseDto,
};
use crate::features::inbox::services::InboxService;
use crate::shared::cache_control::CachePolicy;
use crate::shared::types::ApiResponse;

/// Mark every unread message in the caller's inbox as read
#[utoipa::path(
    post,
    path = "/api/inbox/mark-read",
    tag = "inbox",
    responses(
        (status = 200, description = "Messages marked read", body = MarkReadResponseDto),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Store failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    user: CurrentUser,
    State(service): State<Arc<InboxService>>,
) -> Result<(CachePolicy, Json<MarkReadResponseDto>)> {
    let result = service.mark_all_read(&user).await?;
    Ok((CachePolicy::NoStore, Json(result)))
}

/// Count unread messages for the caller
///
/// Never cached by browsers, proxies or CDNs.
#[utoipa::path(
    get,
    path = "/api/inbox/unread-count",
    tag = "inbox",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponseDto),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unread_count(
    user: CurrentUser,
    State(service): State<Arc<InboxService>>,
) -> Result<(CachePolicy, Json<UnreadCountResponseDto>)> {
    let result = service.unread_count(user.id).await?;
    Ok((CachePolicy::NoStore, Json(result)))
}

/// List inbox messages, newest first
#[utoipa::path(
    post,
    path = "/api/inbox/messages",
    tag = "inbox",
    request_body = ListMessagesRequestDto,
    responses(
        (status = 200, description = "Inbox page", body = ListMessagesResponseDto),
        (status = 400, description = "Missing userId"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Another user's inbox")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    user: CurrentUser,
    State(service): State<Arc<InboxService>>,
    AppJson(request): AppJson<ListMessagesRequestDto>,
) -> Result<(CachePolicy, Json<ListMessagesResponseDto>)> {
    let result = service.list_messages(&user, request).await?;
    let policy = CachePolicy::Private {
        max_age: service.list_max_age(),
    };
    Ok((policy, Json(result)))
}

/// Send a message to another member
#[utoipa::path(
    post,
    path = "/api/inbox/send",
    tag = "inbox",
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<MessageResponseDto>),
        (status = 400, description = "Validation error or message to self"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Receiver or club not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    user: CurrentUser,
    State(service): State<Arc<InboxService>>,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponseDto>>)> {
    let message = service.send_message(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(message),
            Some("Message sent".to_string()),
            None,
        )),
    ))
}
