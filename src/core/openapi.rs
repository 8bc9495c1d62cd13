use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{handler as auth_handler, CurrentUser};
use crate::features::gallery::{dtos as gallery_dtos, handlers as gallery_handlers};
use crate::features::garage::{handler as garage_handler, model as garage_model};
use crate::features::inbox::{dtos as inbox_dtos, handlers as inbox_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handler::get_me,
        // Inbox
        inbox_handlers::mark_read,
        inbox_handlers::unread_count,
        inbox_handlers::list_messages,
        inbox_handlers::send_message,
        inbox_handlers::stream_inbox,
        // Gallery (public)
        gallery_handlers::list_clubs,
        gallery_handlers::get_club,
        gallery_handlers::list_cars,
        gallery_handlers::get_car,
        gallery_handlers::list_events,
        gallery_handlers::get_event,
        gallery_handlers::get_leaderboard,
        // Garage
        garage_handler::upload_photo,
        garage_handler::delete_photo,
    ),
    components(
        schemas(
            ApiResponse<CurrentUser>,
            Meta,
            CurrentUser,
            // Inbox
            inbox_dtos::MarkReadMeta,
            inbox_dtos::MarkReadResponseDto,
            inbox_dtos::UnreadCountMeta,
            inbox_dtos::UnreadCountResponseDto,
            inbox_dtos::InboxCursor,
            inbox_dtos::ListMessagesRequestDto,
            inbox_dtos::SenderSummaryDto,
            inbox_dtos::ClubSummaryDto,
            inbox_dtos::InboxMessageDto,
            inbox_dtos::InboxListMeta,
            inbox_dtos::ListMessagesResponseDto,
            inbox_dtos::SendMessageDto,
            inbox_dtos::MessageResponseDto,
            inbox_dtos::InboxAction,
            inbox_dtos::InboxEventDto,
            // Gallery
            gallery_dtos::GalleryItemDto,
            gallery_dtos::Leaderboard,
            // Garage
            garage_model::CarPhoto,
            garage_model::UploadPhotoForm,
            garage_model::DeletePhotoResponseDto,
        )
    ),
    tags(
        (name = "auth", description = "Authenticated caller profile"),
        (name = "inbox", description = "Messages, unread counts and realtime inbox events"),
        (name = "gallery", description = "Clubs, cars, events and leaderboards (public)"),
        (name = "garage", description = "Car photo management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Pitlane API",
        version = "0.1.0",
        description = "API documentation for Pitlane",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the document info with configured values
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
