use axum::Json;

use crate::core::error::Result;
use crate::features::auth::model::CurrentUser;
use crate::shared::types::ApiResponse;

/// Get the profile of the authenticated caller
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<CurrentUser>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(user: CurrentUser) -> Result<Json<ApiResponse<CurrentUser>>> {
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
