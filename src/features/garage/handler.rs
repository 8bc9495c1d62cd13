use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::model::{CarPhoto, DeletePhotoResponseDto, UploadPhotoForm};
use super::service::GarageService;
use crate::core::error::{AppError, Result};
use crate::features::auth::CurrentUser;
use crate::shared::types::ApiResponse;

/// Upload a photo of one of the caller's cars
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/cars/{id}/photos",
    tag = "garage",
    params(("id" = Uuid, Path, description = "Car ID")),
    request_body(content = UploadPhotoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Photo uploaded", body = ApiResponse<CarPhoto>),
        (status = 400, description = "Missing file, unsupported type or too large"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Car belongs to someone else"),
        (status = 404, description = "Car not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_photo(
    user: CurrentUser,
    State(service): State<Arc<GarageService>>,
    Path(car_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CarPhoto>>)> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;
        upload = Some((data.to_vec(), content_type));
    }

    let (data, content_type) =
        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let photo = service
        .upload_photo(&user, car_id, data, &content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(photo),
            Some("Photo uploaded".to_string()),
            None,
        )),
    ))
}

/// Delete a photo of one of the caller's cars
#[utoipa::path(
    delete,
    path = "/api/cars/{id}/photos/{photo_id}",
    tag = "garage",
    params(
        ("id" = Uuid, Path, description = "Car ID"),
        ("photo_id" = Uuid, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Photo deleted", body = ApiResponse<DeletePhotoResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Car belongs to someone else"),
        (status = 404, description = "Car or photo not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_photo(
    user: CurrentUser,
    State(service): State<Arc<GarageService>>,
    Path((car_id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<DeletePhotoResponseDto>>> {
    service.delete_photo(&user, car_id, photo_id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeletePhotoResponseDto { deleted: true }),
        Some("Photo deleted".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::garage::repository::memory::MemoryGarage;
    use crate::features::garage::routes::routes;
    use crate::modules::storage::memory::MemoryStorage;
    use crate::shared::test_helpers::{current_user_from, sample_profile, with_current_user};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;

    fn photo_form(bytes: &[u8], mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes.to_vec())
                .file_name("car.jpg")
                .mime_type(mime),
        )
    }

    #[tokio::test]
    async fn test_upload_and_delete_over_http() {
        let owner = current_user_from(&sample_profile("owner"));
        let repo = Arc::new(MemoryGarage::default());
        let storage = Arc::new(MemoryStorage::default());
        let car_id = repo.add_car(owner.id);
        let service = Arc::new(GarageService::new(repo.clone(), storage.clone()));
        let server = TestServer::new(with_current_user(routes(service), owner)).unwrap();

        let response = server
            .post(&format!("/api/cars/{}/photos", car_id))
            .multipart(photo_form(b"jpegbytes", "image/jpeg"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        let photo_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["content_type"], "image/jpeg");
        assert_eq!(storage.keys().len(), 1);

        let deleted = server
            .delete(&format!("/api/cars/{}/photos/{}", car_id, photo_id))
            .await;
        deleted.assert_status_ok();
        assert_eq!(deleted.json::<Value>()["data"]["deleted"], true);
        assert!(storage.keys().is_empty());
        assert_eq!(repo.photo_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type_and_missing_file() {
        let owner = current_user_from(&sample_profile("owner"));
        let repo = Arc::new(MemoryGarage::default());
        let car_id = repo.add_car(owner.id);
        let service = Arc::new(GarageService::new(
            repo,
            Arc::new(MemoryStorage::default()),
        ));
        let server = TestServer::new(with_current_user(routes(service), owner)).unwrap();

        let gif = server
            .post(&format!("/api/cars/{}/photos", car_id))
            .multipart(photo_form(b"GIF89a", "image/gif"))
            .await;
        gif.assert_status(StatusCode::BAD_REQUEST);

        let empty = server
            .post(&format!("/api/cars/{}/photos", car_id))
            .multipart(MultipartForm::new().add_text("caption", "track day"))
            .await;
        empty.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(empty.json::<Value>()["message"], "File is required");
    }
}
