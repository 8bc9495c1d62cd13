use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A photo of a car, stored in object storage
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct CarPhoto {
    pub id: Uuid,
    pub car_id: Uuid,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCarPhoto {
    pub car_id: Uuid,
    pub storage_key: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Multipart body for photo uploads
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoForm {
    /// JPEG, PNG or WebP image, at most 10 MiB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletePhotoResponseDto {
    pub deleted: bool,
}
