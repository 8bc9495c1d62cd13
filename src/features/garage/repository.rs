use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{CarPhoto, NewCarPhoto};
use crate::core::error::{AppError, Result};

#[async_trait]
pub trait GarageRepository: Send + Sync {
    /// Owner of `car_id`, `None` when the car does not exist
    async fn car_owner(&self, car_id: Uuid) -> Result<Option<Uuid>>;

    async fn insert_photo(&self, photo: NewCarPhoto) -> Result<CarPhoto>;

    async fn find_photo(&self, car_id: Uuid, photo_id: Uuid) -> Result<Option<CarPhoto>>;

    async fn delete_photo(&self, photo_id: Uuid) -> Result<()>;
}

pub struct PgGarageRepository {
    pool: PgPool,
}

impl PgGarageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GarageRepository for PgGarageRepository {
    async fn car_owner(&self, car_id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM cars WHERE id = $1")
            .bind(car_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    async fn insert_photo(&self, photo: NewCarPhoto) -> Result<CarPhoto> {
        sqlx::query_as::<_, CarPhoto>(
            r#"
            INSERT INTO car_photos (car_id, storage_key, url, content_type, size_bytes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, car_id, storage_key, url, content_type, size_bytes, created_at
            "#,
        )
        .bind(photo.car_id)
        .bind(photo.storage_key)
        .bind(photo.url)
        .bind(photo.content_type)
        .bind(photo.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert car photo: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_photo(&self, car_id: Uuid, photo_id: Uuid) -> Result<Option<CarPhoto>> {
        let photo = sqlx::query_as::<_, CarPhoto>(
            r#"
            SELECT id, car_id, storage_key, url, content_type, size_bytes, created_at
            FROM car_photos
            WHERE id = $1 AND car_id = $2
            "#,
        )
        .bind(photo_id)
        .bind(car_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn delete_photo(&self, photo_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM car_photos WHERE id = $1")
            .bind(photo_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryGarage {
        cars: Mutex<HashMap<Uuid, Uuid>>,
        photos: Mutex<Vec<CarPhoto>>,
    }

    impl MemoryGarage {
        pub fn add_car(&self, owner_id: Uuid) -> Uuid {
            let id = Uuid::new_v4();
            self.cars.lock().unwrap().insert(id, owner_id);
            id
        }

        pub fn photo_count(&self) -> usize {
            self.photos.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GarageRepository for MemoryGarage {
        async fn car_owner(&self, car_id: Uuid) -> Result<Option<Uuid>> {
            Ok(self.cars.lock().unwrap().get(&car_id).copied())
        }

        async fn insert_photo(&self, photo: NewCarPhoto) -> Result<CarPhoto> {
            let stored = CarPhoto {
                id: Uuid::new_v4(),
                car_id: photo.car_id,
                storage_key: photo.storage_key,
                url: photo.url,
                content_type: photo.content_type,
                size_bytes: photo.size_bytes,
                created_at: Utc::now(),
            };
            self.photos.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn find_photo(&self, car_id: Uuid, photo_id: Uuid) -> Result<Option<CarPhoto>> {
            Ok(self
                .photos
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == photo_id && p.car_id == car_id)
                .cloned())
        }

        async fn delete_photo(&self, photo_id: Uuid) -> Result<()> {
            self.photos.lock().unwrap().retain(|p| p.id != photo_id);
            Ok(())
        }
    }
}
