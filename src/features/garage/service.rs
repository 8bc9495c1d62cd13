use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::model::{CarPhoto, NewCarPhoto};
use super::repository::GarageRepository;
use crate::core::error::{AppError, Result};
use crate::features::auth::CurrentUser;
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::{ALLOWED_PHOTO_TYPES, MAX_PHOTO_SIZE};

/// Stored file extension for an accepted photo content type
pub fn photo_extension(content_type: &str) -> Option<&'static str> {
    ALLOWED_PHOTO_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type))
        .map(|(_, ext)| *ext)
}

pub struct GarageService {
    repo: Arc<dyn GarageRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl GarageService {
    pub fn new(repo: Arc<dyn GarageRepository>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { repo, storage }
    }

    async fn ensure_owner(&self, user: &CurrentUser, car_id: Uuid) -> Result<()> {
        let owner = self
            .repo
            .car_owner(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        if owner != user.id {
            return Err(AppError::Forbidden(
                "Only the owner can change this car's photos".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn upload_photo(
        &self,
        user: &CurrentUser,
        car_id: Uuid,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<CarPhoto> {
        self.ensure_owner(user, car_id).await?;

        let ext = photo_extension(content_type).ok_or_else(|| {
            AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: image/jpeg, image/png, image/webp",
                content_type
            ))
        })?;

        if data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }
        if data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} MB",
                MAX_PHOTO_SIZE / 1024 / 1024
            )));
        }

        let key = format!("cars/{}/{}.{}", car_id, Uuid::new_v4(), ext);
        let size_bytes = data.len() as i64;
        let url = self.storage.upload(&key, data, content_type).await?;

        let photo = match self
            .repo
            .insert_photo(NewCarPhoto {
                car_id,
                storage_key: key.clone(),
                url,
                content_type: content_type.to_string(),
                size_bytes,
            })
            .await
        {
            Ok(photo) => photo,
            Err(e) => {
                // Orphaned object otherwise
                if let Err(cleanup) = self.storage.remove(std::slice::from_ref(&key)).await {
                    warn!(key = %key, "Failed to remove orphaned photo: {}", cleanup);
                }
                return Err(e);
            }
        };

        info!(photo_id = %photo.id, car_id = %car_id, user_id = %user.id, "Car photo uploaded");
        Ok(photo)
    }

    pub async fn delete_photo(&self, user: &CurrentUser, car_id: Uuid, photo_id: Uuid) -> Result<()> {
        self.ensure_owner(user, car_id).await?;

        let photo = self
            .repo
            .find_photo(car_id, photo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

        self.storage.remove(&[photo.storage_key.clone()]).await?;
        self.repo.delete_photo(photo.id).await?;

        info!(photo_id = %photo.id, car_id = %car_id, user_id = %user.id, "Car photo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::garage::repository::memory::MemoryGarage;
    use crate::modules::storage::memory::MemoryStorage;
    use crate::shared::test_helpers::{current_user_from, sample_profile};

    struct Fixture {
        service: GarageService,
        repo: Arc<MemoryGarage>,
        storage: Arc<MemoryStorage>,
        owner: CurrentUser,
        stranger: CurrentUser,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MemoryGarage::default());
        let storage = Arc::new(MemoryStorage::default());
        Fixture {
            service: GarageService::new(repo.clone(), storage.clone()),
            repo,
            storage,
            owner: current_user_from(&sample_profile("owner")),
            stranger: current_user_from(&sample_profile("stranger")),
        }
    }

    #[test]
    fn test_photo_extension() {
        assert_eq!(photo_extension("image/jpeg"), Some("jpg"));
        assert_eq!(photo_extension("IMAGE/PNG"), Some("png"));
        assert_eq!(photo_extension("image/gif"), None);
    }

    #[tokio::test]
    async fn test_upload_stores_object_and_row() {
        let f = fixture();
        let car_id = f.repo.add_car(f.owner.id);

        let photo = f
            .service
            .upload_photo(&f.owner, car_id, vec![1, 2, 3], "image/webp")
            .await
            .unwrap();

        assert!(photo.storage_key.starts_with(&format!("cars/{}/", car_id)));
        assert!(photo.storage_key.ends_with(".webp"));
        assert_eq!(photo.size_bytes, 3);
        assert!(photo.url.ends_with(&photo.storage_key));
        assert_eq!(f.storage.keys(), vec![photo.storage_key.clone()]);
        assert_eq!(
            f.storage.content_type(&photo.storage_key).as_deref(),
            Some("image/webp")
        );
    }

    #[tokio::test]
    async fn test_upload_checks_car_and_owner() {
        let f = fixture();
        let car_id = f.repo.add_car(f.owner.id);

        let missing = f
            .service
            .upload_photo(&f.owner, Uuid::new_v4(), vec![1], "image/png")
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let foreign = f
            .service
            .upload_photo(&f.stranger, car_id, vec![1], "image/png")
            .await;
        assert!(matches!(foreign, Err(AppError::Forbidden(_))));

        let gif = f
            .service
            .upload_photo(&f.owner, car_id, vec![1], "image/gif")
            .await;
        assert!(matches!(gif, Err(AppError::BadRequest(_))));

        let huge = f
            .service
            .upload_photo(&f.owner, car_id, vec![0; MAX_PHOTO_SIZE + 1], "image/png")
            .await;
        assert!(matches!(huge, Err(AppError::BadRequest(_))));

        assert!(f.storage.keys().is_empty());
        assert_eq!(f.repo.photo_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_object_then_row() {
        let f = fixture();
        let car_id = f.repo.add_car(f.owner.id);
        let photo = f
            .service
            .upload_photo(&f.owner, car_id, vec![9; 16], "image/jpeg")
            .await
            .unwrap();

        let denied = f.service.delete_photo(&f.stranger, car_id, photo.id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        f.service
            .delete_photo(&f.owner, car_id, photo.id)
            .await
            .unwrap();
        assert!(f.storage.keys().is_empty());
        assert_eq!(f.repo.photo_count(), 0);

        let again = f.service.delete_photo(&f.owner, car_id, photo.id).await;
        assert!(matches!(again, Err(AppError::NotFound(m)) if m == "Photo not found"));
    }
}
