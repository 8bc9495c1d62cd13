//! S3-compatible storage client (MinIO in development)

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::{public_object_url, ObjectStorage};
use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

pub struct S3Storage {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    public_endpoint: String,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Invalid storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        // Path-style URLs: http://endpoint/bucket/key
        let bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Invalid bucket configuration: {}", e)))?
            .with_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Create the bucket when it is missing. Failures are logged, not fatal.
    pub async fn ensure_bucket_exists(&self) {
        match self.bucket.exists().await {
            Ok(true) => debug!("Bucket '{}' already exists", self.bucket.name()),
            Ok(false) => {
                match Bucket::create_with_path_style(
                    &self.bucket.name(),
                    self.region.clone(),
                    self.credentials.clone(),
                    BucketConfiguration::default(),
                )
                .await
                {
                    Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
                    Err(e) => warn!("Could not create bucket '{}': {}", self.bucket.name(), e),
                }
            }
            Err(e) => warn!(
                "Could not check bucket '{}': {}. Assuming it exists.",
                self.bucket.name(),
                e
            ),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        if response.status_code() >= 300 {
            return Err(AppError::Storage(format!(
                "Upload of '{}' rejected with HTTP {}",
                key,
                response.status_code()
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(self.public_url(key))
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.bucket
                .delete_object(key)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete '{}': {}", key, e)))?;
            debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_endpoint, &self.bucket.name(), key)
    }
}
