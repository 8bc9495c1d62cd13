//! Object storage for garage photos
//!
//! [`ObjectStorage`] is the seam services depend on; [`S3Storage`] talks to
//! any S3-compatible service.

mod s3_client;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::core::error::Result;

pub use s3_client::S3Storage;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key` and return its public URL
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    async fn remove(&self, keys: &[String]) -> Result<()>;

    fn public_url(&self, key: &str) -> String;
}

/// `{endpoint}/{bucket}/{key}` with each key segment percent-encoded
pub fn public_object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}/{}", endpoint, bucket, encoded.join("/"))
}
