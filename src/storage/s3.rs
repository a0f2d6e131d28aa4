//! S3-compatible storage backend.

use super::{key_path, StorageBackend, StorageError};
use crate::app_config::StorageConfig;
use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_s3::{DeleteObjectRequest, HeadObjectRequest, PutObjectRequest, S3Client, S3};

/// S3-compatible storage backend.
pub struct S3Storage {
    s3: S3Client,
    bucket_name: String,
    pub_url: String,
}

impl S3Storage {
    /// Create a new S3 storage backend.
    pub fn new(region: Region, bucket_name: String, pub_url: String) -> S3Storage {
        log::info!("S3Storage initialized for bucket: {}", bucket_name);

        S3Storage {
            s3: S3Client::new(region),
            bucket_name,
            pub_url,
        }
    }

    /// Build the backend from application configuration. Credentials come
    /// from the rusoto provider chain (env vars, profile, instance role).
    pub fn from_config(config: &StorageConfig) -> S3Storage {
        let region = if config.s3_endpoint.is_empty() {
            config
                .s3_region
                .parse()
                .unwrap_or(Region::UsEast1)
        } else {
            Region::Custom {
                name: config.s3_region.clone(),
                endpoint: config.s3_endpoint.clone(),
            }
        };

        Self::new(
            region,
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
        )
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn put_object(&self, data: Vec<u8>, key: &str) -> Result<(), StorageError> {
        log::info!("S3Storage: put_object: {}", key);

        let put_request = PutObjectRequest {
            bucket: self.bucket_name.clone(),
            key: key_path(key),
            body: Some(data.into()),
            ..Default::default()
        };

        self.s3
            .put_object(put_request)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        log::info!("S3Storage: delete_object: {}", key);

        let delete_request = DeleteObjectRequest {
            bucket: self.bucket_name.clone(),
            key: key_path(key),
            ..Default::default()
        };

        self.s3
            .delete_object(delete_request)
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let head_request = HeadObjectRequest {
            bucket: self.bucket_name.clone(),
            key: key_path(key),
            ..Default::default()
        };

        match self.s3.head_object(head_request).await {
            Ok(_) => Ok(true),
            Err(rusoto_core::RusotoError::Service(rusoto_s3::HeadObjectError::NoSuchKey(_))) => {
                Ok(false)
            }
            // S3 HEAD responses carry no body, so missing keys surface as a
            // bare 404 rather than a typed service error.
            Err(rusoto_core::RusotoError::Unknown(resp)) if resp.status.as_u16() == 404 => {
                Ok(false)
            }
            Err(e) => Err(StorageError::S3(e.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.pub_url.trim_end_matches('/'), key_path(key))
    }
}
