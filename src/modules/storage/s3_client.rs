//! S3-compatible storage client
//!
//! Works against Supabase Storage's S3 endpoint, MinIO, or AWS S3.
//! Uses the rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::{ObjectStore, StorageError};
use crate::core::config::StorageConfig;

/// S3-compatible storage client bound to a single bucket
pub struct S3Storage {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
}

impl S3Storage {
    /// Create a client from configuration. Does not contact the server.
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("Invalid storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Config(format!("Invalid bucket '{}': {}", config.bucket, e)))?;

        // Path-style URLs (http://endpoint/bucket) for self-hosted and Supabase endpoints
        bucket.set_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), StorageError> {
        let name = self.bucket.name();

        match Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created at {}", name, self.endpoint);
                Ok(())
            }
            Ok(response) => {
                // 409 BucketAlreadyOwnedByYou lands here
                debug!(
                    "Bucket '{}' not created (HTTP {}), assuming it exists",
                    name, response.response_code
                );
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                {
                    debug!("Bucket '{}' already exists", name);
                } else {
                    warn!("Could not create bucket '{}': {}. Assuming it exists.", name, e);
                }
                Ok(())
            }
        }
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(StorageError::Status {
                key: key.to_string(),
                status,
            })
        }
    }

    fn request_error(key: &str, e: impl std::fmt::Display) -> StorageError {
        StorageError::Request {
            key: key.to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| Self::request_error(key, e))?;
        Self::check_status(key, response.status_code())?;

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| Self::request_error(key, e))?;
        Self::check_status(key, response.status_code())?;

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}
