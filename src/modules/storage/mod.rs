//! Storage module for uploaded files
//!
//! Provides an S3-compatible client for storing and removing
//! raw uploads, behind the [`ObjectStore`] trait.

mod s3_client;

pub use s3_client::S3Storage;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Storage request for '{key}' failed: {message}")]
    Request { key: String, message: String },

    #[error("Storage returned HTTP {status} for '{key}'")]
    Status { key: String, status: u16 },
}

/// Blob operations used by the files feature
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
