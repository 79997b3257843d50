use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::files::models::{FileRecord, FileStatus, SampleRow};

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The CSV file to upload
    #[schema(format = Binary, content_media_type = "text/csv")]
    pub file: String,
}

/// File record as returned by list and upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// Object name in storage
    pub filename: String,
    /// Filename as uploaded
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub status: FileStatus,
    pub column_names: Vec<String>,
    /// Number of data rows in the file
    pub row_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File record including the stored sample rows
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileDetailResponseDto {
    #[serde(flatten)]
    pub file: FileResponseDto,
    /// First rows of the file, keyed by column name
    #[schema(value_type = Vec<Object>)]
    pub sample_data: Vec<SampleRow>,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    pub deleted: bool,
}

impl From<&FileRecord> for FileResponseDto {
    fn from(file: &FileRecord) -> Self {
        Self {
            id: file.id,
            filename: file.filename.clone(),
            original_name: file.original_name.clone(),
            size_bytes: file.size_bytes,
            mime_type: file.mime_type.clone(),
            status: file.file_status(),
            column_names: file.columns().to_vec(),
            row_count: file.row_count.unwrap_or(0),
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

impl From<FileRecord> for FileDetailResponseDto {
    fn from(file: FileRecord) -> Self {
        Self {
            file: FileResponseDto::from(&file),
            sample_data: file.ordered_sample_rows(),
        }
    }
}
