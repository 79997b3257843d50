use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileDetailResponseDto, FileResponseDto};
use crate::features::files::models::{FileRecord, FileStatus, NewFileRecord};
use crate::features::files::repositories::FileRepository;
use crate::features::files::services::csv_parser::parse_csv;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::{DEFAULT_CSV_MIME_TYPE, SAMPLE_ROW_LIMIT};
use crate::shared::tabular::ResultTable;

/// Service for uploaded CSV files
pub struct FileService {
    repository: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStore>,
}

impl FileService {
    pub fn new(repository: Arc<dyn FileRepository>, storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Object name for an upload: random id plus the original extension
    fn storage_name(original_name: &str) -> String {
        let extension = original_name.rsplit('.').next().unwrap_or(original_name);
        format!("{}.{}", Uuid::new_v4(), extension)
    }

    /// Parse, store and record an uploaded CSV.
    ///
    /// The blob is not removed if the insert fails afterwards.
    pub async fn upload_file(
        &self,
        user_id: Uuid,
        data: Vec<u8>,
        original_name: &str,
        content_type: Option<String>,
    ) -> Result<FileResponseDto> {
        let parsed = parse_csv(&data, SAMPLE_ROW_LIMIT).map_err(|e| {
            debug!("Rejecting upload '{}': {}", original_name, e);
            AppError::BadRequest("The file could not be parsed as CSV".to_string())
        })?;

        let filename = Self::storage_name(original_name);
        let mime_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CSV_MIME_TYPE.to_string());
        let size_bytes = data.len() as i64;

        self.storage
            .upload(&filename, data, &mime_type)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        debug!("Stored upload '{}' as '{}'", original_name, filename);

        let file = self
            .repository
            .insert(NewFileRecord {
                user_id,
                filename,
                original_name: original_name.to_string(),
                size_bytes,
                mime_type,
                status: FileStatus::Ready,
                column_names: parsed.columns,
                sample_data: parsed.sample,
                row_count: parsed.row_count as i64,
            })
            .await?;

        info!(
            "File record saved: id={}, columns={}, rows={}",
            file.id,
            file.columns().len(),
            parsed.row_count
        );

        Ok(FileResponseDto::from(&file))
    }

    /// The caller's files, newest first
    pub async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileResponseDto>> {
        let files = self.repository.list_for_user(user_id).await?;
        Ok(files.iter().map(FileResponseDto::from).collect())
    }

    /// Look up one of the caller's files
    pub async fn find_file(&self, id: Uuid, user_id: Uuid) -> Result<FileRecord> {
        self.repository
            .find_for_user(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    pub async fn get_file(&self, id: Uuid, user_id: Uuid) -> Result<FileDetailResponseDto> {
        Ok(FileDetailResponseDto::from(self.find_file(id, user_id).await?))
    }

    /// Sample rows as a header/rows table
    pub async fn preview(&self, id: Uuid, user_id: Uuid) -> Result<ResultTable> {
        let file = self.find_file(id, user_id).await?;
        Ok(ResultTable::from_sample(file.columns(), file.sample_rows()))
    }

    /// Sample rows re-serialized as CSV
    pub async fn preview_csv(&self, id: Uuid, user_id: Uuid) -> Result<String> {
        self.preview(id, user_id)
            .await?
            .to_csv()
            .map_err(|e| AppError::Internal(format!("Failed to write CSV: {}", e)))
    }

    /// Delete the record, then try to remove its blob.
    ///
    /// A storage failure is logged and the delete still succeeds.
    pub async fn delete_file(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let file = self
            .repository
            .delete_for_user(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        info!("File record deleted: id={}", file.id);

        if let Err(e) = self.storage.delete(&file.filename).await {
            warn!("Failed to remove blob '{}': {}", file.filename, e);
        }

        Ok(())
    }
}
