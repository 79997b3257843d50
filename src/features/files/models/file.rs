use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// One parsed CSV row keyed by column name, in column order
pub type SampleRow = Map<String, Value>;

/// Processing state of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Processing,
    Ready,
    Error,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Processing => "processing",
            FileStatus::Ready => "ready",
            FileStatus::Error => "error",
        }
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(FileStatus::Processing),
            "ready" => Ok(FileStatus::Ready),
            "error" => Ok(FileStatus::Error),
            other => Err(format!("unknown file status '{}'", other)),
        }
    }
}

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Object name in storage
    pub filename: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub status: String,
    pub column_names: Option<Json<Vec<String>>>,
    pub sample_data: Option<Json<Vec<SampleRow>>>,
    pub row_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn columns(&self) -> &[String] {
        self.column_names.as_ref().map(|c| c.0.as_slice()).unwrap_or(&[])
    }

    pub fn sample_rows(&self) -> &[SampleRow] {
        self.sample_data.as_ref().map(|s| s.0.as_slice()).unwrap_or(&[])
    }

    /// Sample rows re-keyed in `column_names` order.
    ///
    /// JSONB does not keep object key order, so rows read back from Postgres
    /// are rebuilt from the column list. Keys outside it (`__parsed_extra`)
    /// follow the columns.
    pub fn ordered_sample_rows(&self) -> Vec<SampleRow> {
        let columns = self.columns();
        self.sample_rows()
            .iter()
            .map(|row| {
                let mut ordered = SampleRow::with_capacity(row.len());
                for column in columns {
                    if let Some(value) = row.get(column) {
                        ordered.insert(column.clone(), value.clone());
                    }
                }
                for (key, value) in row {
                    if !ordered.contains_key(key) {
                        ordered.insert(key.clone(), value.clone());
                    }
                }
                ordered
            })
            .collect()
    }

    /// Unknown values read as `Error`
    pub fn file_status(&self) -> FileStatus {
        self.status.parse().unwrap_or(FileStatus::Error)
    }
}

/// Values for a new `files` row; id and timestamps come from the database
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub user_id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub status: FileStatus,
    pub column_names: Vec<String>,
    pub sample_data: Vec<SampleRow>,
    pub row_count: i64,
}

impl NewFileRecord {
    /// Materialize with a fresh id and timestamps, as the database would
    #[cfg(test)]
    pub fn into_record(self) -> FileRecord {
        let now = Utc::now();
        FileRecord {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            filename: self.filename,
            original_name: self.original_name,
            size_bytes: self.size_bytes,
            mime_type: self.mime_type,
            status: self.status.as_str().to_string(),
            column_names: Some(Json(self.column_names)),
            sample_data: Some(Json(self.sample_data)),
            row_count: Some(self.row_count),
            created_at: now,
            updated_at: now,
        }
    }
}
