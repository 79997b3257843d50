//! Persistence seam for file records.
//!
//! Every lookup is scoped to the owning user; rows of other users behave as missing.

mod pg_file_repository;

pub use pg_file_repository::PgFileRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::features::files::models::{FileRecord, NewFileRecord};

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, sqlx::Error>;

    /// Newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<FileRecord>, sqlx::Error>;

    async fn find_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<FileRecord>, sqlx::Error>;

    /// Returns the removed row, or `None` when nothing matched
    async fn delete_for_user(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<FileRecord>, sqlx::Error>;
}
