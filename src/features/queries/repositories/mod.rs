mod pg_query_log_repository;

pub use pg_query_log_repository::PgQueryLogRepository;

use async_trait::async_trait;

use crate::features::queries::models::NewQueryLog;

/// Write side of the query log; rows are never read back
#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    async fn insert(&self, entry: NewQueryLog) -> Result<(), sqlx::Error>;
}
