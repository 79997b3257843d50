use async_trait::async_trait;
use sqlx::PgPool;

use super::QueryLogRepository;
use crate::features::queries::models::NewQueryLog;

pub struct PgQueryLogRepository {
    pool: PgPool,
}

impl PgQueryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLogRepository for PgQueryLogRepository {
    async fn insert(&self, entry: NewQueryLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO queries (user_id, file_id, natural_language_query, status, error_message, execution_time_ms)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.file_id)
        .bind(entry.natural_language_query)
        .bind(entry.status.as_str())
        .bind(entry.error_message)
        .bind(entry.execution_time_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
