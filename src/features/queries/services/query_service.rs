use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::features::files::models::FileRecord;
use crate::features::files::FileRepository;
use crate::features::queries::dtos::{QueryRequestDto, QueryResponseDto};
use crate::features::queries::error::QueryError;
use crate::features::queries::models::{NewQueryLog, QueryStatus};
use crate::features::queries::repositories::QueryLogRepository;
use crate::modules::llm::TextModel;
use crate::shared::prompts::render_csv_analysis_prompt;
use crate::shared::tabular::ResultTable;

/// Answers questions about an uploaded file with one model call
pub struct QueryService {
    files: Arc<dyn FileRepository>,
    query_log: Arc<dyn QueryLogRepository>,
    model: Arc<dyn TextModel>,
}

impl QueryService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        query_log: Arc<dyn QueryLogRepository>,
        model: Arc<dyn TextModel>,
    ) -> Self {
        Self {
            files,
            query_log,
            model,
        }
    }

    /// Look up the file, ask the model, and record the attempt.
    pub async fn ask(
        &self,
        user_id: Uuid,
        request: QueryRequestDto,
        with_table: bool,
    ) -> Result<QueryResponseDto, QueryError> {
        let file_id = Uuid::parse_str(&request.file_id).map_err(|_| QueryError::FileNotFound)?;

        let file = self
            .files
            .find_for_user(file_id, user_id)
            .await
            .map_err(|e| QueryError::Processing(format!("file lookup failed: {}", e)))?
            .ok_or(QueryError::FileNotFound)?;

        let started = Instant::now();
        let outcome = self.generate_answer(&file, &request.query).await;
        let execution_time_ms = started.elapsed().as_millis() as i64;

        let (status, error_message) = match &outcome {
            Ok(_) => (QueryStatus::Success, None),
            Err(e) => (QueryStatus::Error, Some(e.clone())),
        };
        self.record(NewQueryLog {
            user_id,
            file_id,
            natural_language_query: request.query,
            status,
            error_message,
            execution_time_ms,
        })
        .await;

        let answer = outcome.map_err(QueryError::Processing)?;
        info!(
            "Answered query on file {} in {} ms",
            file_id, execution_time_ms
        );

        let table = with_table.then(|| ResultTable::from_answer(&answer));
        Ok(QueryResponseDto { answer, table })
    }

    async fn generate_answer(&self, file: &FileRecord, query: &str) -> Result<String, String> {
        let sample =
            serde_json::to_value(file.ordered_sample_rows()).map_err(|e| e.to_string())?;
        let prompt = render_csv_analysis_prompt(file.columns(), &sample, query)
            .map_err(|e| e.to_string())?;

        debug!("Prompt for file {} is {} bytes", file.id, prompt.len());

        self.model.generate(&prompt).await.map_err(|e| e.to_string())
    }

    /// Log write failures never affect the response
    async fn record(&self, entry: NewQueryLog) {
        if let Err(e) = self.query_log.insert(entry).await {
            warn!("Failed to record query log entry: {}", e);
        }
    }
}
