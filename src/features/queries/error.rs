use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::features::queries::dtos::QueryErrorResponseDto;

/// Failures of the query endpoint. Clients only ever see two outcomes.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("File not found")]
    FileNotFound,

    #[error("Failed to process query: {0}")]
    Processing(String),
}

impl QueryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::FileNotFound => StatusCode::NOT_FOUND,
            QueryError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match self {
            QueryError::FileNotFound => "File not found",
            QueryError::Processing(ref detail) => {
                tracing::error!("Query failed: {}", detail);
                "Failed to process query"
            }
        };

        (
            status,
            Json(QueryErrorResponseDto {
                error: error.to_string(),
            }),
        )
            .into_response()
    }
}
