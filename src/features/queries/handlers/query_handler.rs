use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use std::sync::Arc;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::queries::dtos::{
    QueryErrorResponseDto, QueryParams, QueryRequestDto, QueryResponseDto,
};
use crate::features::queries::error::QueryError;
use crate::features::queries::services::QueryService;

/// Ask a question about an uploaded file
///
/// Returns the model's raw answer. With `?format=table` a parsed table is
/// included as well.
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "queries",
    params(QueryParams),
    request_body = QueryRequestDto,
    responses(
        (status = 200, description = "Model answer", body = QueryResponseDto),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found", body = QueryErrorResponseDto),
        (status = 500, description = "Failed to process query", body = QueryErrorResponseDto)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn run_query(
    user: AuthenticatedUser,
    State(service): State<Arc<QueryService>>,
    params: Result<Query<QueryParams>, QueryRejection>,
    body: Result<Json<QueryRequestDto>, JsonRejection>,
) -> Result<Json<QueryResponseDto>, QueryError> {
    let Query(params) =
        params.map_err(|e| QueryError::Processing(format!("invalid query string: {}", e)))?;
    let Json(request) =
        body.map_err(|e| QueryError::Processing(format!("invalid request body: {}", e)))?;

    let response = service
        .ask(user.user_id, request, params.wants_table())
        .await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::features::files::models::{FileStatus, NewFileRecord};
    use crate::features::files::FileRepository;
    use crate::features::queries::{routes, QueryService};
    use crate::shared::test_helpers::{
        with_test_auth, FakeTextModel, InMemoryFileRepository, InMemoryQueryLogRepository,
        TEST_USER_ID,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    async fn server(model: FakeTextModel) -> (TestServer, Uuid, Arc<InMemoryQueryLogRepository>) {
        let files = Arc::new(InMemoryFileRepository::new());
        let file = files
            .insert(NewFileRecord {
                user_id: Uuid::parse_str(TEST_USER_ID).unwrap(),
                filename: "f.csv".to_string(),
                original_name: "people.csv".to_string(),
                size_bytes: 20,
                mime_type: "text/csv".to_string(),
                status: FileStatus::Ready,
                column_names: vec!["name".to_string()],
                sample_data: vec![],
                row_count: 0,
            })
            .await
            .unwrap();

        let query_log = Arc::new(InMemoryQueryLogRepository::new());
        let service = Arc::new(QueryService::new(files, query_log.clone(), Arc::new(model)));
        let server = TestServer::new(with_test_auth(routes(service))).unwrap();
        (server, file.id, query_log)
    }

    #[tokio::test]
    async fn test_answer_body_is_bare() {
        let (server, file_id, _) = server(FakeTextModel::answering("There are 3 rows.")).await;

        let response = server
            .post("/api/query")
            .json(&json!({ "query": "How many rows?", "fileId": file_id }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "answer": "There are 3 rows." }));
    }

    #[tokio::test]
    async fn test_table_format() {
        let (server, file_id, _) = server(FakeTextModel::answering("Three")).await;

        let response = server
            .post("/api/query")
            .add_query_param("format", "table")
            .json(&json!({ "query": "How many rows?", "fileId": file_id }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["table"]["headers"], json!(["Response"]));
        assert_eq!(body["table"]["rows"], json!([["Three"]]));
    }

    #[tokio::test]
    async fn test_unknown_file_is_404() {
        let (server, _, _) = server(FakeTextModel::answering("n/a")).await;

        let response = server
            .post("/api/query")
            .json(&json!({ "query": "How many rows?", "fileId": Uuid::new_v4() }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "File not found" }));
    }

    #[tokio::test]
    async fn test_model_failure_is_500() {
        let (server, file_id, query_log) = server(FakeTextModel::failing("boom")).await;

        let response = server
            .post("/api/query")
            .json(&json!({ "query": "How many rows?", "fileId": file_id }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Failed to process query" }));
        assert_eq!(query_log.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_body_is_500() {
        let (server, _, _) = server(FakeTextModel::answering("n/a")).await;

        let response = server
            .post("/api/query")
            .json(&json!({ "question": "missing fields" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Failed to process query" }));
    }

    #[tokio::test]
    async fn test_invalid_query_string_is_500() {
        let (server, file_id, query_log) = server(FakeTextModel::answering("n/a")).await;

        let response = server
            .post("/api/query?format=table&format=table")
            .json(&json!({ "query": "How many rows?", "fileId": file_id }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Failed to process query" }));
        assert!(query_log.entries().is_empty());
    }
}
