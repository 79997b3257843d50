use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::PathUuid;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{
    DeleteFileResponseDto, FileDetailResponseDto, FileResponseDto, UploadFileDto,
};
use crate::features::files::services::FileService;
use crate::shared::constants::{EXPORT_FILENAME, MAX_FILE_SIZE};
use crate::shared::tabular::ResultTable;
use crate::shared::types::{ApiResponse, Meta};

/// Upload a CSV file
///
/// Accepts multipart/form-data with a `file` field. The file is parsed,
/// stored, and recorded with its column names, first rows and row count.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "CSV file upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing file or not a parseable CSV"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>), AppError> {
    let mut upload: Option<(Vec<u8>, String, Option<String>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some("file") {
            debug!("Ignoring unknown field: {:?}", field.name());
            continue;
        }

        let content_type = field.content_type().map(|s| s.to_string());
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload.csv")
            .to_string();

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        upload = Some((data.to_vec(), file_name, content_type));
    }

    let (data, file_name, content_type) =
        upload.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let response = service
        .upload_file(user.user_id, data, &file_name, content_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// List the caller's files, newest first
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Files retrieved successfully", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>, AppError> {
    let files = service.list_files(user.user_id).await?;
    let total = files.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(files),
        None,
        Some(Meta { total }),
    )))
}

/// Get a file with its sample rows
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = uuid::Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File retrieved successfully", body = ApiResponse<FileDetailResponseDto>),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    PathUuid(id): PathUuid,
) -> Result<Json<ApiResponse<FileDetailResponseDto>>, AppError> {
    let file = service.get_file(id, user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// Sample rows as a table
#[utoipa::path(
    get,
    path = "/api/files/{id}/preview",
    tag = "files",
    params(("id" = uuid::Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "Preview table", body = ApiResponse<ResultTable>),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_preview(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    PathUuid(id): PathUuid,
) -> Result<Json<ApiResponse<ResultTable>>, AppError> {
    let table = service.preview(id, user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(table), None, None)))
}

/// Download the sample rows as CSV
#[utoipa::path(
    get,
    path = "/api/files/{id}/preview.csv",
    tag = "files",
    params(("id" = uuid::Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv", body = String),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_preview_csv(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    PathUuid(id): PathUuid,
) -> Result<impl IntoResponse, AppError> {
    let csv = service.preview_csv(id, user.user_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        csv,
    ))
}

/// Delete a file and its stored blob
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "files",
    params(("id" = uuid::Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse<DeleteFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    PathUuid(id): PathUuid,
) -> Result<Json<ApiResponse<DeleteFileResponseDto>>, AppError> {
    service.delete_file(id, user.user_id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteFileResponseDto { deleted: true }),
        Some("File deleted successfully".to_string()),
        None,
    )))
}
