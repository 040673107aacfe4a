//! REST handlers for `/health` and `/api/files`.
//!
//! Handlers call the synchronous [`folio_core::LibraryService`] directly and translate its
//! errors through [`ApiError`].

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    ErrorRes, HealthRes, HealthService, ListFilesRes, MessageRes, ProgressQuery, UploadRes,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection,
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Multipart, Path as AxumPath, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use folio_core::DEFAULT_UPLOAD_FILENAME;
use utoipa::ToSchema;

/// Content type sent when the stored bytes are not recognised; the reader client expects PDFs.
const FALLBACK_CONTENT_TYPE: &str = "application/pdf";

/// Multipart form accepted by `POST /api/files/upload` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadRes),
        (status = 400, description = "Invalid file name or malformed form", body = ErrorRes),
        (status = 409, description = "A file with this name already exists", body = ErrorRes),
        (status = 500, description = "Storage failure", body = ErrorRes)
    )
)]
/// Upload a file from a multipart form
///
/// Reads the `file` part and stores it under the part's file name. A part without a file name
/// is stored as `default_filename`. Existing files are never overwritten.
///
/// # Errors
/// Returns `400` for unsafe names or a missing `file` part, `409` if the name is taken, and
/// `500` if the write fails.
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadRes>, ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_FILENAME)
            .to_string();
        let bytes = field.bytes().await?;

        let stored = state.library.upload(&name, bytes.as_ref())?;
        return Ok(Json(UploadRes {
            message: format!("File uploaded successfully: {}", stored),
            file_name: stored.into_string(),
        }));
    }

    Err(ApiError::BadRequest(
        "multipart form has no `file` part".into(),
    ))
}

#[utoipa::path(
    put,
    path = "/api/files/{file_name}",
    params(("file_name" = String, Path, description = "Name to store the file under")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = UploadRes),
        (status = 400, description = "Invalid file name", body = ErrorRes),
        (status = 409, description = "A file with this name already exists", body = ErrorRes),
        (status = 413, description = "Body exceeds the upload limit", body = ErrorRes),
        (status = 500, description = "Storage failure", body = ErrorRes)
    )
)]
/// Upload a file from a raw request body
#[axum::debug_handler]
pub async fn put_file(
    State(state): State<AppState>,
    file_name: Result<AxumPath<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<UploadRes>), ApiError> {
    let AxumPath(file_name) = file_name?;
    let body = body?;
    let stored = state.library.upload(&file_name, body.as_ref())?;
    Ok((
        StatusCode::CREATED,
        Json(UploadRes {
            message: format!("File uploaded successfully: {}", stored),
            file_name: stored.into_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/files/download/{file_name}",
    params(("file_name" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File content, shown inline", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid file name", body = ErrorRes),
        (status = 404, description = "File not found", body = ErrorRes)
    )
)]
/// Download a stored file
///
/// The content type is sniffed from the bytes and falls back to `application/pdf`. The
/// `Content-Disposition` file name is the cleaned stored name.
#[axum::debug_handler]
pub async fn download_file(
    State(state): State<AppState>,
    file_name: Result<AxumPath<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let AxumPath(file_name) = file_name?;
    let (info, bytes) = state.library.download_document(&file_name)?;
    let content_type = info
        .media_type
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, inline_disposition(&info.name)),
        ],
        bytes,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/files/progress/{file_name}",
    params(("file_name" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "Last read position (1 when never set)", body = u64),
        (status = 400, description = "Invalid file name", body = ErrorRes)
    )
)]
/// Get the last read position of a file
#[axum::debug_handler]
pub async fn get_progress(
    State(state): State<AppState>,
    file_name: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<u64>, ApiError> {
    let AxumPath(file_name) = file_name?;
    Ok(Json(state.library.get_progress(&file_name)?))
}

#[utoipa::path(
    post,
    path = "/api/files/progress/{file_name}",
    params(
        ("file_name" = String, Path, description = "Stored file name"),
        ProgressQuery
    ),
    responses(
        (status = 200, description = "Progress updated", body = MessageRes),
        (status = 400, description = "Invalid file name, or missing or negative position", body = ErrorRes)
    )
)]
/// Set the last read position of a file
///
/// The position is not checked against the file's size, and the file need not exist.
#[axum::debug_handler]
pub async fn set_progress(
    State(state): State<AppState>,
    file_name: Result<AxumPath<String>, PathRejection>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let AxumPath(file_name) = file_name?;
    let Query(query) = query?;
    state.library.set_progress(&file_name, query.position)?;
    Ok(Json(MessageRes {
        message: "Progress updated successfully.".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Names of all stored files", body = ListFilesRes),
        (status = 500, description = "Storage failure", body = ErrorRes)
    )
)]
/// List all stored files
#[axum::debug_handler]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<ListFilesRes>, ApiError> {
    let files = state.library.list_files()?;
    Ok(Json(ListFilesRes { files }))
}

#[utoipa::path(
    delete,
    path = "/api/files/delete/{file_name}",
    params(("file_name" = String, Path, description = "Stored file name")),
    responses(
        (status = 200, description = "File and progress deleted (or were already absent)", body = MessageRes),
        (status = 400, description = "Invalid file name", body = ErrorRes),
        (status = 500, description = "Storage failure", body = ErrorRes)
    )
)]
/// Delete a file and its progress record
#[axum::debug_handler]
pub async fn delete_file(
    State(state): State<AppState>,
    file_name: Result<AxumPath<String>, PathRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let AxumPath(file_name) = file_name?;
    let deleted = state.library.delete_file(&file_name)?;
    Ok(Json(MessageRes {
        message: format!(
            "File and its progress have been deleted successfully: {}",
            deleted
        ),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/files/delete-all",
    responses(
        (status = 200, description = "All files and progress deleted", body = MessageRes),
        (status = 500, description = "Some entries could not be deleted", body = ErrorRes)
    )
)]
/// Delete every file and every progress record
///
/// # Errors
/// Returns `500` with the names of the entries that could not be removed.
#[axum::debug_handler]
pub async fn delete_all_files(State(state): State<AppState>) -> Result<Json<MessageRes>, ApiError> {
    state.library.delete_all_files()?;
    Ok(Json(MessageRes {
        message: "All files and progress records have been deleted successfully.".into(),
    }))
}

/// `Content-Disposition` value that displays the file in the browser.
///
/// Characters that cannot appear in a quoted header parameter are dropped.
fn inline_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| (c.is_ascii_graphic() || *c == ' ') && *c != '"' && *c != '\\')
        .collect();
    format!("inline; filename=\"{}\"", safe)
}
