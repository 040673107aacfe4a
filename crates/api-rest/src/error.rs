//! Mapping from core errors to HTTP responses.

use api_shared::ErrorRes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::{ErrorKind, FolioError};

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Folio(FolioError),
    Multipart(MultipartError),
    /// An extractor rejected the request before the handler ran
    Rejected { status: StatusCode, message: String },
    BadRequest(String),
}

macro_rules! rejection_into_api_error {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

rejection_into_api_error!(BytesRejection, MultipartRejection, PathRejection, QueryRejection);

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        ApiError::Folio(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

/// Status code and `ErrorRes::kind` label for a core error kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::InvalidName => (StatusCode::BAD_REQUEST, "invalid_name"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ErrorKind::AlreadyExists => (StatusCode::CONFLICT, "already_exists"),
        ErrorKind::IoFailure => (StatusCode::INTERNAL_SERVER_ERROR, "io_failure"),
        ErrorKind::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "configuration"),
    }
}

/// `ErrorRes::kind` label for a request the handler never got to run.
fn rejection_kind(status: StatusCode) -> &'static str {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Folio(err) => {
                let (status, kind) = status_for(err.kind());
                if status.is_server_error() {
                    tracing::error!("request failed: {:?}", err);
                } else {
                    tracing::debug!("request rejected: {}", err);
                }
                let failed = err.failed_names().map(<[String]>::to_vec).unwrap_or_default();
                (
                    status,
                    ErrorRes {
                        error: err.to_string(),
                        kind: kind.into(),
                        failed,
                    },
                )
            }
            ApiError::Multipart(err) => (
                err.status(),
                ErrorRes {
                    error: err.body_text(),
                    kind: rejection_kind(err.status()).into(),
                    failed: Vec::new(),
                },
            ),
            ApiError::Rejected { status, message } => {
                tracing::debug!("request rejected ({}): {}", status, message);
                (
                    status,
                    ErrorRes {
                        error: message,
                        kind: rejection_kind(status).into(),
                        failed: Vec::new(),
                    },
                )
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorRes {
                    error: message,
                    kind: "bad_request".into(),
                    failed: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
