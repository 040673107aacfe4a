//! Request and response bodies for the Folio HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    /// Name the file was stored under, after cleaning. Use it for every later call.
    pub file_name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListFilesRes {
    pub files: Vec<String>,
}

/// Plain acknowledgement for mutations that return no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

/// Query string for `POST /api/files/progress/{file_name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProgressQuery {
    /// Last position the reader reached; must be zero or greater
    pub position: u64,
}

/// Error body returned by the `/api/files` handlers, including requests rejected before the
/// handler ran (bad path or query, oversized body). Unknown routes are not covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    /// One of `invalid_name`, `not_found`, `already_exists`, `io_failure`, `configuration`,
    /// `bad_request`, `payload_too_large`
    pub kind: String,
    /// Entries a bulk delete could not remove
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_res_omits_empty_failed() {
        let res = ErrorRes {
            error: "File not found: a.pdf".into(),
            kind: "not_found".into(),
            failed: vec![],
        };

        let json = serde_json::to_value(&res).unwrap();
        assert!(json.get("failed").is_none());

        let parsed: ErrorRes =
            serde_json::from_str(r#"{"error":"x","kind":"io_failure"}"#).unwrap();
        assert!(parsed.failed.is_empty());
    }

    #[test]
    fn test_progress_query_rejects_negative_positions() {
        assert!(serde_json::from_str::<ProgressQuery>(r#"{"position":-1}"#).is_err());
        assert_eq!(
            serde_json::from_str::<ProgressQuery>(r#"{"position":12}"#)
                .unwrap()
                .position,
            12
        );
    }
}
