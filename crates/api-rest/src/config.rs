//! HTTP server options.
//!
//! Like `folio_core::config`, these are resolved from raw environment values once in `main`
//! and then passed into [`crate::router`].

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Default REST bind address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Origins of the development reader clients.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Largest request body accepted by the upload endpoints.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Options for the REST router that are not part of the core configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerOptions {
    /// Allowed CORS origins; a single `*` allows any origin
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerOptions {
    /// Build options from optional raw values, falling back to the defaults.
    ///
    /// `cors_origins` is a comma-separated list. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_upload_bytes` is set but is not a positive integer.
    pub fn from_env_values(
        cors_origins: Option<String>,
        max_upload_bytes: Option<String>,
    ) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let cors_origins = cors_origins
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        let max_upload_bytes = match max_upload_bytes
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            Some(value) => {
                let parsed: usize = value.parse().map_err(|e| {
                    anyhow::anyhow!("FOLIO_MAX_UPLOAD_BYTES must be a positive integer: {}", e)
                })?;
                if parsed == 0 {
                    anyhow::bail!("FOLIO_MAX_UPLOAD_BYTES must be greater than zero");
                }
                parsed
            }
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            cors_origins,
            max_upload_bytes,
        })
    }

    /// Builds the CORS layer for these options.
    ///
    /// Origins that are not valid header values are skipped with a warning.
    pub fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.iter().any(|origin| origin == "*") {
            return CorsLayer::permissive();
        }

        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    }
}
