//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you want the REST server (with OpenAPI/Swagger UI)
//! without the workspace's `folio-run` wrapper.

use api_rest::{config::DEFAULT_REST_ADDR, ServerOptions};
use folio_core::{CoreConfig, LibraryService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Folio REST API server
///
/// # Environment Variables
/// - `FOLIO_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `FOLIO_UPLOAD_DIR`: Directory for uploaded files (default: "uploads")
/// - `FOLIO_PROGRESS_DIR`: Directory for progress records (default: "progress")
/// - `FOLIO_CORS_ORIGINS`: Comma-separated allowed origins, or `*`
/// - `FOLIO_MAX_UPLOAD_BYTES`: Largest accepted request body
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is rejected or the storage directories cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("folio_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("FOLIO_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::from_env_values(
        std::env::var("FOLIO_UPLOAD_DIR").ok(),
        std::env::var("FOLIO_PROGRESS_DIR").ok(),
    )?;
    let options = ServerOptions::from_env_values(
        std::env::var("FOLIO_CORS_ORIGINS").ok(),
        std::env::var("FOLIO_MAX_UPLOAD_BYTES").ok(),
    )?;

    tracing::info!("-- Starting Folio REST API on {}", addr);

    let library = LibraryService::new(&cfg)?;
    api_rest::serve(library, &options, &addr).await
}
