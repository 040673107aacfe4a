use api_rest::{config::DEFAULT_REST_ADDR, ServerOptions};
use folio_core::{CoreConfig, LibraryService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Folio application
///
/// Opens the document library and serves it over the REST API. The REST server provides open
/// access to file and progress operations, plus Swagger UI at `/swagger-ui`.
///
/// # Environment Variables
/// - `FOLIO_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `FOLIO_UPLOAD_DIR`: Directory for uploaded files (default: "uploads")
/// - `FOLIO_PROGRESS_DIR`: Directory for progress records (default: "progress")
/// - `FOLIO_CORS_ORIGINS`: Comma-separated allowed origins, or `*`
/// - `FOLIO_MAX_UPLOAD_BYTES`: Largest accepted request body
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("folio_run=info".parse()?)
                .add_directive("folio_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("FOLIO_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::from_env_values(
        std::env::var("FOLIO_UPLOAD_DIR").ok(),
        std::env::var("FOLIO_PROGRESS_DIR").ok(),
    )?;
    let options = ServerOptions::from_env_values(
        std::env::var("FOLIO_CORS_ORIGINS").ok(),
        std::env::var("FOLIO_MAX_UPLOAD_BYTES").ok(),
    )?;

    let library = LibraryService::new(&cfg)?;
    let stored = library.list_files()?.len();

    tracing::info!("++ Starting Folio REST on {} ({} files stored)", rest_addr, stored);

    api_rest::serve(library, &options, &rest_addr).await
}
