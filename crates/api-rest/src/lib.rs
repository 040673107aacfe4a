//! # API REST
//!
//! REST API implementation for Folio.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (multipart parsing, status codes, CORS, body limits)
//!
//! Uses `api-shared` for wire types and `folio-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use folio_core::LibraryService;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::ServerOptions;
pub use error::ApiError;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub library: LibraryService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::upload_file,
        routes::put_file,
        routes::download_file,
        routes::get_progress,
        routes::set_progress,
        routes::list_files,
        routes::delete_file,
        routes::delete_all_files,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::UploadRes,
        api_shared::ListFilesRes,
        api_shared::MessageRes,
        api_shared::ErrorRes,
        api_shared::ProgressQuery,
        routes::UploadForm,
    ))
)]
pub struct ApiDoc;

/// Builds the complete REST router, including Swagger UI.
pub fn router(library: LibraryService, options: &ServerOptions) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/files", get(routes::list_files))
        .route("/api/files/upload", post(routes::upload_file))
        .route("/api/files/:file_name", put(routes::put_file))
        .route("/api/files/download/:file_name", get(routes::download_file))
        .route(
            "/api/files/progress/:file_name",
            get(routes::get_progress).post(routes::set_progress),
        )
        .route("/api/files/delete/:file_name", delete(routes::delete_file))
        .route("/api/files/delete-all", delete(routes::delete_all_files))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(options.cors_layer())
        .with_state(AppState { library })
}

/// Binds `addr` and serves the REST API until the server stops.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(
    library: LibraryService,
    options: &ServerOptions,
    addr: &str,
) -> anyhow::Result<()> {
    let app = router(library, options);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Folio REST API listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
