//! # Folio Core
//!
//! Core logic for storing uploaded documents and remembering how far a reader got in each.
//!
//! This crate contains:
//! - [`LibraryService`]: the facade used by every front end
//! - [`progress`]: the reading-progress index and its storage engines
//! - [`CoreConfig`]: configuration resolved once at startup
//!
//! Raw byte storage lives in the `folio_files` crate.
//!
//! **No API concerns**: HTTP servers, request parsing and status codes belong in `api-rest`
//! and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod library;
pub mod progress;

pub use config::CoreConfig;
pub use constants::{DEFAULT_LAST_READ_POSITION, DEFAULT_UPLOAD_FILENAME};
pub use error::{ErrorKind, FolioError, FolioResult};
pub use folio_files::detect_media_type;
pub use folio_types::FileName;
pub use library::{FileInfo, LibraryService};
