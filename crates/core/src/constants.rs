//! Constants used throughout the Folio core crate.
//!
//! This module contains the default paths and values shared by the services and the binaries,
//! so that the CLI and the REST server agree on them.

/// Default directory for uploaded documents when no explicit directory is configured.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default directory for progress records when no explicit directory is configured.
pub const DEFAULT_PROGRESS_DIR: &str = "progress";

/// Position reported for a file that has no progress record yet.
///
/// Readers number pages from one, so a fresh document opens on its first page.
pub const DEFAULT_LAST_READ_POSITION: u64 = 1;

/// File extension for persisted progress records.
pub const PROGRESS_RECORD_EXTENSION: &str = "yaml";

/// Name used for an upload whose client supplied no file name.
pub const DEFAULT_UPLOAD_FILENAME: &str = "default_filename";
