//! Folio File Storage
//!
//! This crate provides the byte-level storage for documents uploaded to Folio.
//!
//! ## Design Principles
//!
//! - Every stored file lives directly under one configured root directory
//! - File names are cleaned to a single path segment before they touch the filesystem
//! - Files are never overwritten implicitly; saving an existing name is an error
//! - Deleting an absent file succeeds
//! - The store knows nothing about reading progress; that lives in `folio-core`
//!
//! ## Storage Layout
//!
//! ```text
//! <upload_dir>/
//! ├── a.pdf
//! └── b.pdf
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use folio_files::BlobStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BlobStore::new(Path::new("uploads"))?;
//! let stored = store.save("notes.pdf", &b"%PDF-1.7"[..])?;
//! let bytes = store.load(stored.as_str())?;
//! # Ok(())
//! # }
//! ```

mod files;

pub use files::{detect_media_type, BlobStore, Entries};
pub use folio_types::{FileName, NameError};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory could not be created or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Name was empty or unsafe after cleaning, or resolved outside the root
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    /// No file is stored under this name
    #[error("File not found: {0}")]
    NotFound(String),

    /// A file is already stored under this name
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    /// One or more entries could not be removed during a bulk delete
    #[error("Failed to delete {} of {attempted} entries: {}", .failed.len(), .failed.join(", "))]
    BulkDelete {
        attempted: usize,
        failed: Vec<String>,
    },

    /// Writing failed and the partial file could not be removed either
    #[error(
        "write failed and cleanup also failed (path: {path}): write={write_error}; cleanup={cleanup_error}",
        path = .path.display()
    )]
    CleanupAfterWriteFailed {
        path: std::path::PathBuf,
        #[source]
        write_error: std::io::Error,
        cleanup_error: std::io::Error,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NameError> for FilesError {
    fn from(err: NameError) -> Self {
        FilesError::InvalidName(err.to_string())
    }
}
