use crate::progress::ProgressError;
use folio_files::FilesError;
use folio_types::NameError;

#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid file name: {0}")]
    InvalidName(#[from] NameError),
    #[error("file storage error: {0}")]
    Files(#[from] FilesError),
    #[error("progress index error: {0}")]
    Progress(#[from] ProgressError),
}

pub type FolioResult<T> = std::result::Result<T, FolioError>;

/// Coarse classification of a [`FolioError`].
///
/// Boundary layers (REST, CLI) map a kind to a response without inspecting error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The name was empty, malformed, or would resolve outside the storage root.
    InvalidName,
    /// The requested file is not stored.
    NotFound,
    /// A file with this name is already stored.
    AlreadyExists,
    /// The filesystem or the progress store failed, including partial bulk failures.
    IoFailure,
    /// Startup configuration was rejected.
    Configuration,
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::InvalidInput(_) => ErrorKind::Configuration,
            FolioError::InvalidName(_) => ErrorKind::InvalidName,
            FolioError::Files(err) => match err {
                FilesError::InvalidName(_) => ErrorKind::InvalidName,
                FilesError::NotFound(_) => ErrorKind::NotFound,
                FilesError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                FilesError::InvalidRootDirectory(_) => ErrorKind::Configuration,
                FilesError::BulkDelete { .. }
                | FilesError::CleanupAfterWriteFailed { .. }
                | FilesError::Io(_) => ErrorKind::IoFailure,
            },
            FolioError::Progress(_) => ErrorKind::IoFailure,
        }
    }

    /// Names that a bulk operation failed to remove, if this error came from one.
    pub fn failed_names(&self) -> Option<&[String]> {
        match self {
            FolioError::Files(FilesError::BulkDelete { failed, .. }) => Some(failed),
            FolioError::Progress(ProgressError::BulkDelete { failed }) => Some(failed),
            _ => None,
        }
    }
}
