//! Library service: uploaded documents plus their reading progress.
//!
//! [`LibraryService`] is the only type that references both the [`BlobStore`] and the
//! [`ProgressIndex`]. It delegates byte I/O to the former and progress bookkeeping to the latter,
//! and it is responsible for removing a file's progress record when the file is deleted.
//!
//! ## Delete ordering
//!
//! Deletes run the blob step first and the progress step second, strictly in sequence:
//!
//! - If the blob step fails, the progress step is not attempted and the error is returned.
//! - If the progress step fails, the error is returned but the file is already gone. This
//!   leaves an orphaned record, which is a recoverable state: the next upload under the same
//!   name simply resumes from the stale position until it is overwritten.
//!
//! Nothing here is transactional, and concurrent `delete_file`/`upload` calls on the same name
//! may interleave.

use crate::config::CoreConfig;
use crate::progress::{ProgressIndex, YamlProgressStore};
use crate::FolioResult;
use folio_files::{detect_media_type, BlobStore};
use folio_types::FileName;
use serde::Serialize;
use std::io::Read;
use std::sync::Arc;

/// Summary of one stored file, as shown by `info` style queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: u64,
    /// Sniffed from the content; `None` when unrecognised
    pub media_type: Option<String>,
    pub last_read_position: u64,
}

/// Name-keyed facade over document storage and reading progress.
#[derive(Clone, Debug)]
pub struct LibraryService {
    blobs: Arc<BlobStore>,
    progress: ProgressIndex,
}

impl LibraryService {
    /// Opens the file store and the YAML progress store described by `cfg`.
    ///
    /// Both directories are created if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created or canonicalised.
    pub fn new(cfg: &CoreConfig) -> FolioResult<Self> {
        let blobs = BlobStore::new(cfg.upload_dir())?;
        let progress = YamlProgressStore::new(cfg.progress_dir())?;

        tracing::info!(
            "library opened (files: {}, progress: {})",
            blobs.root_directory().display(),
            progress.directory().display()
        );

        Ok(Self::with_parts(
            blobs,
            ProgressIndex::new(Arc::new(progress)),
        ))
    }

    /// Builds a service from an existing store and index, e.g. with an in-memory progress store.
    pub fn with_parts(blobs: BlobStore, progress: ProgressIndex) -> Self {
        Self {
            blobs: Arc::new(blobs),
            progress,
        }
    }

    /// Stores `content` under `name`. No progress record is created.
    ///
    /// # Returns
    ///
    /// The cleaned name the file was stored under.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `AlreadyExists` or `IoFailure` (see [`crate::ErrorKind`]).
    pub fn upload<R: Read>(&self, name: &str, content: R) -> FolioResult<FileName> {
        let stored = self.blobs.save(name, content)?;
        tracing::info!("stored file {}", stored);
        Ok(stored)
    }

    /// Returns the full content of the file stored under `name`.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound` or `IoFailure`.
    pub fn download(&self, name: &str) -> FolioResult<Vec<u8>> {
        let bytes = self.blobs.load(name)?;
        tracing::debug!("read file {} ({} bytes)", name, bytes.len());
        Ok(bytes)
    }

    /// Returns the last read position for `name`, or the default when none was recorded.
    ///
    /// # Errors
    ///
    /// `InvalidName` for unsafe names, `IoFailure` if the progress store fails.
    pub fn get_progress(&self, name: &str) -> FolioResult<u64> {
        let name = FileName::clean(name)?;
        Ok(self.progress.get(name.as_str())?)
    }

    /// Records `position` as the last read position for `name`.
    ///
    /// The file does not need to exist.
    ///
    /// # Errors
    ///
    /// `InvalidName` for unsafe names, `IoFailure` if the progress store fails.
    pub fn set_progress(&self, name: &str, position: u64) -> FolioResult<()> {
        let name = FileName::clean(name)?;
        self.progress.upsert(name.as_str(), position)?;
        tracing::debug!("progress for {} set to {}", name, position);
        Ok(())
    }

    /// Lists the names of all stored files, sorted.
    pub fn list_files(&self) -> FolioResult<Vec<String>> {
        Ok(self.blobs.list_names()?)
    }

    /// Returns size, media type and progress for the file stored under `name`.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound` or `IoFailure`.
    pub fn file_info(&self, name: &str) -> FolioResult<FileInfo> {
        let name = FileName::clean(name)?;
        let size_bytes = self.blobs.size_of(name.as_str())?;
        let media_type = self.blobs.media_type_of(name.as_str())?;
        let last_read_position = self.progress.get(name.as_str())?;

        Ok(FileInfo {
            name: name.into_string(),
            size_bytes,
            media_type: media_type.map(str::to_string),
            last_read_position,
        })
    }

    /// Returns the content of the file stored under `name` together with its [`FileInfo`].
    ///
    /// The info carries the cleaned name, so callers can echo it back instead of the raw input.
    ///
    /// # Errors
    ///
    /// `InvalidName`, `NotFound` or `IoFailure`.
    pub fn download_document(&self, name: &str) -> FolioResult<(FileInfo, Vec<u8>)> {
        let name = FileName::clean(name)?;
        let bytes = self.blobs.load(name.as_str())?;
        let last_read_position = self.progress.get(name.as_str())?;

        tracing::debug!("read file {} ({} bytes)", name, bytes.len());

        let info = FileInfo {
            name: name.into_string(),
            size_bytes: bytes.len() as u64,
            media_type: detect_media_type(&bytes).map(str::to_string),
            last_read_position,
        };
        Ok((info, bytes))
    }

    /// Deletes the file stored under `name`, then its progress record.
    ///
    /// Succeeds when neither exists, and returns the cleaned name that was addressed.
    ///
    /// # Errors
    ///
    /// Returns the blob error without touching the progress record, or the progress error after
    /// the file has already been removed.
    pub fn delete_file(&self, name: &str) -> FolioResult<FileName> {
        let name = FileName::clean(name)?;

        let removed = self.blobs.delete(name.as_str())?;

        if let Err(e) = self.progress.delete_by_name(name.as_str()) {
            tracing::warn!(
                "file {} deleted but its progress record was not: {}",
                name,
                e
            );
            return Err(e.into());
        }

        tracing::info!("deleted file {} (present: {})", name, removed);
        Ok(name)
    }

    /// Deletes every stored file, then every progress record.
    ///
    /// File deletion is best-effort across entries; if any entry fails, the progress records are
    /// left untouched and the aggregate error is returned.
    pub fn delete_all_files(&self) -> FolioResult<()> {
        let deleted = self.blobs.delete_all()?;

        if let Err(e) = self.progress.delete_all() {
            tracing::warn!(
                "{} files deleted but progress records were not cleared: {}",
                deleted,
                e
            );
            return Err(e.into());
        }

        tracing::info!("deleted all files ({}) and progress records", deleted);
        Ok(())
    }
}
