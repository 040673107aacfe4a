//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read environment variables themselves; the
//! binaries read them and hand the raw values to the helpers here.

use crate::constants::{DEFAULT_PROGRESS_DIR, DEFAULT_UPLOAD_DIR};
use crate::{FolioError, FolioResult};
use std::path::{Component, Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    upload_dir: PathBuf,
    progress_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// Neither directory needs to exist yet; the services create them.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidInput` if either path is empty, or if the progress directory
    /// lies inside the upload directory (its records would show up as uploaded files).
    pub fn new(upload_dir: PathBuf, progress_dir: PathBuf) -> FolioResult<Self> {
        if upload_dir.as_os_str().is_empty() {
            return Err(FolioError::InvalidInput(
                "upload directory cannot be empty".into(),
            ));
        }
        if progress_dir.as_os_str().is_empty() {
            return Err(FolioError::InvalidInput(
                "progress directory cannot be empty".into(),
            ));
        }

        let upload_abs = absolute_normalised(&upload_dir)?;
        let progress_abs = absolute_normalised(&progress_dir)?;
        if progress_abs.starts_with(&upload_abs) {
            return Err(FolioError::InvalidInput(format!(
                "progress directory {} must not be inside the upload directory {}",
                progress_dir.display(),
                upload_dir.display()
            )));
        }

        Ok(Self {
            upload_dir,
            progress_dir,
        })
    }

    /// Build a `CoreConfig` from optional raw values, falling back to the defaults.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_env_values(
        upload_dir: Option<String>,
        progress_dir: Option<String>,
    ) -> FolioResult<Self> {
        fn or_default(value: Option<String>, default: &str) -> PathBuf {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        }

        Self::new(
            or_default(upload_dir, DEFAULT_UPLOAD_DIR),
            or_default(progress_dir, DEFAULT_PROGRESS_DIR),
        )
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn progress_dir(&self) -> &Path {
        &self.progress_dir
    }
}

/// Make `path` absolute against the working directory and fold away `.` and `..` lexically.
fn absolute_normalised(path: &Path) -> FolioResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| {
        FolioError::InvalidInput(format!("cannot resolve {}: {}", path.display(), e))
    })?;

    let mut normalised = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalised.pop();
            }
            other => normalised.push(other.as_os_str()),
        }
    }
    Ok(normalised)
}
