//! File-backed progress store.
//!
//! Each record is a small YAML document in the progress directory:
//!
//! ```text
//! <progress_dir>/
//! └── 3f0a…e91c.yaml   # hex(sha256(file_name))
//! ```
//!
//! Keying documents by a digest of the file name keeps every name, whatever characters it
//! contains, mapped to a fixed-length safe path. Writes go to a temporary file in the same
//! directory and are renamed over the target, so readers see either the old record or the new
//! one. Records for different names live in different files and never contend.

use super::{ProgressError, ProgressRecord, ProgressResult, ProgressStore};
use crate::constants::PROGRESS_RECORD_EXTENSION;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct YamlProgressStore {
    directory: PathBuf,
}

impl YamlProgressStore {
    /// Opens the store at `directory`, creating it (with parents) if needed.
    pub fn new(directory: &Path) -> ProgressResult<Self> {
        fs::create_dir_all(directory).map_err(ProgressError::StorageDirCreation)?;
        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn record_path(&self, file_name: &str) -> PathBuf {
        let digest = Sha256::digest(file_name.as_bytes());
        self.directory.join(format!(
            "{}.{}",
            hex::encode(digest),
            PROGRESS_RECORD_EXTENSION
        ))
    }
}

impl ProgressStore for YamlProgressStore {
    fn find(&self, file_name: &str) -> ProgressResult<Option<ProgressRecord>> {
        let path = self.record_path(file_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ProgressError::FileRead(e)),
        };

        let record: ProgressRecord =
            serde_yaml::from_str(&contents).map_err(ProgressError::YamlDeserialization)?;

        if record.file_name != file_name {
            tracing::warn!(
                "progress record {} belongs to {:?}, not {:?}; ignoring",
                path.display(),
                record.file_name,
                file_name
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    fn save(&self, record: &ProgressRecord) -> ProgressResult<()> {
        let yaml = serde_yaml::to_string(record).map_err(ProgressError::YamlSerialization)?;

        let mut staged =
            tempfile::NamedTempFile::new_in(&self.directory).map_err(ProgressError::FileWrite)?;
        staged
            .write_all(yaml.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(ProgressError::FileWrite)?;
        staged
            .persist(self.record_path(&record.file_name))
            .map_err(|e| ProgressError::FileWrite(e.error))?;

        Ok(())
    }

    fn delete_by_name(&self, file_name: &str) -> ProgressResult<()> {
        match fs::remove_file(self.record_path(file_name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProgressError::FileDelete(e)),
        }
    }

    fn delete_all(&self) -> ProgressResult<()> {
        let mut failed = Vec::new();

        for entry in fs::read_dir(&self.directory).map_err(ProgressError::FileRead)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    failed.push(format!("<unreadable entry: {}>", e));
                    continue;
                }
            };

            let is_record = path
                .extension()
                .is_some_and(|ext| ext == PROGRESS_RECORD_EXTENSION);
            if !is_record {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("failed to delete progress record {}: {}", path.display(), e);
                    failed.push(path.display().to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ProgressError::BulkDelete { failed })
        }
    }
}
