//! Flat-directory blob store implementation
//!
//! This module provides the [`BlobStore`] type, which owns one root directory and performs all
//! byte-level operations for uploaded documents: save, load, list and delete.
//!
//! # Path Safety
//!
//! Every operation that takes a name runs it through the same resolution before touching the
//! filesystem:
//!
//! 1. The raw name is cleaned with [`FileName::clean`] (separators and `.` segments stripped,
//!    `..` and nested paths rejected).
//! 2. The single remaining segment is joined onto the canonical root.
//! 3. The joined path must have the root as its direct parent.
//!
//! Reads additionally canonicalise the resolved path, so a symlink placed in the root cannot be
//! used to read a file that lives elsewhere.
//!
//! # Overwrite Policy
//!
//! Saves open the target with create-new semantics. An existing name is reported as
//! [`FilesError::AlreadyExists`] and its content is left untouched. If the incoming stream fails
//! part way, the partial file is removed before the error is returned.
//!
//! # Bulk Deletion
//!
//! [`BlobStore::delete_all`] is best-effort: it attempts every entry, collects the names that
//! could not be removed, and reports them together as [`FilesError::BulkDelete`].

use crate::FilesError;
use folio_types::FileName;
use std::fs;
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Prefix length read when sniffing a stored file's media type.
const MEDIA_SNIFF_BYTES: u64 = 8 * 1024;

/// Service for storing document bytes under a single root directory
///
/// The store is stateless apart from the root path. It is cheap to share behind an `Arc` and
/// performs no locking of its own: distinct names never contend with each other, and per-file
/// atomicity comes from the filesystem (create-new on save, unlink on delete).
#[derive(Debug)]
pub struct BlobStore {
    /// Canonicalised root directory holding every stored file
    root_directory: PathBuf,
}

impl BlobStore {
    /// Creates a `BlobStore` rooted at `root_directory`
    ///
    /// The directory is created, including any missing parents, if it does not exist yet.
    /// The stored root is canonicalised so that later containment checks compare like with like.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if:
    /// - the path exists but is not a directory
    /// - the directory cannot be created
    /// - path canonicalisation fails
    pub fn new(root_directory: &Path) -> Result<Self, FilesError> {
        if root_directory.exists() && !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        fs::create_dir_all(root_directory).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    /// Returns the canonicalised root directory
    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Saves the content of `reader` as a new file called `name`
    ///
    /// # Returns
    ///
    /// The cleaned name the content was stored under. Callers should use this name, not the raw
    /// input, for any later operation.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the name is empty or unsafe after cleaning (`InvalidName`)
    /// - a file with the cleaned name already exists (`AlreadyExists`)
    /// - creating or writing the file fails (`Io`)
    /// - writing fails and the partial file cannot be removed (`CleanupAfterWriteFailed`)
    pub fn save<R: Read>(&self, name: &str, mut reader: R) -> Result<FileName, FilesError> {
        let (name, path) = self.resolve(name)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FilesError::AlreadyExists(name.into_string()));
            }
            Err(e) => {
                return Err(with_context(
                    e,
                    format!("Failed to create file {}", path.display()),
                ));
            }
        };

        let written = io::copy(&mut reader, &mut file)
            .and_then(|_| file.flush())
            .and_then(|()| file.sync_all());

        if let Err(write_error) = written {
            drop(file);
            return match fs::remove_file(&path) {
                Ok(()) => Err(with_context(
                    write_error,
                    format!("Failed to write file {}", path.display()),
                )),
                Err(cleanup_error) => Err(FilesError::CleanupAfterWriteFailed {
                    path,
                    write_error,
                    cleanup_error,
                }),
            };
        }

        Ok(name)
    }

    /// Reads the whole file stored under `name` into memory
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the name is unsafe, or resolves (directly or via a symlink) outside the root (`InvalidName`)
    /// - no file is stored under the name (`NotFound`)
    /// - the file cannot be read (`Io`)
    pub fn load(&self, name: &str) -> Result<Vec<u8>, FilesError> {
        let (name, path) = self.resolve(name)?;
        self.ensure_target_within_root(&name, &path)?;

        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FilesError::NotFound(name.into_string()),
            _ => with_context(e, format!("Failed to read file {}", path.display())),
        })
    }

    /// Returns the size in bytes of the file stored under `name`
    ///
    /// # Errors
    ///
    /// Same conditions as [`BlobStore::load`].
    pub fn size_of(&self, name: &str) -> Result<u64, FilesError> {
        let (name, path) = self.resolve(name)?;
        self.ensure_target_within_root(&name, &path)?;

        fs::metadata(&path)
            .map(|metadata| metadata.len())
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FilesError::NotFound(name.into_string()),
                _ => with_context(e, format!("Failed to stat file {}", path.display())),
            })
    }

    /// Sniffs the media type of the file stored under `name` from its first bytes
    ///
    /// Only a short prefix is read. Returns `None` when the content is not recognised.
    ///
    /// # Errors
    ///
    /// Same conditions as [`BlobStore::load`].
    pub fn media_type_of(&self, name: &str) -> Result<Option<&'static str>, FilesError> {
        let (name, path) = self.resolve(name)?;
        self.ensure_target_within_root(&name, &path)?;

        let file = fs::File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FilesError::NotFound(name.as_str().to_string()),
            _ => with_context(e, format!("Failed to open file {}", path.display())),
        })?;

        let mut head = Vec::with_capacity(MEDIA_SNIFF_BYTES as usize);
        file.take(MEDIA_SNIFF_BYTES)
            .read_to_end(&mut head)
            .map_err(|e| with_context(e, format!("Failed to read file {}", path.display())))?;

        Ok(detect_media_type(&head))
    }

    /// Returns whether an entry is stored under `name`
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidName` if the name is unsafe, or `FilesError::Io` if the
    /// existence check itself fails.
    pub fn contains(&self, name: &str) -> Result<bool, FilesError> {
        let (_, path) = self.resolve(name)?;
        match fs::symlink_metadata(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(with_context(
                e,
                format!("Failed to stat file {}", path.display()),
            )),
        }
    }

    /// Lazily enumerates the base names of the entries directly under the root
    ///
    /// Every call re-scans the directory. Entries are yielded in filesystem order.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the root cannot be opened. Errors reading an individual
    /// entry are yielded by the iterator.
    pub fn list(&self) -> Result<Entries, FilesError> {
        Ok(Entries {
            inner: self.read_root()?,
        })
    }

    /// Collects [`BlobStore::list`] into a sorted vector
    ///
    /// # Errors
    ///
    /// Returns the first error encountered while listing.
    pub fn list_names(&self) -> Result<Vec<String>, FilesError> {
        let mut names = self.list()?.collect::<Result<Vec<_>, _>>()?;
        names.sort();
        Ok(names)
    }

    /// Removes the entry stored under `name`, if any
    ///
    /// Deleting a name that is not stored succeeds.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed, `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidName` for unsafe names and `FilesError::Io` when an existing
    /// entry cannot be removed.
    pub fn delete(&self, name: &str) -> Result<bool, FilesError> {
        let (_, path) = self.resolve(name)?;

        match remove_entry(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(with_context(
                e,
                format!("Failed to delete {}", path.display()),
            )),
        }
    }

    /// Removes every entry currently listed under the root
    ///
    /// Deletion continues past individual failures. Entries that vanish between listing and
    /// removal count as deleted.
    ///
    /// # Returns
    ///
    /// The number of entries that were listed and are now gone.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the root cannot be listed, or `FilesError::BulkDelete`
    /// naming every entry that could not be read or removed.
    pub fn delete_all(&self) -> Result<usize, FilesError> {
        let mut paths = Vec::new();
        let mut failed = Vec::new();

        // Removal works on the entry's own path; names are only rendered for the failure report.
        for entry in self.read_root()? {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => failed.push(format!("<unreadable entry: {}>", e)),
            }
        }

        let attempted = paths.len() + failed.len();
        let mut deleted = 0;

        for path in paths {
            match remove_entry(&path) {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => deleted += 1,
                Err(_) => failed.push(display_name(&path)),
            }
        }

        if failed.is_empty() {
            Ok(deleted)
        } else {
            Err(FilesError::BulkDelete { attempted, failed })
        }
    }

    fn read_root(&self) -> Result<fs::ReadDir, FilesError> {
        fs::read_dir(&self.root_directory).map_err(|e| {
            with_context(
                e,
                format!(
                    "Failed to read directory {}",
                    self.root_directory.display()
                ),
            )
        })
    }

    /// Cleans `raw` and resolves it to a path directly under the root
    ///
    /// This is a purely lexical check and performs no I/O.
    fn resolve(&self, raw: &str) -> Result<(FileName, PathBuf), FilesError> {
        let name = FileName::clean(raw)?;
        let path = self.root_directory.join(name.as_str());

        // The joined path must sit directly under the root, whatever the platform makes of
        // prefixes such as `C:` in the segment.
        if path.parent() != Some(self.root_directory.as_path())
            || !path.starts_with(&self.root_directory)
        {
            return Err(FilesError::InvalidName(format!(
                "{} resolves outside the storage root",
                raw
            )));
        }

        Ok((name, path))
    }

    /// Verifies that following `path` (including any symlink) stays inside the root
    ///
    /// A path that does not exist passes; the caller's own I/O reports `NotFound`.
    fn ensure_target_within_root(&self, name: &FileName, path: &Path) -> Result<(), FilesError> {
        match path.canonicalize() {
            Ok(target) if target.starts_with(&self.root_directory) => Ok(()),
            Ok(_) => Err(FilesError::InvalidName(format!(
                "{} resolves outside the storage root",
                name
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(with_context(
                e,
                format!("Failed to resolve {}", path.display()),
            )),
        }
    }
}

/// Iterator over the base names of the entries in a [`BlobStore`] root
///
/// Returned by [`BlobStore::list`]. Non-UTF-8 names are converted lossily.
#[derive(Debug)]
pub struct Entries {
    inner: fs::ReadDir,
}

impl Iterator for Entries {
    type Item = Result<String, FilesError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| {
            entry
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .map_err(|e| with_context(e, "Failed to read directory entry".into()))
        })
    }
}

/// Detects the media type of `bytes` from their magic number
///
/// This is a best-effort detection and should not be considered authoritative.
#[must_use]
pub fn detect_media_type(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

/// Base name of `path` for reports, converted lossily
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Removes a file or symlink, or an empty directory left in the root by something else
fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

fn with_context(e: io::Error, message: String) -> FilesError {
    FilesError::Io(io::Error::new(e.kind(), format!("{}: {}", message, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to create a store rooted at `<temp>/uploads`
    fn create_test_store(temp: &TempDir) -> BlobStore {
        BlobStore::new(&temp.path().join("uploads")).expect("Failed to create store")
    }

    /// Reader that yields some bytes and then fails
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(ErrorKind::BrokenPipe, "client went away"));
            }
            self.sent = true;
            let chunk = b"partial";
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_new_creates_missing_root_with_parents() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("deep").join("nested").join("uploads");

        let store = BlobStore::new(&root).unwrap();

        assert!(root.is_dir());
        assert!(store.root_directory().is_absolute());
        assert!(store.root_directory().ends_with("uploads"));
    }

    #[test]
    fn test_new_root_not_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        fs::write(&root, "not a directory").unwrap();

        let store = BlobStore::new(&root);

        assert!(matches!(store, Err(FilesError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        let test_cases = vec![
            ("text.txt", b"Plain text content".to_vec()),
            ("empty.dat", vec![]),
            ("binary.bin", (0..=255).collect::<Vec<u8>>()),
        ];

        for (filename, content) in test_cases {
            let stored = store.save(filename, content.as_slice()).unwrap();
            assert_eq!(stored.as_str(), filename);

            let retrieved = store.load(filename).unwrap();
            assert_eq!(retrieved, content, "Round-trip failed for {}", filename);
        }
    }

    #[test]
    fn test_save_returns_cleaned_name() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        let stored = store.save("/./book.pdf", &b"pdf"[..]).unwrap();

        assert_eq!(stored.as_str(), "book.pdf");
        assert!(store.root_directory().join("book.pdf").is_file());
    }

    #[test]
    fn test_save_existing_name_fails_and_keeps_content() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.save("book.pdf", &b"original"[..]).unwrap();
        let result = store.save("book.pdf", &b"replacement"[..]);

        assert!(matches!(result, Err(FilesError::AlreadyExists(ref n)) if n == "book.pdf"));
        assert_eq!(store.load("book.pdf").unwrap(), b"original");
    }

    #[test]
    fn test_save_traversal_is_rejected_and_nothing_written() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        for name in ["../secret", "../../etc/passwd", "..\\secret", "a/../../b"] {
            let result = store.save(name, &b"leak"[..]);
            assert!(
                matches!(result, Err(FilesError::InvalidName(_))),
                "{} was accepted",
                name
            );
        }

        assert!(!temp.path().join("secret").exists());
        assert!(!temp.path().join("b").exists());
        assert!(store.list_names().unwrap().is_empty());
    }

    #[test]
    fn test_save_empty_or_nested_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        assert!(matches!(
            store.save("", &b""[..]),
            Err(FilesError::InvalidName(_))
        ));
        assert!(matches!(
            store.save("/", &b""[..]),
            Err(FilesError::InvalidName(_))
        ));
        assert!(matches!(
            store.save("dir/file.pdf", &b""[..]),
            Err(FilesError::InvalidName(_))
        ));
    }

    #[test]
    fn test_save_failed_stream_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        let result = store.save("broken.pdf", FailingReader { sent: false });

        assert!(matches!(result, Err(FilesError::Io(ref e)) if e.kind() == ErrorKind::BrokenPipe));
        assert!(!store.contains("broken.pdf").unwrap());
    }

    #[test]
    fn test_load_not_found() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        let result = store.load("missing.pdf");

        assert!(matches!(result, Err(FilesError::NotFound(ref n)) if n == "missing.pdf"));
    }

    #[test]
    fn test_load_traversal_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("outside.txt"), "secret").unwrap();
        let store = create_test_store(&temp);

        let result = store.load("../outside.txt");

        assert!(matches!(result, Err(FilesError::InvalidName(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_symlink_escaping_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, "secret").unwrap();
        let store = create_test_store(&temp);
        std::os::unix::fs::symlink(&outside, store.root_directory().join("link.txt")).unwrap();

        let result = store.load("link.txt");

        assert!(matches!(result, Err(FilesError::InvalidName(_))));
    }

    #[test]
    fn test_media_type_of() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.save("book.pdf", &b"%PDF-1.7\n%rest of document"[..]).unwrap();
        store.save("notes.txt", &b"plain words"[..]).unwrap();

        assert_eq!(store.media_type_of("book.pdf").unwrap(), Some("application/pdf"));
        assert_eq!(store.media_type_of("notes.txt").unwrap(), None);
        assert!(matches!(
            store.media_type_of("missing.pdf"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn test_size_of_and_contains() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.save("a.pdf", &b"12345"[..]).unwrap();

        assert_eq!(store.size_of("a.pdf").unwrap(), 5);
        assert!(store.contains("a.pdf").unwrap());
        assert!(!store.contains("b.pdf").unwrap());
        assert!(matches!(
            store.size_of("b.pdf"),
            Err(FilesError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_returns_base_names_and_rescans() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        assert!(store.list().unwrap().next().is_none());

        store.save("b.pdf", &b"b"[..]).unwrap();
        store.save("a.pdf", &b"a"[..]).unwrap();

        assert_eq!(store.list_names().unwrap(), vec!["a.pdf", "b.pdf"]);

        store.delete("a.pdf").unwrap();

        let mut names: Vec<String> = store.list().unwrap().map(Result::unwrap).collect();
        names.sort();
        assert_eq!(names, vec!["b.pdf"]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.save("a.pdf", &b"a"[..]).unwrap();

        assert!(store.delete("a.pdf").unwrap());
        assert!(!store.delete("a.pdf").unwrap());
        assert!(!store.delete("never-existed.pdf").unwrap());
        assert!(matches!(store.load("a.pdf"), Err(FilesError::NotFound(_))));
    }

    #[test]
    fn test_delete_traversal_is_rejected() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("keep.txt");
        fs::write(&outside, "keep").unwrap();
        let store = create_test_store(&temp);

        let result = store.delete("../keep.txt");

        assert!(matches!(result, Err(FilesError::InvalidName(_))));
        assert!(outside.exists());
    }

    #[test]
    fn test_delete_undeletable_entry_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);
        let nested = store.root_directory().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner.txt"), "x").unwrap();

        let result = store.delete("nested");

        assert!(matches!(result, Err(FilesError::Io(_))));
        assert!(nested.exists());
    }

    #[test]
    fn test_delete_all_removes_everything() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            store.save(name, name.as_bytes()).unwrap();
        }

        assert_eq!(store.delete_all().unwrap(), 3);
        assert!(store.list_names().unwrap().is_empty());
        assert_eq!(store.delete_all().unwrap(), 0);
    }

    #[test]
    fn test_delete_all_continues_past_failures() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);

        store.save("a.pdf", &b"a"[..]).unwrap();
        store.save("b.pdf", &b"b"[..]).unwrap();
        let nested = store.root_directory().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner.txt"), "x").unwrap();

        let result = store.delete_all();

        match result {
            Err(FilesError::BulkDelete { attempted, failed }) => {
                assert_eq!(attempted, 3);
                assert_eq!(failed, vec!["nested".to_string()]);
            }
            other => panic!("expected BulkDelete, got {:?}", other),
        }
        assert_eq!(store.list_names().unwrap(), vec!["nested"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_all_removes_non_utf8_entries() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);
        let odd = store
            .root_directory()
            .join(OsStr::from_bytes(b"bad\xff.pdf"));
        fs::write(&odd, "x").unwrap();
        store.save("good.pdf", &b"g"[..]).unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(!odd.exists());
        assert!(store.list_names().unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_removes_empty_directories() {
        let temp = TempDir::new().unwrap();
        let store = create_test_store(&temp);
        fs::create_dir(store.root_directory().join("empty")).unwrap();

        assert_eq!(store.delete_all().unwrap(), 1);
        assert!(store.list_names().unwrap().is_empty());
    }

    #[test]
    fn test_detect_media_type() {
        assert_eq!(detect_media_type(b"%PDF-1.7\n"), Some("application/pdf"));
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_media_type(&png_header), Some("image/png"));
        assert_eq!(detect_media_type(b"just text"), None);
    }
}
