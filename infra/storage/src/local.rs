//! Local filesystem adapter: direct, blocking disk I/O below a base path.
//!
//! Writes use an atomic swap (unique temp file + `fsync` + `rename`) so that a target is
//! never observed half-written. Existence checks always hit the filesystem.

use crate::adapter::{Adapter, AdapterKind};
use crate::builder::LocalAdapterBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::TMP_MARKER;
use crate::security;
use crate::types::{DirOptions, ImageSize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// An [`Adapter`] storing each file as a regular file under its root.
///
/// # Example
///
/// ```rust
/// use depot_storage::{Adapter, LocalAdapter, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let adapter = LocalAdapter::builder().root(tmp.path().join("uploads")).build()?;
///
/// let path = adapter.write("avatars/me.txt", b"hello")?;
/// assert_eq!(path, adapter.root().join("avatars/me.txt"));
/// assert_eq!(adapter.read("/avatars/me.txt")?, b"hello");
/// assert!(adapter.delete("avatars/me.txt")?);
/// assert!(!adapter.exists("avatars/me.txt")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LocalAdapter {
    pub(crate) root: PathBuf,
    pub(crate) dir_mode: u32,
    pub(crate) tmp_counter: AtomicU64,
}

impl LocalAdapter {
    #[must_use = "The adapter is not created until you call .build()"]
    pub fn builder() -> LocalAdapterBuilder {
        LocalAdapterBuilder::new()
    }

    fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<(), StorageError> {
        let temp = unique_tmp_path(target, &self.tmp_counter);

        let written = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp)
            .context(format!("Temp creation failed: {}", temp.display()))
            .and_then(|mut file| {
                file.write_all(data).context("Write failed")?;
                file.sync_all().context("Hardware sync failed")
            });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        if let Err(err) = fs::rename(&temp, target) {
            if err.kind() != io::ErrorKind::AlreadyExists {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
            fs::remove_file(target)
                .context(format!("Failed to replace existing file: {}", target.display()))?;
            fs::rename(&temp, target).context(format!(
                "Atomic swap failed: {} -> {}",
                temp.display(),
                target.display()
            ))?;
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }
        Ok(())
    }
}

impl Adapter for LocalAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Local
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let resolved = security::resolve_entry(&self.root, filename)?;

        if let Some(parent) = resolved.parent().filter(|p| !p.is_dir()) {
            create_dirs(parent, self.dir_mode)
                .context(format!("Failed to create parent of {}", resolved.display()))?;
        }

        self.write_atomic(&resolved, data)?;

        debug!(path = %resolved.display(), bytes = data.len(), "File saved atomically");
        Ok(resolved)
    }

    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let resolved = security::resolve_entry(&self.root, filename)?;
        match fs::read(&resolved) {
            Ok(data) => Ok(data),
            Err(err) if is_missing(&err) => Err(StorageError::not_found(&resolved)),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let resolved = security::resolve_entry(&self.root, filename)?;

        let meta = match fs::symlink_metadata(&resolved) {
            Ok(meta) => meta,
            Err(err) if is_missing(&err) => return Ok(false),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to stat: {}", resolved.display()).into()),
                });
            },
        };

        let removed =
            if meta.is_dir() { fs::remove_dir(&resolved) } else { fs::remove_file(&resolved) };
        match removed {
            Ok(()) => {
                debug!(path = %resolved.display(), dir = meta.is_dir(), "Entry deleted");
                Ok(true)
            },
            Err(err) if is_missing(&err) => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    fn image_size(&self, filename: &str) -> Result<ImageSize, StorageError> {
        let resolved = security::resolve_entry(&self.root, filename)?;
        crate::media::image_size_at(&resolved)
    }

    fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let resolved = security::resolve(&self.root, filename)?;
        entry_exists(&resolved)
    }

    fn make_dir(&self, dirname: &str, options: DirOptions) -> Result<bool, StorageError> {
        let resolved = security::resolve(&self.root, dirname)?;
        if entry_exists(&resolved)? {
            return Ok(true);
        }

        let mut builder = fs::DirBuilder::new();
        builder.recursive(options.recursive);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(options.mode);
        }

        match builder.create(&resolved) {
            Ok(()) => {
                debug!(path = %resolved.display(), mode = %format!("{:o}", options.mode), "Directory created");
            },
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {},
            Err(err) if err.kind() == io::ErrorKind::NotFound && !options.recursive => {
                debug!(path = %resolved.display(), "Parent missing for non-recursive make_dir");
                return Ok(false);
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Failed to create directory: {}", resolved.display()).into(),
                    ),
                });
            },
        }

        Ok(resolved.is_dir())
    }
}

/// A path below a regular file is absent, not an I/O failure.
fn is_missing(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory)
}

fn entry_exists(path: &Path) -> Result<bool, StorageError> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if is_missing(&err) => Ok(false),
        Err(err) => Err(StorageError::Io {
            source: err,
            context: Some(format!("Failed to stat: {}", path.display()).into()),
        }),
    }
}

/// Creates `path` and its missing ancestors with `mode` (unix only).
pub(crate) fn create_dirs(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}
