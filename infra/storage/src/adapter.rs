use crate::error::{StorageError, StorageErrorExt};
use crate::local::LocalAdapter;
use crate::memory::MemoryAdapter;
use crate::types::{AdapterOptions, DirOptions, ExifData, ImageSize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// The capability set every storage backend provides.
///
/// Filenames are always interpreted relative to the adapter root. Boolean
/// operations answer `false` for a missing target; payload operations fail
/// with [`StorageError::FileNotFound`].
pub trait Adapter: fmt::Debug + Send + Sync {
    fn kind(&self) -> AdapterKind;

    /// Root every filename is resolved below.
    fn root(&self) -> &Path;

    /// Stores `data` under `filename`, creating parent directories, and returns the written path.
    ///
    /// # Errors
    /// Fails on invalid names or backend I/O failure.
    fn write(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError>;

    /// # Errors
    /// [`StorageError::FileNotFound`] if nothing is stored under `filename`.
    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError>;

    /// Removes a file or an empty directory; `Ok(false)` if nothing was there.
    ///
    /// # Errors
    /// Fails on invalid names, non-empty directories or backend I/O failure.
    fn delete(&self, filename: &str) -> Result<bool, StorageError>;

    /// # Errors
    /// Fails on invalid names or when the backend cannot answer.
    fn exists(&self, filename: &str) -> Result<bool, StorageError>;

    /// Ensures a directory exists; `Ok(true)` if it does afterwards.
    ///
    /// # Errors
    /// Fails on invalid names or backend I/O failure.
    fn make_dir(&self, dirname: &str, options: DirOptions) -> Result<bool, StorageError>;

    /// # Errors
    /// [`StorageError::FileNotFound`] or [`StorageError::UnsupportedMedia`].
    fn image_size(&self, filename: &str) -> Result<ImageSize, StorageError> {
        crate::media::image_size(&self.read(filename)?)
    }

    /// # Errors
    /// [`StorageError::FileNotFound`] or [`StorageError::UnsupportedMedia`].
    fn exif_data(&self, filename: &str) -> Result<ExifData, StorageError> {
        crate::media::exif_data(&self.read(filename)?)
    }
}

/// The closed set of adapter implementations selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Local,
    Memory,
}

impl AdapterKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Memory => "memory",
        }
    }

    /// Builds an adapter of this kind from `options` merged over the defaults.
    ///
    /// Keys the adapter does not know are ignored.
    ///
    /// # Errors
    /// [`StorageError::Options`] for malformed options, [`StorageError::Io`] if the root
    /// cannot be prepared.
    pub fn build(self, options: &Map<String, Value>) -> Result<Arc<dyn Adapter>, StorageError> {
        let options: AdapterOptions = serde_json::from_value(Value::Object(options.clone()))
            .context(format!("Failed to parse {} adapter options", self.as_str()))?;

        Ok(match self {
            Self::Local => Arc::new(
                LocalAdapter::builder()
                    .root(options.path)
                    .dir_mode(options.dir_mode)
                    .purge_stale(options.purge_stale)
                    .build()?,
            ),
            Self::Memory => Arc::new(MemoryAdapter::new(options.path)),
        })
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "file" | "filesystem" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            _ => Err(StorageError::UnknownAdapter {
                message: s.to_owned().into(),
                context: Some("Expected one of: local, file, filesystem, memory".into()),
            }),
        }
    }
}
