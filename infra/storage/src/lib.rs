//! Storage backends for Depot.
//!
//! Every backend implements the [`Adapter`] capability set: write, read, delete, exists,
//! make-directory, image dimensions and EXIF metadata. Adapters know nothing about filters
//! or named configurations; those live one layer up in the `depot` crate.
//!
//! # Core Features
//!
//! - **Rooted paths**: filenames always resolve below the adapter root. A leading separator
//!   means "rooted at the root", and `..` can never climb above it.
//! - **Atomic writes**: [`LocalAdapter`] writes to a unique temp file, syncs and renames it
//!   into place.
//! - **Self-healing**: temp files orphaned by interrupted writes are removed when a local
//!   adapter is built.
//! - **Selectable by name**: [`AdapterKind`] parses `"local"`, `"file"`, `"filesystem"` and
//!   `"memory"` and builds an adapter from a loose option map.
//!
//! # Examples
//!
//! ```rust
//! use depot_storage::{AdapterKind, DirOptions, StorageError};
//! use serde_json::{Map, Value};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let mut options = Map::new();
//! options.insert("path".into(), Value::from(tmp.path().to_string_lossy().into_owned()));
//!
//! let adapter = "File".parse::<AdapterKind>()?.build(&options)?;
//!
//! assert!(adapter.make_dir("docs", DirOptions::default())?);
//! adapter.write("docs/readme.txt", b"hello")?;
//! assert!(adapter.exists("/docs/readme.txt")?);
//! # Ok(())
//! # }
//! ```

mod adapter;
mod builder;
mod error;
mod local;
mod maintenance;
mod media;
mod memory;
mod security;
mod types;

pub use adapter::{Adapter, AdapterKind};
pub use builder::LocalAdapterBuilder;
pub use error::{StorageError, StorageErrorExt};
pub use local::LocalAdapter;
pub use media::{exif_data, image_size};
pub use memory::MemoryAdapter;
pub use types::{
    AdapterOptions, DEFAULT_DIR_MODE, DEFAULT_PARENT_MODE, DEFAULT_ROOT, DirOptions, ExifData,
    ImageSize, parse_mode,
};
