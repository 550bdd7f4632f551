//! # Depot
//!
//! Named storages behind one uniform operation set. Callers say *which* storage
//! (`"avatars"`, `"documents"`) and *what* to do; the registry decides which adapter
//! serves the name and which filters wrap the call.
//!
//! ```text
//! caller ─► FileSystem::op(name, ..) ─► Registry::resolve(name)
//!                                          │ (adapter built on first use)
//!                                          ▼
//!                      filter 1 ─► filter 2 ─► … ─► adapter operation
//! ```
//!
//! * [`Registry`]: configurations by name, adapters built lazily and cached.
//! * [`Filter`] / [`Next`]: interceptors composed around every adapter call.
//! * [`FilterCatalog`]: built-in filters addressable by name from config files.
//! * [`FileSystem`]: the facade with `write`, `read`, `delete`, `exists`, `make_dir`,
//!   `image_size` and `exif_data`.
//!
//! ## Example
//!
//! ```rust
//! use depot::{Configuration, FileSystem, FileSystemError, Filter, Invocation};
//!
//! # fn main() -> Result<(), FileSystemError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let shout = Filter::new("shout", |invocation: Invocation, next| {
//!     let mut outcome = next.run(invocation)?;
//!     if let depot::Outcome::Content(bytes) = &mut outcome {
//!         bytes.make_ascii_uppercase();
//!     }
//!     Ok(outcome)
//! });
//!
//! let fs = FileSystem::new();
//! fs.define("notes", Configuration::new("local").path(tmp.path()).filter(shout))?;
//!
//! fs.write("notes", "todo.txt", "buy milk")?;
//! assert_eq!(fs.read("notes", "todo.txt")?, b"BUY MILK");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod facade;
mod filter;
pub mod filters;
mod invocation;
mod registry;

pub use config::Configuration;
pub use depot_domain as domain;
pub use depot_storage as storage;
pub use depot_storage::{DirOptions, ExifData, ImageSize};
pub use error::{ErrorKind, FileSystemError, FileSystemErrorExt};
pub use facade::FileSystem;
pub use filter::{Filter, FilterResult, Next, execute};
pub use filters::{FilterCatalog, FilterFactory};
pub use invocation::{Invocation, Operation, Outcome, Params};
pub use registry::{Lookup, Registry, Resolved};
