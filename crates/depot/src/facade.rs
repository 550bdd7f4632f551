use crate::config::Configuration;
use crate::error::{FileSystemError, FileSystemErrorExt};
use crate::filter::{self, FilterResult};
use crate::filters::FilterCatalog;
use crate::invocation::{Invocation, Operation, Outcome, Params};
use crate::registry::Registry;
use depot_domain::config::DepotConfig;
use depot_storage::{Adapter, DirOptions, ExifData, ImageSize};
use serde_json::{Map, Value};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

/// Uniform entry point: every operation names the configuration it addresses.
///
/// The handle is reference counted and cheap to clone; it derefs to its [`Registry`]
/// for `define`, `get`, `all` and `reset`.
///
/// # Example
///
/// ```rust
/// use depot::{Configuration, DirOptions, FileSystem, FileSystemError, filters};
///
/// # fn main() -> Result<(), FileSystemError> {
/// let fs = FileSystem::new();
/// fs.define("scratch", Configuration::new("memory").filter(filters::validate()))?;
///
/// assert!(fs.make_dir("scratch", "docs", DirOptions::default())?);
/// fs.write("scratch", "docs/a.txt", "hello")?;
/// assert_eq!(fs.read("scratch", "/docs/a.txt")?, b"hello");
/// assert!(fs.delete("scratch", "docs/a.txt")?);
/// assert!(!fs.exists("scratch", "docs/a.txt")?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileSystem {
    registry: Arc<Registry>,
}

impl Deref for FileSystem {
    type Target = Registry;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

impl FileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines every storage of a loaded configuration file, attaching catalog filters in
    /// the listed order.
    ///
    /// # Errors
    /// [`FileSystemError::InvalidConfig`] for unknown adapters or filters, or unusable options.
    pub fn from_config(
        config: &DepotConfig,
        catalog: &FilterCatalog,
    ) -> Result<Self, FileSystemError> {
        let fs = Self::new();
        for (name, spec) in &config.storages {
            let filters = spec
                .filters
                .iter()
                .map(|filter| catalog.build(filter, &spec.options))
                .collect::<Result<Vec<_>, _>>()
                .context(format!("Storage '{name}'"))?;

            let configuration = Configuration {
                adapter: spec.adapter.clone(),
                options: spec.options.clone(),
                filters,
            };
            fs.define(name.as_str(), configuration)?;
        }
        Ok(fs)
    }

    /// Runs `invocation` against the storage called `name` through its filter chain.
    ///
    /// # Errors
    /// [`FileSystemError::UnknownConfig`] for undefined names, otherwise whatever the
    /// filters or the adapter return.
    pub fn execute(&self, name: &str, mut invocation: Invocation) -> FilterResult {
        let resolved = self.registry.resolve(name)?;
        let operation = invocation.operation;
        name.clone_into(&mut invocation.storage);

        trace!(
            storage = name,
            %operation,
            filename = %invocation.params.filename,
            filters = resolved.filters().len(),
            "Dispatching storage call"
        );

        let adapter = resolved.adapter.as_ref();
        let terminal = |invocation: Invocation| dispatch(adapter, invocation);
        let outcome = filter::execute(resolved.filters(), invocation, &terminal)?;

        if outcome.fits(operation) {
            Ok(outcome)
        } else {
            Err(FileSystemError::UnexpectedOutcome {
                message: format!("{operation} produced a {} outcome", outcome.shape()).into(),
                context: Some(format!("Storage '{name}'").into()),
            })
        }
    }

    /// Stores `data` and returns the physical path written.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn write(
        &self,
        name: &str,
        filename: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<PathBuf, FileSystemError> {
        match self.execute(name, Invocation::write(filename, data))? {
            Outcome::Path(path) => Ok(path),
            other => Err(mismatch(Operation::Write, &other)),
        }
    }

    /// # Errors
    /// See [`execute`](Self::execute); a missing file is an I/O failure.
    pub fn read(&self, name: &str, filename: &str) -> Result<Vec<u8>, FileSystemError> {
        match self.execute(name, Invocation::read(filename))? {
            Outcome::Content(data) => Ok(data),
            other => Err(mismatch(Operation::Read, &other)),
        }
    }

    /// Removes a file or an empty directory; `false` if there was nothing to remove.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn delete(&self, name: &str, filename: &str) -> Result<bool, FileSystemError> {
        self.flag(name, Invocation::delete(filename))
    }

    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn exists(&self, name: &str, filename: &str) -> Result<bool, FileSystemError> {
        self.flag(name, Invocation::exists(filename))
    }

    /// Ensures a directory exists; `true` when it does afterwards.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn make_dir(
        &self,
        name: &str,
        dirname: &str,
        options: DirOptions,
    ) -> Result<bool, FileSystemError> {
        self.flag(name, Invocation::make_dir(dirname, options))
    }

    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn image_size(&self, name: &str, filename: &str) -> Result<ImageSize, FileSystemError> {
        self.image_size_with(name, filename, Map::new())
    }

    /// Like [`image_size`](Self::image_size), with `extra` values visible to filters.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn image_size_with(
        &self,
        name: &str,
        filename: &str,
        extra: Map<String, Value>,
    ) -> Result<ImageSize, FileSystemError> {
        let invocation =
            Invocation::new(Operation::ImageSize, Params::new(filename).with_extra(extra));
        match self.execute(name, invocation)? {
            Outcome::Dimensions(size) => Ok(size),
            other => Err(mismatch(Operation::ImageSize, &other)),
        }
    }

    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn exif_data(&self, name: &str, filename: &str) -> Result<ExifData, FileSystemError> {
        self.exif_data_with(name, filename, Map::new())
    }

    /// Like [`exif_data`](Self::exif_data), with `extra` values visible to filters.
    ///
    /// # Errors
    /// See [`execute`](Self::execute).
    pub fn exif_data_with(
        &self,
        name: &str,
        filename: &str,
        extra: Map<String, Value>,
    ) -> Result<ExifData, FileSystemError> {
        let invocation =
            Invocation::new(Operation::ExifData, Params::new(filename).with_extra(extra));
        match self.execute(name, invocation)? {
            Outcome::Metadata(data) => Ok(data),
            other => Err(mismatch(Operation::ExifData, &other)),
        }
    }

    fn flag(&self, name: &str, invocation: Invocation) -> Result<bool, FileSystemError> {
        let operation = invocation.operation;
        match self.execute(name, invocation)? {
            Outcome::Flag(flag) => Ok(flag),
            other => Err(mismatch(operation, &other)),
        }
    }
}

/// The terminal call of every chain: one adapter operation.
fn dispatch(adapter: &dyn Adapter, invocation: Invocation) -> FilterResult {
    let Params { filename, data, dir, .. } = invocation.params;

    let outcome = match invocation.operation {
        Operation::Write => {
            let data = data.ok_or_else(|| FileSystemError::invalid_params("write requires data"))?;
            Outcome::Path(adapter.write(&filename, &data)?)
        },
        Operation::Read => Outcome::Content(adapter.read(&filename)?),
        Operation::Delete => Outcome::Flag(adapter.delete(&filename)?),
        Operation::Exists => Outcome::Flag(adapter.exists(&filename)?),
        Operation::MakeDir => Outcome::Flag(adapter.make_dir(&filename, dir)?),
        Operation::ImageSize => Outcome::Dimensions(adapter.image_size(&filename)?),
        Operation::ExifData => Outcome::Metadata(adapter.exif_data(&filename)?),
    };
    Ok(outcome)
}

fn mismatch(operation: Operation, outcome: &Outcome) -> FileSystemError {
    FileSystemError::UnexpectedOutcome {
        message: format!("{operation} produced a {} outcome", outcome.shape()).into(),
        context: None,
    }
}
