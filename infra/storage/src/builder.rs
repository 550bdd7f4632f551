use crate::error::{StorageError, StorageErrorExt};
use crate::local::{LocalAdapter, create_dirs};
use crate::maintenance;
use crate::types::DEFAULT_PARENT_MODE;
use private::Sealed;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use tracing::info;

#[derive(Debug, Clone, Copy)]
struct LocalConfig {
    dir_mode: u32,
    purge_stale: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self { dir_mode: DEFAULT_PARENT_MODE, purge_stale: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct LocalAdapterBuilder<S: Sealed = NoRoot> {
    state: S,
    config: LocalConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> LocalAdapterBuilder<S> {
    #[must_use = "Sets the mode of directories created implicitly by writes"]
    pub const fn dir_mode(mut self, mode: u32) -> Self {
        self.config.dir_mode = mode;
        self
    }

    #[must_use = "Sets whether stale temp files are removed when the adapter is built"]
    pub const fn purge_stale(mut self, enable: bool) -> Self {
        self.config.purge_stale = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> LocalAdapterBuilder<N> {
        LocalAdapterBuilder { state, config: self.config }
    }
}

impl LocalAdapterBuilder<NoRoot> {
    #[must_use = "Creates a new local adapter builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the base path every filename is resolved below"]
    pub fn root(self, path: impl Into<PathBuf>) -> LocalAdapterBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl LocalAdapterBuilder<WithRoot> {
    /// Prepares the base path and returns the adapter.
    ///
    /// The root is created if missing and resolved to its physical location. With
    /// `purge_stale` set, temp files abandoned by interrupted writes are removed;
    /// cleanup problems are logged and never fail the build.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root cannot be created or resolved.
    pub fn build(self) -> Result<LocalAdapter, StorageError> {
        let root = &self.state.0;

        if !root.is_dir() {
            create_dirs(root, self.config.dir_mode)
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
            info!(path = %root.display(), "Bootstrapped storage root directory");
        }

        let canonical = std::fs::canonicalize(root)
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        if self.config.purge_stale {
            maintenance::purge_tmp(&canonical);
        }

        Ok(LocalAdapter {
            root: canonical,
            dir_mode: self.config.dir_mode,
            tmp_counter: AtomicU64::new(1),
        })
    }
}
