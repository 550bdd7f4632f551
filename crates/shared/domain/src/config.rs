use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration file: logging plus every named storage.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DepotConfigInner {
    pub logging: LoggingConfig,
    /// Storages by name, iterated in name order.
    pub storages: BTreeMap<String, StorageSpec>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct DepotConfig {
    #[serde(flatten, default)]
    inner: Arc<DepotConfigInner>,
}

impl Deref for DepotConfig {
    type Target = DepotConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for DepotConfig {
    fn deref_mut(&mut self) -> &mut DepotConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// One named storage as written in a configuration file.
///
/// ```toml
/// [storages.avatars]
/// adapter = "local"
/// path = "/var/lib/depot/avatars"
/// filters = ["validate", "max_size"]
/// max_size = 1048576
/// ```
///
/// Every key other than `adapter` and `filters` lands in `options`, where the adapter and
/// the catalog filters pick up what they understand.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
pub struct StorageSpec {
    pub adapter: Option<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Console and file logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    pub console: bool,
    /// Directory for rolling log files; file logging is off when unset.
    pub path: Option<PathBuf>,
    /// `minutely`, `hourly`, `daily`, `weekly` or `never`.
    pub rotation: String,
    pub max_files: usize,
    pub json: bool,
    /// Extra directives, e.g. `depot=debug`.
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            path: None,
            rotation: "daily".to_owned(),
            max_files: 10,
            json: false,
            env_filter: None,
        }
    }
}
