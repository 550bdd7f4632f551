use config::{Config, Environment, File};
use depot_domain::config::DepotConfig;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Configuration file looked up when no path is given (any supported extension).
pub const DEFAULT_CONFIG: &str = "depot";

/// Prefix of environment overrides, e.g. `DEPOT__STORAGES__DEFAULT__PATH`.
pub const ENV_PREFIX: &str = "DEPOT";

/// Custom error type for config loading.
#[depot_derive::depot_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Layers, lowest precedence first:
/// 1. **Base File**: `path`, or [`DEFAULT_CONFIG`] in the working directory. The extension
///    may be omitted; `depot` matches `depot.toml`, `depot.json`, `depot.yaml` and so on.
/// 2. **Environment Overrides**: variables prefixed with `DEPOT__`, nested with double
///    underscores (`DEPOT__LOGGING__LEVEL` maps to `logging.level`).
///
/// Environment values arrive as strings; typed fields convert them, and storage options keep
/// them as strings for the adapter and filters to parse.
///
/// # Errors
/// [`ConfigError::Config`] if the file is missing or unreadable, or its content does not match `T`.
///
/// # Example
/// ```rust
/// use depot_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     retries: u32,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_with_env(path, None)
}

/// [`load_config`] for the storage configuration file.
///
/// # Errors
/// See [`load_config`].
pub fn load_depot_config(path: Option<impl AsRef<Path>>) -> Result<DepotConfig, ConfigError> {
    let config: DepotConfig = load_config(path)?;
    info!(storages = config.storages.len(), "Storage configuration loaded");
    Ok(config)
}

fn load_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<config::Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .source(env),
        );

    info!(path = %effective_path.display(), "Loading config");

    let config = builder
        .build()
        .context(format!("Failed to build config from {}", effective_path.display()))?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
