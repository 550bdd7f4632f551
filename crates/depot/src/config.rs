use crate::error::FileSystemError;
use crate::filter::Filter;
use depot_storage::AdapterKind;
use serde_json::{Map, Value};
use std::path::Path;

/// Everything the registry stores under one name.
///
/// `options` is handed to the adapter (merged over its defaults) and to catalog filters;
/// `filters` run outermost first.
///
/// # Example
///
/// ```rust
/// use depot::{Configuration, filters};
///
/// let config = Configuration::new("local")
///     .path("/var/lib/depot/avatars")
///     .option("max_size", 1_048_576)
///     .filter(filters::validate())
///     .filter(filters::max_size(1_048_576));
///
/// assert_eq!(config.adapter.as_deref(), Some("local"));
/// assert_eq!(config.filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    /// Adapter selector, e.g. `"local"` or `"memory"`.
    pub adapter: Option<String>,
    pub options: Map<String, Value>,
    pub filters: Vec<Filter>,
}

impl Configuration {
    #[must_use]
    pub fn new(adapter: impl Into<String>) -> Self {
        Self { adapter: Some(adapter.into()), ..Self::default() }
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Sets the adapter root (`path` option).
    #[must_use]
    pub fn path(self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_string_lossy().into_owned();
        self.option("path", path)
    }

    /// Appends a filter; it runs inside every filter added before it.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Parses the adapter selector.
    ///
    /// # Errors
    /// [`FileSystemError::InvalidConfig`] if the selector is missing or unknown.
    pub fn adapter_kind(&self) -> Result<AdapterKind, FileSystemError> {
        let selector = self
            .adapter
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| FileSystemError::invalid_config("no adapter selected"))?;

        selector.parse::<AdapterKind>().map_err(|e| FileSystemError::InvalidConfig {
            message: format!("unknown adapter '{selector}'").into(),
            context: Some(e.to_string().into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_kind_requires_a_known_selector() {
        assert_eq!(Configuration::new("File").adapter_kind().unwrap(), AdapterKind::Local);
        assert!(Configuration::default().adapter_kind().is_err());
        assert!(Configuration::new(" ").adapter_kind().is_err());
        assert_eq!(Configuration::new("memory").adapter_kind().unwrap(), AdapterKind::Memory);

        let err = Configuration::new("s3").adapter_kind().unwrap_err();
        assert!(matches!(err, FileSystemError::InvalidConfig { .. }));
        assert!(err.to_string().contains("unknown adapter 's3'"));
    }

    #[test]
    fn options_accumulate() {
        let config = Configuration::new("memory").path("/virtual").option("retries", 2);
        assert_eq!(config.options.get("path"), Some(&Value::from("/virtual")));
        assert_eq!(config.options.get("retries"), Some(&Value::from(2)));
    }
}
