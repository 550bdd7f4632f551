//! Built-in filters and the catalog that instantiates them by name.

use crate::error::FileSystemError;
use crate::filter::{Filter, Next};
use crate::invocation::{Invocation, Operation};
use fxhash::FxHashMap;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

/// Default number of extra attempts made by [`retry`].
pub const DEFAULT_RETRIES: u32 = 3;

/// Builds a filter from the options of the configuration it is attached to.
pub type FilterFactory = fn(&Map<String, Value>) -> Result<Filter, FileSystemError>;

/// Emits one debug event per call, and a warning when the call fails.
#[must_use]
pub fn logging() -> Filter {
    Filter::new("logging", |invocation: Invocation, next: Next<'_>| {
        let started = Instant::now();
        let storage = invocation.storage.clone();
        let operation = invocation.operation;
        let filename = invocation.params.filename.clone();

        let result = next.run(invocation);
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &result {
            Ok(outcome) => debug!(
                storage = %storage,
                %operation,
                filename = %filename,
                elapsed_us,
                outcome = outcome.shape(),
                "Storage call completed"
            ),
            Err(error) => warn!(
                storage = %storage,
                %operation,
                filename = %filename,
                elapsed_us,
                error = %error,
                "Storage call failed"
            ),
        }
        result
    })
}

/// Rejects malformed parameters before they reach the adapter.
#[must_use]
pub fn validate() -> Filter {
    Filter::new("validate", |invocation: Invocation, next: Next<'_>| {
        let params = &invocation.params;
        if params.filename.trim().is_empty() {
            return Err(FileSystemError::invalid_params("filename cannot be empty"));
        }
        if params.filename.contains('\0') {
            return Err(FileSystemError::invalid_params("filename contains a NUL byte"));
        }
        if invocation.operation == Operation::Write && params.data.is_none() {
            return Err(FileSystemError::invalid_params("write requires data"));
        }
        next.run(invocation)
    })
}

/// Refuses `write`, `delete` and `make_dir`.
#[must_use]
pub fn read_only() -> Filter {
    Filter::new("read_only", |invocation: Invocation, next: Next<'_>| {
        if invocation.operation.is_mutating() {
            return Err(FileSystemError::Rejected {
                message: format!(
                    "{} of '{}' on read-only storage",
                    invocation.operation, invocation.params.filename
                )
                .into(),
                context: (!invocation.storage.is_empty())
                    .then(|| invocation.storage.clone().into()),
            });
        }
        next.run(invocation)
    })
}

/// Refuses writes whose payload exceeds `limit` bytes.
#[must_use]
pub fn max_size(limit: u64) -> Filter {
    Filter::new("max_size", move |invocation: Invocation, next: Next<'_>| {
        let len = invocation.params.data.as_ref().map_or(0, Vec::len);
        if invocation.operation == Operation::Write
            && u64::try_from(len).unwrap_or(u64::MAX) > limit
        {
            return Err(FileSystemError::Rejected {
                message: format!("payload of {len} bytes exceeds the {limit} byte limit").into(),
                context: None,
            });
        }
        next.run(invocation)
    })
}

/// Places every filename under `prefix`.
#[must_use]
pub fn prefix(prefix: impl Into<String>) -> Filter {
    let prefix = prefix.into().trim_matches(['/', '\\']).to_owned();
    Filter::new("prefix", move |mut invocation: Invocation, next: Next<'_>| {
        let filename = invocation.params.filename.trim_start_matches(['/', '\\']);
        invocation.params.filename = format!("{prefix}/{filename}");
        next.run(invocation)
    })
}

/// Runs the rest of the chain again, up to `retries` more times, while it fails with a
/// transient backend error.
#[must_use]
pub fn retry(retries: u32) -> Filter {
    Filter::new("retry", move |invocation: Invocation, next: Next<'_>| {
        let mut attempt = 0;
        loop {
            match next.run(invocation.clone()) {
                Err(error) if error.is_transient() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        storage = %invocation.storage,
                        operation = %invocation.operation,
                        attempt,
                        error = %error,
                        "Retrying storage call"
                    );
                },
                result => return result,
            }
        }
    })
}

/// Named filter factories, used to attach filters from configuration files.
///
/// The default catalog knows `logging`, `validate`, `read_only`, `max_size`
/// (option `max_size`), `prefix` (option `prefix`) and `retry` (option `retries`).
#[derive(Debug, Clone)]
pub struct FilterCatalog {
    factories: FxHashMap<String, FilterFactory>,
}

impl Default for FilterCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.register("logging", |_| Ok(logging()));
        catalog.register("validate", |_| Ok(validate()));
        catalog.register("read_only", |_| Ok(read_only()));
        catalog.register("max_size", |options| Ok(max_size(required_u64(options, "max_size")?)));
        catalog.register("prefix", |options| {
            let value = required_str(options, "prefix")?;
            if value.trim_matches(['/', '\\']).is_empty() {
                return Err(FileSystemError::invalid_config("option 'prefix' cannot be empty"));
            }
            Ok(prefix(value))
        });
        catalog.register("retry", |options| {
            let retries = optional_u64(options, "retries")?.map_or(Ok(DEFAULT_RETRIES), |n| {
                u32::try_from(n)
                    .map_err(|_| FileSystemError::invalid_config("option 'retries' is too large"))
            })?;
            Ok(retry(retries))
        });
        catalog
    }
}

impl FilterCatalog {
    /// A catalog holding the built-in filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { factories: FxHashMap::default() }
    }

    /// Adds or replaces the factory for `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: FilterFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Known filter names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiates the filter called `name` with `options`.
    ///
    /// # Errors
    /// [`FileSystemError::InvalidConfig`] for unknown names or unusable options.
    pub fn build(&self, name: &str, options: &Map<String, Value>) -> Result<Filter, FileSystemError> {
        let factory = self.factories.get(name).ok_or_else(|| FileSystemError::InvalidConfig {
            message: format!("unknown filter '{name}'").into(),
            context: Some(format!("Known filters: {}", self.names().join(", ")).into()),
        })?;
        factory(options)
    }
}

/// Reads a non-negative integer, accepting numeric strings (environment overrides arrive as text).
fn optional_u64(options: &Map<String, Value>, key: &str) -> Result<Option<u64>, FileSystemError> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| {
        FileSystemError::invalid_config(format!("option '{key}' must be a non-negative integer"))
    })
}

fn required_u64(options: &Map<String, Value>, key: &str) -> Result<u64, FileSystemError> {
    optional_u64(options, key)?
        .ok_or_else(|| FileSystemError::invalid_config(format!("option '{key}' is required")))
}

fn required_str<'a>(options: &'a Map<String, Value>, key: &str) -> Result<&'a str, FileSystemError> {
    match options.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(FileSystemError::invalid_config(format!("option '{key}' must be a string"))),
        None => Err(FileSystemError::invalid_config(format!("option '{key}' is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::filter::{FilterResult, execute};
    use crate::invocation::Outcome;
    use depot_storage::StorageError;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::io;
    use std::sync::Arc;

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn filename_echo(invocation: Invocation) -> FilterResult {
        Ok(Outcome::Content(invocation.params.filename.into_bytes()))
    }

    #[test]
    fn validate_rejects_bad_params() {
        let chain = [validate()];
        let kind = |inv| execute(&chain, inv, &filename_echo).unwrap_err().kind();

        assert_eq!(kind(Invocation::read("  ")), ErrorKind::InvalidParams);
        assert_eq!(kind(Invocation::read("a\0b")), ErrorKind::InvalidParams);
        assert_eq!(
            kind(Invocation::new(Operation::Write, crate::Params::new("a.txt"))),
            ErrorKind::InvalidParams
        );
        assert!(execute(&chain, Invocation::read("ok.txt"), &filename_echo).is_ok());
    }

    #[test]
    fn read_only_blocks_mutations() {
        let chain = [read_only()];
        for op in Operation::ALL {
            let inv = Invocation::new(op, crate::Params::new("f"));
            let result = execute(&chain, inv, &filename_echo);
            assert_eq!(result.is_err(), op.is_mutating(), "{op}");
        }
    }

    #[test]
    fn max_size_only_checks_writes() {
        let chain = [max_size(4)];
        assert!(execute(&chain, Invocation::write("f", b"1234".as_slice()), &filename_echo).is_ok());
        let err =
            execute(&chain, Invocation::write("f", b"12345".as_slice()), &filename_echo).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert!(execute(&chain, Invocation::read("f"), &filename_echo).is_ok());
    }

    #[test]
    fn prefix_roots_filenames_under_a_directory() {
        let chain = [prefix("/tenant-a/")];
        let out = execute(&chain, Invocation::read("/photos/p.png"), &filename_echo).unwrap();
        assert_eq!(out, Outcome::Content(b"tenant-a/photos/p.png".to_vec()));
    }

    #[test]
    fn retry_reruns_transient_failures_only() {
        let calls = Arc::new(Mutex::new(0u32));
        let flaky = {
            let calls = Arc::clone(&calls);
            move |_inv: Invocation| -> FilterResult {
                let mut n = calls.lock();
                *n += 1;
                if *n < 3 {
                    Err(StorageError::Io { source: io::Error::other("busy"), context: None }.into())
                } else {
                    Ok(Outcome::Flag(true))
                }
            }
        };

        let out = execute(&[retry(5)], Invocation::exists("f"), &flaky).unwrap();
        assert_eq!(out, Outcome::Flag(true));
        assert_eq!(*calls.lock(), 3);

        *calls.lock() = 0;
        assert!(execute(&[retry(1)], Invocation::exists("f"), &flaky).is_err());
        assert_eq!(*calls.lock(), 2);

        let missing = |_inv: Invocation| -> FilterResult {
            Err(StorageError::FileNotFound { message: "f".into(), context: None }.into())
        };
        let err = execute(&[retry(5)], Invocation::read("f"), &missing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn catalog_builds_from_options() {
        let catalog = FilterCatalog::new();
        assert_eq!(
            catalog.names(),
            ["logging", "max_size", "prefix", "read_only", "retry", "validate"]
        );

        let filter = catalog.build("max_size", &options(json!({ "max_size": "10" }))).unwrap();
        assert_eq!(filter.name(), "max_size");
        assert!(catalog.build("retry", &Map::new()).is_ok());

        let missing = catalog.build("max_size", &Map::new()).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::InvalidConfig);
        let unknown = catalog.build("compress", &Map::new()).unwrap_err();
        assert_eq!(unknown.kind(), ErrorKind::InvalidConfig);
        let blank = catalog.build("prefix", &options(json!({ "prefix": "/" }))).unwrap_err();
        assert_eq!(blank.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn catalog_accepts_custom_factories() {
        let mut catalog = FilterCatalog::empty();
        catalog.register("noop", |_| Ok(Filter::new("noop", |inv: Invocation, next: Next<'_>| next.run(inv))));
        assert!(catalog.contains("noop"));
        assert!(!catalog.contains("logging"));
    }
}
