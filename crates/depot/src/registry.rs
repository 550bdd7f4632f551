use crate::config::Configuration;
use crate::error::FileSystemError;
use crate::filter::Filter;
use depot_storage::{Adapter, AdapterKind};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info};

type AdapterSlot = Arc<Mutex<Option<Arc<dyn Adapter>>>>;

#[derive(Debug)]
struct Entry {
    configuration: Arc<Configuration>,
    kind: AdapterKind,
    adapter: AdapterSlot,
}

#[derive(Debug, Default)]
struct Table {
    order: Vec<String>,
    entries: FxHashMap<String, Entry>,
}

/// Answer of [`Registry::get`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Configuration),
    /// Other names are defined, but not this one.
    Missing,
    /// Nothing is defined at all.
    Empty,
}

impl Lookup {
    #[must_use]
    pub fn found(self) -> Option<Configuration> {
        match self {
            Self::Found(configuration) => Some(configuration),
            Self::Missing | Self::Empty => None,
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// What an operation needs from a registry entry: the live adapter and the filters
/// configured around it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub adapter: Arc<dyn Adapter>,
    configuration: Arc<Configuration>,
}

impl Resolved {
    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.configuration.filters
    }

    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}

/// Named storage configurations with lazily constructed adapters.
///
/// Definitions keep their first-definition position when replaced. Adapters are built on
/// the first [`resolve`](Self::resolve) of a name and cached until the name is redefined
/// or the registry is [`reset`](Self::reset); concurrent first calls build exactly one.
#[derive(Debug, Default)]
pub struct Registry {
    table: RwLock<Table>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `configuration` under `name`, replacing (and dropping the adapter of) any
    /// previous definition. No adapter is built here.
    ///
    /// # Errors
    /// [`FileSystemError::InvalidConfig`] for a blank name or a missing/unknown adapter selector.
    pub fn define(
        &self,
        name: impl Into<String>,
        configuration: Configuration,
    ) -> Result<(), FileSystemError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FileSystemError::invalid_config("configuration name cannot be empty"));
        }
        let kind = configuration.adapter_kind().map_err(|e| match e {
            FileSystemError::InvalidConfig { message, .. } => FileSystemError::InvalidConfig {
                message,
                context: Some(format!("Defining '{name}'").into()),
            },
            other => other,
        })?;

        let entry = Entry {
            configuration: Arc::new(configuration),
            kind,
            adapter: AdapterSlot::default(),
        };

        let mut table = self.table.write();
        if table.entries.insert(name.clone(), entry).is_none() {
            table.order.push(name.clone());
        }
        drop(table);

        debug!(name = %name, adapter = %kind, "Storage configuration defined");
        Ok(())
    }

    /// Returns the configuration stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Lookup {
        let table = self.table.read();
        match table.entries.get(name) {
            Some(entry) => Lookup::Found(Configuration::clone(&entry.configuration)),
            None if table.entries.is_empty() => Lookup::Empty,
            None => Lookup::Missing,
        }
    }

    /// Every configuration, in definition order.
    #[must_use]
    pub fn all(&self) -> Vec<(String, Configuration)> {
        let table = self.table.read();
        table
            .order
            .iter()
            .filter_map(|name| {
                table
                    .entries
                    .get(name)
                    .map(|entry| (name.clone(), Configuration::clone(&entry.configuration)))
            })
            .collect()
    }

    /// Defined names, in definition order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.table.read().order.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every configuration and cached adapter.
    pub fn reset(&self) {
        let mut table = self.table.write();
        let count = table.entries.len();
        table.entries.clear();
        table.order.clear();
        drop(table);

        if count > 0 {
            info!(count, "Storage registry reset");
        }
    }

    /// Returns the adapter for `name`, building it on first use, plus its filters.
    ///
    /// # Errors
    /// [`FileSystemError::UnknownConfig`] if `name` is not defined;
    /// [`FileSystemError::InvalidConfig`] if the adapter cannot be built from its options.
    pub fn resolve(&self, name: &str) -> Result<Resolved, FileSystemError> {
        let (configuration, kind, slot) = {
            let table = self.table.read();
            let entry = table.entries.get(name).ok_or_else(|| FileSystemError::UnknownConfig {
                message: name.to_owned().into(),
                context: (!table.entries.is_empty())
                    .then(|| format!("Defined: {}", table.order.join(", ")).into()),
            })?;
            (Arc::clone(&entry.configuration), entry.kind, Arc::clone(&entry.adapter))
        };

        let mut cached = slot.lock();
        let adapter = if let Some(adapter) = cached.as_ref() {
            Arc::clone(adapter)
        } else {
            let adapter =
                kind.build(&configuration.options).map_err(|e| FileSystemError::InvalidConfig {
                    message: e.to_string().into(),
                    context: Some(format!("Building {kind} adapter for '{name}'").into()),
                })?;
            info!(name, adapter = %kind, root = %adapter.root().display(), "Storage adapter ready");
            *cached = Some(Arc::clone(&adapter));
            adapter
        };
        drop(cached);

        Ok(Resolved { adapter, configuration })
    }
}
