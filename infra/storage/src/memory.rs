use crate::adapter::{Adapter, AdapterKind};
use crate::error::StorageError;
use crate::security;
use crate::types::DirOptions;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

/// An [`Adapter`] keeping every entry in process memory.
///
/// Follows the same path rules and answers as [`LocalAdapter`](crate::LocalAdapter):
/// writes create implicit parents and only empty directories can be deleted.
/// The root is virtual and only shows up in the paths returned by `write`.
#[derive(Debug)]
pub struct MemoryAdapter {
    root: PathBuf,
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
}

impl MemoryAdapter {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), nodes: RwLock::new(BTreeMap::new()) }
    }

    /// Number of stored files, directories excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().values().filter(|n| matches!(n, Node::File(_))).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_ROOT)
    }
}

fn io_error(kind: io::ErrorKind, path: &Path) -> StorageError {
    StorageError::Io {
        source: io::Error::new(kind, path.display().to_string()),
        context: Some("In-memory storage".into()),
    }
}

/// Ensures every ancestor of `key` is a directory, creating missing ones when allowed.
///
/// All ancestors are checked before anything is inserted, so a failure leaves `nodes`
/// untouched.
fn prepare_parents(
    nodes: &mut BTreeMap<PathBuf, Node>,
    key: &Path,
    create: bool,
) -> Result<bool, StorageError> {
    let mut missing = Vec::new();
    for ancestor in key.ancestors().skip(1).filter(|a| !a.as_os_str().is_empty()) {
        match nodes.get(ancestor) {
            Some(Node::Dir) => {},
            Some(Node::File(_)) => return Err(io_error(io::ErrorKind::NotADirectory, ancestor)),
            None => missing.push(ancestor),
        }
    }

    if missing.is_empty() {
        return Ok(true);
    }
    if !create {
        return Ok(false);
    }
    for ancestor in missing {
        nodes.insert(ancestor.to_path_buf(), Node::Dir);
    }
    Ok(true)
}

impl Adapter for MemoryAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Memory
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let key = security::normalize_entry(filename)?;
        let mut nodes = self.nodes.write();

        if matches!(nodes.get(&key), Some(Node::Dir)) {
            return Err(io_error(io::ErrorKind::IsADirectory, &key));
        }
        prepare_parents(&mut nodes, &key, true)?;
        nodes.insert(key.clone(), Node::File(data.to_vec()));

        debug!(path = %key.display(), bytes = data.len(), "File stored in memory");
        Ok(self.root.join(key))
    }

    fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let key = security::normalize_entry(filename)?;
        match self.nodes.read().get(&key) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Dir) => Err(io_error(io::ErrorKind::IsADirectory, &key)),
            None => Err(StorageError::not_found(&self.root.join(key))),
        }
    }

    fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let key = security::normalize_entry(filename)?;
        let mut nodes = self.nodes.write();

        match nodes.get(&key) {
            None => return Ok(false),
            Some(Node::Dir) if nodes.keys().any(|k| k != &key && k.starts_with(&key)) => {
                return Err(io_error(io::ErrorKind::DirectoryNotEmpty, &key));
            },
            Some(_) => {},
        }

        nodes.remove(&key);
        Ok(true)
    }

    fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        let key = security::normalize(filename)?;
        Ok(key.as_os_str().is_empty() || self.nodes.read().contains_key(&key))
    }

    fn make_dir(&self, dirname: &str, options: DirOptions) -> Result<bool, StorageError> {
        let key = security::normalize(dirname)?;
        if key.as_os_str().is_empty() {
            return Ok(true);
        }

        let mut nodes = self.nodes.write();
        if nodes.contains_key(&key) {
            return Ok(true);
        }
        if !prepare_parents(&mut nodes, &key, options.recursive)? {
            return Ok(false);
        }
        nodes.insert(key, Node::Dir);
        Ok(true)
    }
}
