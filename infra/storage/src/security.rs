use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Turns a caller-supplied filename into a path relative to the storage root.
///
/// A leading separator means "rooted at the storage root", never "absolute on
/// the host": `"/sub/f"` and `"sub/f"` normalize to the same `sub/f`.
/// `.` is dropped and `..` is collapsed lexically, but may not climb above the root.
pub(crate) fn normalize(filename: &str) -> Result<PathBuf, StorageError> {
    if filename.is_empty() {
        return Err(StorageError::InvalidPath {
            message: "<empty>".into(),
            context: Some("Filename cannot be empty".into()),
        });
    }
    if filename.contains('\0') {
        return Err(StorageError::InvalidPath {
            message: filename.escape_debug().to_string().into(),
            context: Some("Filename contains a NUL byte".into()),
        });
    }

    let rooted = filename.trim_start_matches(['/', '\\']);
    let mut out = PathBuf::new();

    for c in Path::new(rooted).components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversal {
                        message: filename.to_owned().into(),
                        context: Some("Path attempted to escape storage root via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversal {
                    message: filename.to_owned().into(),
                    context: Some("Drive prefixes are not allowed in filenames".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Normalizes a filename that must name an entry below the root (not the root itself).
pub(crate) fn normalize_entry(filename: &str) -> Result<PathBuf, StorageError> {
    let relative = normalize(filename)?;
    if relative.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath {
            message: filename.to_owned().into(),
            context: Some("Path resolves to the storage root".into()),
        });
    }
    Ok(relative)
}

/// Joins a filename to `root`, allowing the root itself (`"/"`, `"."`).
pub(crate) fn resolve(root: &Path, filename: &str) -> Result<PathBuf, StorageError> {
    let relative = normalize(filename)?;
    if relative.as_os_str().is_empty() { Ok(root.to_path_buf()) } else { Ok(root.join(relative)) }
}

/// Joins a filename to `root`; the result is always strictly below `root`.
pub(crate) fn resolve_entry(root: &Path, filename: &str) -> Result<PathBuf, StorageError> {
    Ok(root.join(normalize_entry(filename)?))
}
