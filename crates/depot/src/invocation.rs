use depot_storage::{DirOptions, ExifData, ImageSize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// The seven operations every storage answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Write,
    Read,
    Delete,
    Exists,
    MakeDir,
    ImageSize,
    ExifData,
}

impl Operation {
    pub const ALL: [Self; 7] = [
        Self::Write,
        Self::Read,
        Self::Delete,
        Self::Exists,
        Self::MakeDir,
        Self::ImageSize,
        Self::ExifData,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Exists => "exists",
            Self::MakeDir => "make_dir",
            Self::ImageSize => "image_size",
            Self::ExifData => "exif_data",
        }
    }

    /// Whether the operation changes what is stored.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::Write | Self::Delete | Self::MakeDir)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one call. Filters may rewrite any field before passing the call on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub filename: String,
    /// Payload of a `write`; `None` for every other operation.
    pub data: Option<Vec<u8>>,
    /// Only consulted by `make_dir`.
    pub dir: DirOptions,
    /// Free-form values for filters (e.g. per-call hints).
    pub extra: Map<String, Value>,
}

impl Params {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub const fn with_dir(mut self, dir: DirOptions) -> Self {
        self.dir = dir;
        self
    }

    #[must_use]
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra.extend(extra);
        self
    }
}

/// One call travelling through a filter chain.
///
/// `storage` is filled in by the facade with the configuration name being addressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub storage: String,
    pub operation: Operation,
    pub params: Params,
}

impl Invocation {
    #[must_use]
    pub const fn new(operation: Operation, params: Params) -> Self {
        Self { storage: String::new(), operation, params }
    }

    #[must_use]
    pub fn write(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(Operation::Write, Params::new(filename).with_data(data))
    }

    #[must_use]
    pub fn read(filename: impl Into<String>) -> Self {
        Self::new(Operation::Read, Params::new(filename))
    }

    #[must_use]
    pub fn delete(filename: impl Into<String>) -> Self {
        Self::new(Operation::Delete, Params::new(filename))
    }

    #[must_use]
    pub fn exists(filename: impl Into<String>) -> Self {
        Self::new(Operation::Exists, Params::new(filename))
    }

    #[must_use]
    pub fn make_dir(dirname: impl Into<String>, options: DirOptions) -> Self {
        Self::new(Operation::MakeDir, Params::new(dirname).with_dir(options))
    }

    #[must_use]
    pub fn image_size(filename: impl Into<String>) -> Self {
        Self::new(Operation::ImageSize, Params::new(filename))
    }

    #[must_use]
    pub fn exif_data(filename: impl Into<String>) -> Self {
        Self::new(Operation::ExifData, Params::new(filename))
    }
}

/// The successful result of a call. Its shape follows the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `write`: the physical path that was written.
    Path(PathBuf),
    /// `read`
    Content(Vec<u8>),
    /// `delete`, `exists`, `make_dir`
    Flag(bool),
    Dimensions(ImageSize),
    Metadata(ExifData),
}

impl Outcome {
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Path(_) => "path",
            Self::Content(_) => "content",
            Self::Flag(_) => "flag",
            Self::Dimensions(_) => "dimensions",
            Self::Metadata(_) => "metadata",
        }
    }

    /// Whether this outcome is what `operation` produces.
    #[must_use]
    pub const fn fits(&self, operation: Operation) -> bool {
        matches!(
            (operation, self),
            (Operation::Write, Self::Path(_))
                | (Operation::Read, Self::Content(_))
                | (Operation::Delete | Operation::Exists | Operation::MakeDir, Self::Flag(_))
                | (Operation::ImageSize, Self::Dimensions(_))
                | (Operation::ExifData, Self::Metadata(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructors_fill_the_right_fields() {
        let write = Invocation::write("a.txt", b"abc".as_slice());
        assert_eq!(write.operation, Operation::Write);
        assert_eq!(write.params.data.as_deref(), Some(b"abc".as_slice()));

        let mkdir = Invocation::make_dir("d", DirOptions::default().mode(0o700));
        assert_eq!(mkdir.params.dir.mode, 0o700);
        assert!(mkdir.params.data.is_none());
    }

    #[test]
    fn extra_values_merge() {
        let mut extra = Map::new();
        extra.insert("hint".into(), json!("thumb"));
        let params = Params::new("p.png").with_extra(extra);
        assert_eq!(params.extra.get("hint"), Some(&json!("thumb")));
    }

    #[test]
    fn outcome_shapes_match_operations() {
        assert!(Outcome::Flag(true).fits(Operation::MakeDir));
        assert!(!Outcome::Flag(true).fits(Operation::Read));
        assert!(Outcome::Content(vec![]).fits(Operation::Read));
        assert_eq!(Operation::ALL.iter().filter(|op| op.is_mutating()).count(), 3);
    }
}
