use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[depot_derive::depot_error]
pub enum StorageError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid path{}: {message}", format_context(.context))]
    InvalidPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported media{}: {message}", format_context(.context))]
    UnsupportedMedia { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown adapter kind{}: {message}", format_context(.context))]
    UnknownAdapter { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid adapter options{}: {source}", format_context(.context))]
    Options { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

impl StorageError {
    /// Whether the failure came from the backend itself rather than from the request.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::FileNotFound { .. })
    }

    pub(crate) fn not_found(path: &std::path::Path) -> Self {
        Self::FileNotFound { message: path.display().to_string().into(), context: None }
    }
}
