use depot_storage::StorageError;
use std::borrow::Cow;

/// Errors surfaced by the registry, the filter chain and the facade.
#[depot_derive::depot_error]
pub enum FileSystemError {
    /// A configuration is malformed, names an unknown adapter or filter, or its adapter
    /// could not be constructed.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An operation addressed a name that was never defined (or was reset).
    #[error("Unknown configuration{}: {message}", format_context(.context))]
    UnknownConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid parameters{}: {message}", format_context(.context))]
    InvalidParams { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A filter refused the call.
    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A filter produced an outcome of the wrong shape for the operation.
    #[error("Unexpected outcome{}: {message}", format_context(.context))]
    UnexpectedOutcome { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },
}

/// Coarse classification of a [`FileSystemError`].
///
/// Lets callers tell "misconfigured" from "backend trouble" without matching on
/// storage internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfig,
    UnknownConfig,
    IoFailure,
    UnsupportedMedia,
    InvalidParams,
    Rejected,
    UnexpectedOutcome,
}

impl FileSystemError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::UnknownConfig { .. } => ErrorKind::UnknownConfig,
            Self::InvalidParams { .. } => ErrorKind::InvalidParams,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::UnexpectedOutcome { .. } => ErrorKind::UnexpectedOutcome,
            Self::Storage { source, .. } => match source {
                StorageError::Io { .. } | StorageError::FileNotFound { .. } => {
                    ErrorKind::IoFailure
                },
                StorageError::UnsupportedMedia { .. } => ErrorKind::UnsupportedMedia,
                StorageError::InvalidPath { .. } | StorageError::PathTraversal { .. } => {
                    ErrorKind::InvalidParams
                },
                StorageError::UnknownAdapter { .. } | StorageError::Options { .. } => {
                    ErrorKind::InvalidConfig
                },
            },
        }
    }

    /// Whether re-running the same call could succeed: backend I/O failures other
    /// than a missing file.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { source: StorageError::Io { .. }, .. })
    }

    pub(crate) fn invalid_config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConfig { message: message.into(), context: None }
    }

    pub(crate) fn invalid_params(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidParams { message: message.into(), context: None }
    }
}
