/// Error types surfaced to callers of the core crate.
///
/// Unreadable directories and entries encountered during a scan are *not*
/// errors: the traversal recovers from them locally and only counts them in
/// [`crate::model::ScanStats`]. Everything here is returned to the caller
/// and never retried automatically.
use crate::classify::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single [`crate::delete::delete`] call.
#[derive(Error, Debug)]
pub enum DeleteError {
    /// Refused by policy before any filesystem call was made.
    #[error("'{path}' is protected ({}) and cannot be deleted", .category.label())]
    Protected { path: PathBuf, category: Category },

    /// Non-forced directory removal on a directory that still has entries.
    #[error("directory '{path}' is not empty; use a forced delete to remove its contents")]
    NotEmpty { path: PathBuf },

    #[error("permission denied deleting '{path}': {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' does not exist: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeleteError {
    /// Map an OS error from a removal call onto the categorised variants.
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::DirectoryNotEmpty => Self::NotEmpty { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            std::io::ErrorKind::NotFound => Self::NotFound { path, source },
            _ => Self::Io { path, source },
        }
    }

    /// `true` for failures where a forced delete is the sensible retry.
    pub fn suggests_force(&self) -> bool {
        matches!(self, Self::NotEmpty { .. })
    }
}

/// Configuration loading / validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure to start a scan worker.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] std::io::Error),
}
