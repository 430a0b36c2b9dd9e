//! Error types for siteship-core.

use std::path::PathBuf;

use thiserror::Error;

/// Filesystem-side failures: the content root and everything read from it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configured content root does not exist.
    #[error("content root not found at {path}")]
    MissingRoot { path: PathBuf },

    /// The content root exists but is not a directory.
    #[error("content root at {path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recursive directory walk failed part way.
    #[error("failed to walk content root: {0}")]
    Walk(#[from] walkdir::Error),

    /// A path handed to key derivation does not live under the content root.
    #[error("{path} is not under content root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// A file path cannot be expressed as a UTF-8 object key.
    #[error("path {path} is not valid UTF-8 and cannot be used as an object key")]
    NonUtf8Path { path: PathBuf },
}

/// Errors raised while assembling deploy configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required credential variable was unset or empty.
    #[error("missing credential: set ${var}")]
    MissingCredential { var: String },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
