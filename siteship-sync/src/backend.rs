//! Storage backend seam.

use std::fmt;

use thiserror::Error;

use siteship_core::{ObjectHandle, RelativeKey, RemoteObject};

/// Backend operation, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Put,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list"),
            Operation::Read => write!(f, "read"),
            Operation::Put => write!(f, "put"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Failures reported by a [`StorageBackend`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request reached the backend (or tried to) and failed.
    #[error("{operation} request failed for '{key}': {message}")]
    Request {
        operation: Operation,
        key: String,
        message: String,
    },

    /// A listing entry could not be turned into a [`RemoteObject`].
    #[error("invalid remote object: {reason}")]
    InvalidObject { reason: String },

    /// No object stored under the key.
    #[error("no object stored under '{key}'")]
    NotFound { key: String },
}

/// A collection of objects addressed by [`RelativeKey`].
///
/// Implementations must hand back a fingerprint that changes iff the content
/// changes and that normalizes to the MD5 hex digest of the content; otherwise
/// unchanged files are re-uploaded or changed files are skipped.
pub trait StorageBackend {
    /// Enumerate every object with its fingerprint. A partial listing is an error.
    fn list(&self) -> Result<Vec<RemoteObject>, BackendError>;

    /// Fetch the bytes stored under `key`.
    fn read(&self, key: &RelativeKey) -> Result<Vec<u8>, BackendError>;

    /// Create or replace the object under `key`.
    fn put(&mut self, key: &RelativeKey, content: Vec<u8>) -> Result<(), BackendError>;

    /// Remove the object behind `handle`.
    fn delete(&mut self, handle: &ObjectHandle) -> Result<(), BackendError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn list(&self) -> Result<Vec<RemoteObject>, BackendError> {
        (**self).list()
    }

    fn read(&self, key: &RelativeKey) -> Result<Vec<u8>, BackendError> {
        (**self).read(key)
    }

    fn put(&mut self, key: &RelativeKey, content: Vec<u8>) -> Result<(), BackendError> {
        (**self).put(key, content)
    }

    fn delete(&mut self, handle: &ObjectHandle) -> Result<(), BackendError> {
        (**self).delete(handle)
    }
}
