//! Error types for siteship-sync.

use thiserror::Error;

use siteship_core::{CoreError, RelativeKey};

use crate::backend::{BackendError, Operation};

/// Everything that aborts a reconciliation run.
///
/// No variant is retried; the run stops at the first one and whatever was
/// already transferred stays transferred.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Content root missing or unreadable, or a local file failed to read.
    #[error("filesystem error: {0}")]
    Filesystem(#[from] CoreError),

    /// Remote enumeration failed or returned an unusable listing.
    #[error("failed to list remote objects: {0}")]
    BackendList(#[source] BackendError),

    /// A put or delete against the backend failed.
    #[error("failed to {operation} {key}: {source}")]
    BackendTransfer {
        operation: Operation,
        key: RelativeKey,
        #[source]
        source: BackendError,
    },
}

/// Convenience constructor for [`SyncError::BackendTransfer`].
pub(crate) fn transfer_err(
    operation: Operation,
    key: &RelativeKey,
    source: BackendError,
) -> SyncError {
    SyncError::BackendTransfer {
        operation,
        key: key.clone(),
        source,
    }
}
