//! # siteship-sync
//!
//! One-way reconciliation of a local content root against a storage bucket.
//!
//! Call [`synchronize`] (or [`synchronize_with`] to observe progress) with a
//! content root and any [`StorageBackend`]; the bucket ends up mirroring the
//! root and the returned [`RunReport`] lists every per-file action.

pub mod backend;
pub mod error;
pub mod memory;
pub mod plan;
pub mod reconcile;
pub mod report;

pub use backend::{BackendError, Operation, StorageBackend};
pub use error::SyncError;
pub use memory::MemoryBackend;
pub use plan::{partition, Plan};
pub use reconcile::{synchronize, synchronize_with, Phase, Progress};
pub use report::{ActionCounts, FileAction, RunReport};
