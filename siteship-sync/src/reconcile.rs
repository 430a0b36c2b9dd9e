//! Reconciler.
//!
//! ## `synchronize` — linear pipeline
//!
//! 1. Check the content root exists.
//! 2. Enumerate remote objects (fatal on any listing failure).
//! 3. Enumerate local files.
//! 4. Partition keys into add / check / delete.
//! 5. Add phase: upload every missing key.
//! 6. Update phase: hash, compare with fingerprint, upload on mismatch.
//! 7. Delete phase: remove every key gone locally.
//!
//! The first error aborts the run. Nothing is rolled back; every action is
//! idempotent, so rerunning from scratch is always safe.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::Utc;

use siteship_core::{local, RelativeKey, RemoteObject};

use crate::backend::{BackendError, Operation, StorageBackend};
use crate::error::{transfer_err, SyncError};
use crate::plan::partition;
use crate::report::{FileAction, RunReport};

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Pipeline phase, announced before its first action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Add,
    Update,
    Delete,
}

impl Phase {
    /// Operator-facing banner line.
    pub fn banner(self) -> &'static str {
        match self {
            Phase::Add => "Add missing files",
            Phase::Update => "Update changed files",
            Phase::Delete => "Delete removed files",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.banner())
    }
}

/// Event handed to the progress observer as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    PhaseStarted(Phase),
    /// Emitted after the action completed against the backend.
    Action(&'a FileAction),
}

// ---------------------------------------------------------------------------
// synchronize
// ---------------------------------------------------------------------------

/// Make `backend` mirror the files under `local_root`.
pub fn synchronize<B>(local_root: &Path, backend: &mut B) -> Result<RunReport, SyncError>
where
    B: StorageBackend + ?Sized,
{
    synchronize_with(local_root, backend, |_| {})
}

/// [`synchronize`], reporting each phase and completed action to `on_progress`.
pub fn synchronize_with<B, F>(
    local_root: &Path,
    backend: &mut B,
    mut on_progress: F,
) -> Result<RunReport, SyncError>
where
    B: StorageBackend + ?Sized,
    F: FnMut(Progress<'_>),
{
    let started_at = Utc::now();
    local::ensure_root(local_root)?;

    // Enumerate
    let remote = enumerate_remote(backend)?;
    let local = local::scan(local_root)?;
    let plan = partition(&local, &remote);
    tracing::info!(
        "plan: {} to add, {} to check, {} to delete",
        plan.to_add.len(),
        plan.to_check.len(),
        plan.to_delete.len()
    );

    let mut actions = Vec::new();
    let mut record = |action: FileAction, on_progress: &mut F| {
        on_progress(Progress::Action(&action));
        actions.push(action);
    };

    // Add
    on_progress(Progress::PhaseStarted(Phase::Add));
    for key in &plan.to_add {
        let (content, hash) = local[key].read_hashed()?;
        backend
            .put(key, content)
            .map_err(|e| transfer_err(Operation::Put, key, e))?;
        tracing::info!("added: {key}");
        record(
            FileAction::Added {
                key: key.clone(),
                hash,
            },
            &mut on_progress,
        );
    }

    // Update
    on_progress(Progress::PhaseStarted(Phase::Update));
    for key in &plan.to_check {
        let (content, hash) = local[key].read_hashed()?;
        let fingerprint = &remote[key].fingerprint;
        if fingerprint.matches(&hash) {
            tracing::debug!("unchanged: {key}");
            record(
                FileAction::Unchanged {
                    key: key.clone(),
                    hash,
                },
                &mut on_progress,
            );
            continue;
        }
        backend
            .put(key, content)
            .map_err(|e| transfer_err(Operation::Put, key, e))?;
        tracing::info!("updated: {key} ({fingerprint} -> {hash})");
        record(
            FileAction::Updated {
                key: key.clone(),
                old_hash: fingerprint.clone(),
                new_hash: hash,
            },
            &mut on_progress,
        );
    }

    // Delete
    on_progress(Progress::PhaseStarted(Phase::Delete));
    for key in &plan.to_delete {
        backend
            .delete(&remote[key].handle)
            .map_err(|e| transfer_err(Operation::Delete, key, e))?;
        tracing::info!("deleted: {key}");
        record(FileAction::Deleted { key: key.clone() }, &mut on_progress);
    }

    Ok(RunReport {
        started_at,
        finished_at: Utc::now(),
        actions,
    })
}

/// List the backend into a key-indexed map, rejecting duplicate keys.
fn enumerate_remote<B>(backend: &B) -> Result<BTreeMap<RelativeKey, RemoteObject>, SyncError>
where
    B: StorageBackend + ?Sized,
{
    let listed = backend.list().map_err(SyncError::BackendList)?;
    let mut remote = BTreeMap::new();
    for object in listed {
        let key = object.key.clone();
        if remote.insert(key.clone(), object).is_some() {
            return Err(SyncError::BackendList(BackendError::InvalidObject {
                reason: format!("duplicate key '{key}' in listing"),
            }));
        }
    }
    tracing::debug!("remote listing: {} objects", remote.len());
    Ok(remote)
}
