//! Per-run action log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use siteship_core::{ContentHash, Fingerprint, RelativeKey};

/// One thing that happened to one key during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FileAction {
    /// Uploaded because the key was missing remotely.
    Added { key: RelativeKey, hash: ContentHash },
    /// Re-uploaded because the remote fingerprint differed.
    Updated {
        key: RelativeKey,
        old_hash: Fingerprint,
        new_hash: ContentHash,
    },
    /// Left alone; fingerprint matched the local hash.
    Unchanged { key: RelativeKey, hash: ContentHash },
    /// Removed because the key no longer exists locally.
    Deleted { key: RelativeKey },
}

impl FileAction {
    pub fn key(&self) -> &RelativeKey {
        match self {
            FileAction::Added { key, .. }
            | FileAction::Updated { key, .. }
            | FileAction::Unchanged { key, .. }
            | FileAction::Deleted { key } => key,
        }
    }

    /// `true` for every action that touched the backend.
    pub fn is_transfer(&self) -> bool {
        !matches!(self, FileAction::Unchanged { .. })
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Added { key, .. } => write!(f, "Uploading new {key}"),
            FileAction::Updated {
                key,
                old_hash,
                new_hash,
            } => write!(f, "Uploading changed {key} ({old_hash} != {new_hash})"),
            FileAction::Unchanged { key, .. } => write!(f, "Unchanged {key}"),
            FileAction::Deleted { key } => write!(f, "Deleting removed {key}"),
        }
    }
}

/// Tally of actions by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

/// Everything a run did, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub actions: Vec<FileAction>,
}

impl RunReport {
    pub fn counts(&self) -> ActionCounts {
        let mut counts = ActionCounts::default();
        for action in &self.actions {
            match action {
                FileAction::Added { .. } => counts.added += 1,
                FileAction::Updated { .. } => counts.updated += 1,
                FileAction::Unchanged { .. } => counts.unchanged += 1,
                FileAction::Deleted { .. } => counts.deleted += 1,
            }
        }
        counts
    }

    /// Number of puts plus deletes issued.
    pub fn transfers(&self) -> usize {
        self.actions.iter().filter(|a| a.is_transfer()).count()
    }

    /// `true` when the bucket already mirrored the content root.
    pub fn is_noop(&self) -> bool {
        self.transfers() == 0
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
