//! Three-way key partition.

use std::collections::{BTreeMap, BTreeSet};

use siteship_core::RelativeKey;

/// Disjoint key batches driving the add, update and delete phases.
///
/// Order inside each batch carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Present locally, absent remotely.
    pub to_add: Vec<RelativeKey>,
    /// Present on both sides; update candidates.
    pub to_check: Vec<RelativeKey>,
    /// Present remotely, absent locally.
    pub to_delete: Vec<RelativeKey>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_check.is_empty() && self.to_delete.is_empty()
    }
}

/// Partition the key sets of `local` and `remote` with plain set algebra.
pub fn partition<L, R>(
    local: &BTreeMap<RelativeKey, L>,
    remote: &BTreeMap<RelativeKey, R>,
) -> Plan {
    let local_keys: BTreeSet<&RelativeKey> = local.keys().collect();
    let remote_keys: BTreeSet<&RelativeKey> = remote.keys().collect();

    Plan {
        to_add: local_keys
            .difference(&remote_keys)
            .map(|k| (*k).clone())
            .collect(),
        to_check: local_keys
            .intersection(&remote_keys)
            .map(|k| (*k).clone())
            .collect(),
        to_delete: remote_keys
            .difference(&local_keys)
            .map(|k| (*k).clone())
            .collect(),
    }
}
