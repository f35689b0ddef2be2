//! Diff between persisted and freshly extracted binding keys.

use std::collections::{BTreeMap, BTreeSet};

/// Keys to add to and remove from a persisted section map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Keys extracted from the template but absent from the record.
    pub to_add: BTreeSet<String>,
    /// Keys persisted but no longer bound in the template.
    pub to_remove: BTreeSet<String>,
}

impl ReconcilePlan {
    /// True when the record already matches the template.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// `to_add = extracted - existing`, `to_remove = existing - extracted`.
/// Keys present on both sides are left alone so persisted edits survive.
#[must_use]
pub fn reconcile<V>(existing: &BTreeSet<String>, extracted: &BTreeMap<String, V>) -> ReconcilePlan {
    let to_add = extracted
        .keys()
        .filter(|key| !existing.contains(*key))
        .cloned()
        .collect();
    let to_remove = existing
        .iter()
        .filter(|key| !extracted.contains_key(*key))
        .cloned()
        .collect();
    ReconcilePlan { to_add, to_remove }
}
