//! Helper functions for common reconciliation patterns
//!
//! Inventory kinds share one diff: desired and actual records are matched by
//! identity key and sorted into create, update and delete sets.

use std::collections::BTreeMap;

/// Outcome of diffing desired records against actual records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan<T> {
    /// Desired, absent from actual
    pub create: Vec<T>,
    /// Present in both but different; holds the desired record
    pub update: Vec<T>,
    /// Actual, absent from desired
    pub delete: Vec<T>,
}

impl<T> SyncPlan<T> {
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Diff by identity key. Duplicate keys collapse to the last record; every
/// output list is ordered by key.
pub fn plan_sync<T, K, FKey, FDiffers>(
    desired: &[T],
    actual: &[T],
    key: FKey,
    differs: FDiffers,
) -> SyncPlan<T>
where
    T: Clone,
    K: Ord,
    FKey: Fn(&T) -> K,
    FDiffers: Fn(&T, &T) -> bool,
{
    let desired: BTreeMap<K, &T> = desired.iter().map(|d| (key(d), d)).collect();
    let actual: BTreeMap<K, &T> = actual.iter().map(|a| (key(a), a)).collect();

    let mut plan = SyncPlan {
        create: Vec::new(),
        update: Vec::new(),
        delete: Vec::new(),
    };
    for (k, wanted) in &desired {
        match actual.get(k) {
            None => plan.create.push((*wanted).clone()),
            Some(existing) if differs(wanted, existing) => plan.update.push((*wanted).clone()),
            Some(_) => {}
        }
    }
    for (k, existing) in &actual {
        if !desired.contains_key(k) {
            plan.delete.push((*existing).clone());
        }
    }
    plan
}
