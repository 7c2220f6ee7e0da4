//! Per-source visited-id bookkeeping.
//!
//! For every usable source the tracker records which ids that source has already been
//! asked about, or has already described as a dependency of something it returned. Sets
//! only ever grow during a run. That monotonicity is what bounds the expansion loop.

use std::collections::{BTreeSet, HashMap};

use crate::core::PackageId;
use crate::source::{CapabilitySet, SourceKey};

/// Mapping from source to the ids already covered at that source.
#[derive(Debug, Default)]
pub struct VisitedTracker {
    visited: HashMap<SourceKey, BTreeSet<PackageId>>,
}

impl VisitedTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure every source in `capabilities` has an entry. Existing entries are kept.
    pub fn bootstrap(&mut self, capabilities: &CapabilitySet) {
        for key in capabilities.keys() {
            self.visited.entry(key.clone()).or_default();
        }
    }

    /// Whether `source` has an entry.
    #[must_use]
    pub fn is_tracked(&self, source: &SourceKey) -> bool {
        self.visited.contains_key(source)
    }

    /// The visited set of `source`, created empty if missing.
    pub fn visited_mut(&mut self, source: &SourceKey) -> &mut BTreeSet<PackageId> {
        self.visited.entry(source.clone()).or_default()
    }

    /// The visited set of `source`, if tracked.
    #[must_use]
    pub fn visited_at(&self, source: &SourceKey) -> Option<&BTreeSet<PackageId>> {
        self.visited.get(source)
    }

    /// Record `id` as visited at `source`. Returns `true` if it was new there.
    pub fn mark(&mut self, source: &SourceKey, id: PackageId) -> bool {
        self.visited_mut(source).insert(id)
    }

    /// Union of every id visited at any source.
    #[must_use]
    pub fn all_discovered(&self) -> BTreeSet<PackageId> {
        self.visited.values().flatten().cloned().collect()
    }

    /// Ids in `discovered` not yet visited at `source`, in ascending order.
    #[must_use]
    pub fn missing_at(&self, source: &SourceKey, discovered: &BTreeSet<PackageId>) -> Vec<PackageId> {
        match self.visited.get(source) {
            Some(seen) => discovered.difference(seen).cloned().collect(),
            None => discovered.iter().cloned().collect(),
        }
    }
}
