//! Deduplicated result set.

use std::collections::{HashMap, HashSet};

use crate::core::{PackageId, PackageIdentity};
use crate::models::{DependencyInfo, SourceDependencyInfo};
use crate::source::SourceKey;

/// The gathered records, keyed by package identity.
///
/// The first record inserted for an identity wins; later records for the same identity
/// are dropped even when they come from a different source. Records are kept in
/// insertion order.
#[derive(Debug, Default)]
pub struct ResultAccumulator {
    records: Vec<SourceDependencyInfo>,
    identities: HashSet<PackageIdentity>,
    by_id: HashMap<PackageId, Vec<usize>>,
}

impl ResultAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `info` as returned by `source`. Returns `false` if the identity was already
    /// present, in which case nothing changes.
    pub fn insert(&mut self, info: DependencyInfo, source: SourceKey) -> bool {
        if !self.identities.insert(info.identity.clone()) {
            return false;
        }
        self.by_id.entry(info.identity.id.clone()).or_default().push(self.records.len());
        self.records.push(SourceDependencyInfo::new(info, source));
        true
    }

    /// Whether a record for exactly `identity` is present.
    #[must_use]
    pub fn contains_identity(&self, identity: &PackageIdentity) -> bool {
        self.identities.contains(identity)
    }

    /// Whether a record for any version of `id` is present.
    #[must_use]
    pub fn contains_id(&self, id: &PackageId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Records for any version of `id`, in insertion order.
    pub fn records_for<'a>(
        &'a self,
        id: &PackageId,
    ) -> impl Iterator<Item = &'a SourceDependencyInfo> + 'a {
        let positions = self.by_id.get(id).map(Vec::as_slice).unwrap_or_default();
        positions.iter().map(|&position| &self.records[position])
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceDependencyInfo> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been gathered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the accumulator, returning its records in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<SourceDependencyInfo> {
        self.records
    }
}
