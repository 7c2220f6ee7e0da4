//! Query targets.
//!
//! A gather run seeds with one kind of target throughout: either bare ids ("any version of
//! X") or exact identities ("X at version V"). [`GatherTarget`] captures everything that
//! differs between the two so the seeding pass has a single code path.

use std::fmt;

use crate::core::{PackageId, PackageIdentity};
use crate::source::BatchQuery;

use super::accumulator::ResultAccumulator;

/// Which capability list the broader seeding pass queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceScope {
    /// Only the primary sources
    Primary,
    /// Every source
    All,
}

/// A seeding target: a bare [`PackageId`] or an exact [`PackageIdentity`].
pub trait GatherTarget: Clone + fmt::Display + Send + Sync {
    /// Sources queried by the broader pass over all targets.
    ///
    /// Id targets stay on the primary sources and identity targets go to every source.
    /// Sources skipped here are still reached by expansion.
    const BROADER_PASS_SCOPE: SourceScope;

    /// The id this target looks up.
    fn lookup_id(&self) -> &PackageId;

    /// Whether a gathered identity satisfies this target.
    fn is_satisfied_by(&self, identity: &PackageIdentity) -> bool;

    /// Whether the accumulator already holds a record satisfying this target.
    fn is_gathered(&self, results: &ResultAccumulator) -> bool {
        results.records_for(self.lookup_id()).any(|record| self.is_satisfied_by(record.identity()))
    }

    /// Whether a seeding pass still has to ask sources about this target.
    fn needs_query(&self, _results: &ResultAccumulator) -> bool {
        true
    }

    /// Build the batch request for `targets`.
    fn batch_query(targets: &[&Self]) -> BatchQuery;
}

impl GatherTarget for PackageId {
    const BROADER_PASS_SCOPE: SourceScope = SourceScope::Primary;

    fn lookup_id(&self) -> &PackageId {
        self
    }

    fn is_satisfied_by(&self, identity: &PackageIdentity) -> bool {
        &identity.id == self
    }

    fn batch_query(targets: &[&Self]) -> BatchQuery {
        BatchQuery::Ids(targets.iter().map(|id| (*id).clone()).collect())
    }
}

impl GatherTarget for PackageIdentity {
    const BROADER_PASS_SCOPE: SourceScope = SourceScope::All;

    fn lookup_id(&self) -> &PackageId {
        &self.id
    }

    fn is_satisfied_by(&self, identity: &PackageIdentity) -> bool {
        identity == self
    }

    // Exact identities already gathered from an earlier source are not asked for again.
    fn needs_query(&self, results: &ResultAccumulator) -> bool {
        !self.is_gathered(results)
    }

    fn batch_query(targets: &[&Self]) -> BatchQuery {
        BatchQuery::Identities(targets.iter().map(|identity| (*identity).clone()).collect())
    }
}
