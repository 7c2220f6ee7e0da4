//! Folding a source's answer into the run state.

use std::collections::BTreeSet;

use crate::core::PackageId;
use crate::models::DependencyInfo;
use crate::source::SourceKey;

use super::accumulator::ResultAccumulator;

/// Merge the records `source` returned.
///
/// Each record is offered to the accumulator, then its own id and the id of every
/// dependency it declares are marked visited at `source`. Dependency ids are marked even
/// though `source` was never asked about them, so expansion will not query `source` for
/// those ids later; other sources still are.
pub(crate) fn merge_results(
    source: &SourceKey,
    visited: &mut BTreeSet<PackageId>,
    infos: Vec<DependencyInfo>,
    results: &mut ResultAccumulator,
) {
    for info in infos {
        visited.insert(info.identity.id.clone());
        for dependency_id in info.dependency_ids() {
            if visited.insert(dependency_id.clone()) {
                tracing::trace!(
                    "Marked dependency '{}' of {} as visited at '{}'",
                    dependency_id,
                    info.identity,
                    source
                );
            }
        }

        let identity = info.identity.clone();
        if results.insert(info, source.clone()) {
            tracing::debug!("Gathered {} from '{}'", identity, source);
        } else {
            tracing::trace!("Dropped duplicate {} from '{}'", identity, source);
        }
    }
}
