//! The expansion loop.
//!
//! Each pass takes the union of every id visited at any source and asks each source about
//! the ids it has not covered yet, one id at a time. A pass that issues no query is the
//! fixpoint and ends the loop.
//!
//! Visited sets only grow, and an id enters one only because it was queried or because a
//! source reported it. A finite dependency graph therefore yields a finite id universe, and
//! the loop issues at most one single-id query per (source, id) pair.

use crate::core::GatherError;
use crate::source::CapabilitySet;

use super::accumulator::ResultAccumulator;
use super::merge::merge_results;
use super::tracker::VisitedTracker;
use super::{GatherStats, QuerySettings};

pub(crate) async fn expand(
    capabilities: &CapabilitySet,
    settings: &QuerySettings<'_>,
    tracker: &mut VisitedTracker,
    results: &mut ResultAccumulator,
    stats: &mut GatherStats,
) -> Result<(), GatherError> {
    loop {
        stats.expansion_passes += 1;
        let discovered = tracker.all_discovered();
        let mut complete = true;

        tracing::debug!(
            "Expansion pass {} over {} discovered id(s)",
            stats.expansion_passes,
            discovered.len()
        );

        for (source, query) in capabilities.iter() {
            settings.checkpoint()?;

            let missing = tracker.missing_at(source, &discovered);
            if missing.is_empty() {
                continue;
            }
            complete = false;

            tracing::debug!("Source '{}' has {} unchecked id(s)", source, missing.len());
            for id in missing {
                settings.checkpoint()?;

                tracker.mark(source, id.clone());
                stats.single_queries += 1;
                let infos = settings
                    .run(query.resolve_one(
                        &id,
                        settings.framework,
                        settings.include_prerelease,
                        settings.cancel,
                    ))
                    .await?;

                tracing::trace!("'{}' returned {} record(s) for '{}'", source, infos.len(), id);
                merge_results(source, tracker.visited_mut(source), infos, results);
            }
        }

        if complete {
            return Ok(());
        }
    }
}
