//! The seeding passes.
//!
//! Seeding runs three steps:
//!
//! 1. **Primary pass** - the primary targets are batch-queried against the primary sources.
//! 2. **Verification** - every primary target must now be satisfied by a gathered record.
//!    The first unsatisfied target, in caller order, is reported and nothing more is queried.
//! 3. **Broader pass** - all targets are batch-queried against the sources selected by
//!    [`GatherTarget::BROADER_PASS_SCOPE`].

use crate::core::GatherError;
use crate::source::CapabilitySet;

use super::accumulator::ResultAccumulator;
use super::merge::merge_results;
use super::target::{GatherTarget, SourceScope};
use super::tracker::VisitedTracker;
use super::{GatherStats, QuerySettings};

/// Result of seeding, checked by the orchestrator before expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SeedOutcome {
    /// Every primary target was found; the broader pass ran.
    Seeded,
    /// This primary target was not found on any primary source.
    MissingTarget(String),
}

/// Targets and capability lists for one seeding run.
pub(crate) struct SeedPlan<'a, T> {
    pub primary_targets: &'a [T],
    pub all_targets: &'a [T],
    pub primary_capabilities: &'a CapabilitySet,
    pub all_capabilities: &'a CapabilitySet,
}

pub(crate) async fn seed<T: GatherTarget>(
    plan: SeedPlan<'_, T>,
    settings: &QuerySettings<'_>,
    tracker: &mut VisitedTracker,
    results: &mut ResultAccumulator,
    stats: &mut GatherStats,
) -> Result<SeedOutcome, GatherError> {
    tracing::debug!(
        "Seeding {} primary target(s) against {} primary source(s)",
        plan.primary_targets.len(),
        plan.primary_capabilities.len()
    );
    query_targets(plan.primary_targets, plan.primary_capabilities, settings, tracker, results, stats)
        .await?;

    if let Some(missing) = plan.primary_targets.iter().find(|target| !target.is_gathered(results)) {
        tracing::debug!("Primary target '{}' not found on any primary source", missing);
        return Ok(SeedOutcome::MissingTarget(missing.to_string()));
    }

    let broader = match T::BROADER_PASS_SCOPE {
        SourceScope::Primary => plan.primary_capabilities,
        SourceScope::All => plan.all_capabilities,
    };
    tracing::debug!(
        "Seeding {} target(s) against {} source(s)",
        plan.all_targets.len(),
        broader.len()
    );
    query_targets(plan.all_targets, broader, settings, tracker, results, stats).await?;

    Ok(SeedOutcome::Seeded)
}

/// Batch-query each source once with the targets that still need a query there.
///
/// Every id in a batch is marked visited at the source before the answer is merged,
/// whether or not the source knew the id.
async fn query_targets<T: GatherTarget>(
    targets: &[T],
    capabilities: &CapabilitySet,
    settings: &QuerySettings<'_>,
    tracker: &mut VisitedTracker,
    results: &mut ResultAccumulator,
    stats: &mut GatherStats,
) -> Result<(), GatherError> {
    for (source, query) in capabilities.iter() {
        settings.checkpoint()?;

        let pending: Vec<&T> = targets.iter().filter(|target| target.needs_query(results)).collect();
        if pending.is_empty() {
            tracing::trace!("Nothing left to seed at '{}'", source);
            continue;
        }

        let request = T::batch_query(&pending);
        let visited = tracker.visited_mut(source);
        for id in request.ids() {
            visited.insert(id.clone());
        }

        tracing::debug!("Batch query of {} target(s) at '{}'", request.len(), source);
        stats.batch_queries += 1;
        let infos = settings
            .run(query.resolve_batch(&request, settings.framework, settings.include_prerelease))
            .await?;

        merge_results(source, tracker.visited_mut(source), infos, results);
    }
    Ok(())
}
