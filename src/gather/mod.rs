//! Cross-source dependency gathering.
//!
//! A single source may know a package but not every package it depends on; dependency
//! edges cross sources. Gathering keeps asking every source about every id discovered
//! anywhere until no source has an id left to check, producing the deduplicated metadata
//! set a version resolver needs.
//!
//! # Run Sequence
//!
//! ```text
//! INIT -> SEED_PRIMARY -> VERIFY_PRIMARY --(missing)--> PackageNotFound
//!                              |
//!                              v
//!                          SEED_ALL -> EXPAND* -> DONE
//! ```
//!
//! Cancellation can end the run from any non-terminal step with [`GatherError::Cancelled`].
//! A failing source query ends it with [`GatherError::Query`]. In both cases no partial
//! result is returned.
//!
//! # State Ownership
//!
//! [`gather_with_stats`] owns the [`VisitedTracker`] and [`ResultAccumulator`] for the
//! whole run and lends them mutably to the seeding and expansion steps in turn. Only one
//! query is in flight at a time, so neither needs synchronization.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use depgather::config::ResolutionContext;
//! use depgather::core::PackageId;
//! use depgather::gather::{GatherRequest, gather};
//! use depgather::models::Framework;
//! use depgather::source::{FeedSource, LocalFeed, PackageSource};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let feed = LocalFeed::load("feeds/main.toml".as_ref()).await?;
//! let sources: Vec<Arc<dyn PackageSource>> = vec![Arc::new(FeedSource::new("main", Some(feed)))];
//! let targets = vec![PackageId::new("Contoso.Core")];
//!
//! let gathered = gather(
//!     &ResolutionContext::default(),
//!     GatherRequest {
//!         primary_targets: &targets,
//!         all_targets: &targets,
//!         framework: &Framework::any(),
//!         primary_sources: &sources,
//!         all_sources: &sources,
//!     },
//!     &CancellationToken::new(),
//! )
//! .await?;
//! println!("gathered {} package(s)", gathered.len());
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
mod expander;
mod merge;
mod seeder;
pub mod target;
pub mod tracker;


pub use accumulator::ResultAccumulator;
pub use target::{GatherTarget, SourceScope};
pub use tracker::VisitedTracker;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ResolutionContext;
use crate::core::GatherError;
use crate::models::{Framework, SourceDependencyInfo};
use crate::source::{CapabilitySet, PackageSource};

use seeder::{SeedOutcome, SeedPlan};

/// Inputs of one gather run.
///
/// `T` is either [`PackageId`](crate::core::PackageId) (any version) or
/// [`PackageIdentity`](crate::core::PackageIdentity) (exact version); a run never mixes
/// the two.
#[derive(Clone, Copy)]
pub struct GatherRequest<'a, T> {
    /// Targets the caller asked for explicitly; each must be found on a primary source
    pub primary_targets: &'a [T],
    /// Primary targets plus other packages already known to be relevant
    pub all_targets: &'a [T],
    /// Target framework passed to every query
    pub framework: &'a Framework,
    /// Sources the primary targets must be found on
    pub primary_sources: &'a [Arc<dyn PackageSource>],
    /// Every source available to the run
    pub all_sources: &'a [Arc<dyn PackageSource>],
}

/// Query counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatherStats {
    /// Batch queries issued while seeding
    pub batch_queries: usize,
    /// Single-id queries issued while expanding
    pub single_queries: usize,
    /// Expansion passes, including the final pass that found nothing to do
    pub expansion_passes: usize,
}

/// The gathered records and the counters of the run that produced them.
#[derive(Debug, Clone)]
pub struct GatherReport {
    /// Deduplicated records in the order they were gathered
    pub results: Vec<SourceDependencyInfo>,
    /// Query counters
    pub stats: GatherStats,
}

/// Read-only query parameters shared by every step of a run.
pub(crate) struct QuerySettings<'a> {
    pub framework: &'a Framework,
    pub include_prerelease: bool,
    pub cancel: &'a CancellationToken,
}

impl QuerySettings<'_> {
    /// Fail with [`GatherError::Cancelled`] if cancellation was requested.
    pub fn checkpoint(&self) -> Result<(), GatherError> {
        if self.cancel.is_cancelled() {
            tracing::debug!("Cancellation observed, aborting gather");
            return Err(GatherError::Cancelled);
        }
        Ok(())
    }

    /// Await a source query, abandoning it as soon as cancellation is requested.
    pub async fn run<F, R>(&self, query: F) -> Result<R, GatherError>
    where
        F: Future<Output = anyhow::Result<R>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(GatherError::Cancelled),
            result = query => result.map_err(GatherError::Query),
        }
    }
}

/// Gather dependency metadata for `request` across its sources.
///
/// Returns the deduplicated records in the order they were gathered. See the
/// [module documentation](self) for the run sequence.
pub async fn gather<T: GatherTarget>(
    context: &ResolutionContext,
    request: GatherRequest<'_, T>,
    cancel: &CancellationToken,
) -> Result<Vec<SourceDependencyInfo>, GatherError> {
    gather_with_stats(context, request, cancel).await.map(|report| report.results)
}

/// Like [`gather`], also returning the query counters of the run.
pub async fn gather_with_stats<T: GatherTarget>(
    context: &ResolutionContext,
    request: GatherRequest<'_, T>,
    cancel: &CancellationToken,
) -> Result<GatherReport, GatherError> {
    let settings = QuerySettings {
        framework: request.framework,
        include_prerelease: context.include_prerelease,
        cancel,
    };
    settings.checkpoint()?;

    let primary_capabilities = CapabilitySet::from_sources(request.primary_sources);
    let all_capabilities = CapabilitySet::from_sources(request.all_sources);

    let mut tracker = VisitedTracker::new();
    tracker.bootstrap(&primary_capabilities);
    tracker.bootstrap(&all_capabilities);

    let mut results = ResultAccumulator::new();
    let mut stats = GatherStats::default();

    let plan = SeedPlan {
        primary_targets: request.primary_targets,
        all_targets: request.all_targets,
        primary_capabilities: &primary_capabilities,
        all_capabilities: &all_capabilities,
    };
    match seeder::seed(plan, &settings, &mut tracker, &mut results, &mut stats).await? {
        SeedOutcome::Seeded => {}
        SeedOutcome::MissingTarget(target) => {
            return Err(GatherError::PackageNotFound {
                target,
            });
        }
    }

    expander::expand(&all_capabilities, &settings, &mut tracker, &mut results, &mut stats).await?;

    tracing::info!(
        "Gathered {} package(s) from {} source(s): {} batch and {} single queries over {} pass(es)",
        results.len(),
        all_capabilities.len(),
        stats.batch_queries,
        stats.single_queries,
        stats.expansion_passes
    );

    Ok(GatherReport {
        results: results.into_vec(),
        stats,
    })
}
