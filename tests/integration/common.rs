//! Shared helpers for integration tests.

use std::sync::Arc;

use depgather::config::ResolutionContext;
use depgather::core::{GatherError, PackageId, PackageIdentity};
use depgather::gather::{GatherReport, GatherRequest, GatherTarget, gather_with_stats};
use depgather::models::{DependencyInfo, Framework, SourceDependencyInfo};
use depgather::source::PackageSource;
use tokio_util::sync::CancellationToken;

pub fn info(identity: &str) -> DependencyInfo {
    DependencyInfo::new(identity.parse().expect("valid identity"))
}

pub fn ids(names: &[&str]) -> Vec<PackageId> {
    names.iter().map(|name| PackageId::new(*name)).collect()
}

pub fn identities(names: &[&str]) -> Vec<PackageIdentity> {
    names.iter().map(|name| name.parse().expect("valid identity")).collect()
}

/// `identity from source` lines, in result order.
pub fn rendered(results: &[SourceDependencyInfo]) -> Vec<String> {
    results.iter().map(|r| format!("{} from {}", r.identity(), r.source)).collect()
}

/// Run a gather with default context, the `any` framework and a fresh token.
pub async fn gather_all<T: GatherTarget>(
    primary: &[T],
    all: &[T],
    primary_sources: &[Arc<dyn PackageSource>],
    all_sources: &[Arc<dyn PackageSource>],
) -> Result<GatherReport, GatherError> {
    gather_with_cancel(primary, all, primary_sources, all_sources, &CancellationToken::new()).await
}

pub async fn gather_with_cancel<T: GatherTarget>(
    primary: &[T],
    all: &[T],
    primary_sources: &[Arc<dyn PackageSource>],
    all_sources: &[Arc<dyn PackageSource>],
    cancel: &CancellationToken,
) -> Result<GatherReport, GatherError> {
    depgather::test_utils::init_test_logging(None);
    gather_with_stats(
        &ResolutionContext::default(),
        GatherRequest {
            primary_targets: primary,
            all_targets: all,
            framework: &Framework::any(),
            primary_sources,
            all_sources,
        },
        cancel,
    )
    .await
}
