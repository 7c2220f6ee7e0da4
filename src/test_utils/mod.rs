//! Test utilities for depgather
//!
//! Provides logging setup for tests and [`ScriptedSource`], a package source whose answers
//! are fixed up front and which records every query it receives. Scripted sources can also
//! fail or trigger cancellation when asked about a particular id, which lets tests drive a
//! gather run into each of its failure modes.
//!
//! # Example
//!
//! ```rust,no_run
//! use depgather::models::DependencyInfo;
//! use depgather::test_utils::ScriptedSource;
//!
//! let source = ScriptedSource::new("s1")
//!     .with_package(DependencyInfo::new("A@1.0.0".parse().unwrap()).with_dependency("B", "[1.0,)"));
//! assert!(!source.was_queried_for("A"));
//! ```

use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::PackageId;
use crate::models::{DependencyInfo, Framework};
use crate::source::{BatchQuery, DependencyQuery, PackageSource, SourceKey};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise `RUST_LOG` when
/// set, otherwise leaves logging off.
///
/// ```bash
/// RUST_LOG=depgather=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// One query received by a [`ScriptedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedQuery {
    /// A seeding batch, with the ids it named
    Batch(Vec<PackageId>),
    /// A single-id expansion query
    One(PackageId),
}

#[derive(Default)]
struct Script {
    packages: Vec<DependencyInfo>,
    fail_on: Option<PackageId>,
    cancel_on: Option<(PackageId, CancellationToken)>,
    log: Mutex<Vec<RecordedQuery>>,
}

impl Script {
    fn record(&self, query: RecordedQuery) {
        self.log.lock().unwrap().push(query);
    }

    fn react_to(&self, id: &PackageId) -> Result<()> {
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == id {
                token.cancel();
            }
        }
        if self.fail_on.as_ref() == Some(id) {
            anyhow::bail!("scripted failure for '{id}'");
        }
        Ok(())
    }
}

#[async_trait]
impl DependencyQuery for Script {
    async fn resolve_batch(
        &self,
        query: &BatchQuery,
        _framework: &Framework,
        _include_prerelease: bool,
    ) -> Result<Vec<DependencyInfo>> {
        self.record(RecordedQuery::Batch(query.ids().cloned().collect()));
        for id in query.ids() {
            self.react_to(id)?;
        }

        let infos = match query {
            BatchQuery::Ids(ids) => {
                self.packages.iter().filter(|p| ids.contains(&p.identity.id)).cloned().collect()
            }
            BatchQuery::Identities(identities) => {
                self.packages.iter().filter(|p| identities.contains(&p.identity)).cloned().collect()
            }
        };
        Ok(infos)
    }

    async fn resolve_one(
        &self,
        id: &PackageId,
        _framework: &Framework,
        _include_prerelease: bool,
        _cancel: &CancellationToken,
    ) -> Result<Vec<DependencyInfo>> {
        self.record(RecordedQuery::One(id.clone()));
        self.react_to(id)?;
        Ok(self.packages.iter().filter(|p| &p.identity.id == id).cloned().collect())
    }
}

/// A package source with fixed answers that records the queries it receives.
///
/// Clones share the same query log.
#[derive(Clone)]
pub struct ScriptedSource {
    key: SourceKey,
    script: Arc<Script>,
    capability: bool,
}

impl ScriptedSource {
    /// Create a source that knows no packages.
    pub fn new(name: &str) -> Self {
        Self {
            key: SourceKey::new(name),
            script: Arc::new(Script::default()),
            capability: true,
        }
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::get_mut(&mut self.script).expect("configure ScriptedSource before cloning it")
    }

    /// Add a package this source answers with.
    #[must_use]
    pub fn with_package(mut self, info: DependencyInfo) -> Self {
        self.script_mut().packages.push(info);
        self
    }

    /// Fail any query that names `id`.
    #[must_use]
    pub fn failing_on(mut self, id: &str) -> Self {
        self.script_mut().fail_on = Some(PackageId::new(id));
        self
    }

    /// Cancel `token` when a query names `id`. The query itself still succeeds.
    #[must_use]
    pub fn cancelling_on(mut self, id: &str, token: CancellationToken) -> Self {
        self.script_mut().cancel_on = Some((PackageId::new(id), token));
        self
    }

    /// Expose no dependency query capability.
    #[must_use]
    pub const fn without_capability(mut self) -> Self {
        self.capability = false;
        self
    }

    /// Wrap as a shared [`PackageSource`] handle.
    #[must_use]
    pub fn into_source(self) -> Arc<dyn PackageSource> {
        Arc::new(self)
    }

    /// Every query received so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.script.log.lock().unwrap().clone()
    }

    /// Whether any query named `id`.
    #[must_use]
    pub fn was_queried_for(&self, id: &str) -> bool {
        let id = PackageId::new(id);
        self.queries().iter().any(|query| match query {
            RecordedQuery::Batch(ids) => ids.contains(&id),
            RecordedQuery::One(one) => one == &id,
        })
    }

    /// Number of single-id queries for `id`.
    #[must_use]
    pub fn single_queries_for(&self, id: &str) -> usize {
        let id = PackageId::new(id);
        self.queries().iter().filter(|query| matches!(query, RecordedQuery::One(one) if one == &id)).count()
    }
}

impl PackageSource for ScriptedSource {
    fn key(&self) -> SourceKey {
        self.key.clone()
    }

    fn dependency_query(&self) -> Option<Arc<dyn DependencyQuery>> {
        self.capability.then(|| Arc::clone(&self.script) as Arc<dyn DependencyQuery>)
    }
}
