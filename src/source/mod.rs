//! Package sources and their dependency-query capability.
//!
//! A source is an independent provider of package metadata. Some sources can answer
//! "what does this package depend on" queries, others cannot; the ones that can expose a
//! [`DependencyQuery`] through [`PackageSource::dependency_query`]. Sources without the
//! capability take no part in a gather run. That is not an error.
//!
//! # Components
//!
//! - [`SourceKey`] - stable name used to key per-source state
//! - [`DependencyQuery`] - the async query capability (batch and single-id forms)
//! - [`PackageSource`] - a source handle that may expose the capability
//! - [`CapabilitySet`] - ordered `SourceKey -> capability` mapping for one run
//! - [`local`] - TOML-backed feeds usable as real sources and in tests

pub mod local;

pub use local::{FeedPackage, FeedSource, LocalFeed};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use tokio_util::sync::CancellationToken;

use crate::core::{PackageId, PackageIdentity};
use crate::models::{DependencyInfo, Framework};

/// Stable identity of a source.
///
/// Cheap to clone. Equality, hashing and ordering use the name, so two handles built from
/// the same name refer to the same source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(Arc<str>);

impl SourceKey {
    /// Create a key from a source name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The source name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A batch request issued while seeding.
///
/// A gather run seeds with either ids or exact identities, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchQuery {
    /// Any version of each id
    Ids(Vec<PackageId>),
    /// Exactly these identities
    Identities(Vec<PackageIdentity>),
}

impl BatchQuery {
    /// Number of entries in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Identities(identities) => identities.len(),
        }
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids named by the batch, in request order.
    pub fn ids(&self) -> Box<dyn Iterator<Item = &PackageId> + '_> {
        match self {
            Self::Ids(ids) => Box::new(ids.iter()),
            Self::Identities(identities) => Box::new(identities.iter().map(|i| &i.id)),
        }
    }
}

/// A source's ability to answer dependency queries.
///
/// Implementations are stateless from the gatherer's point of view: every call is
/// independent, and a source may return nothing for ids it does not know. Errors are
/// returned as [`anyhow::Error`] and reach the caller of the gather run untouched.
#[async_trait]
pub trait DependencyQuery: Send + Sync {
    /// Resolve a batch of ids or identities. Used while seeding.
    async fn resolve_batch(
        &self,
        query: &BatchQuery,
        framework: &Framework,
        include_prerelease: bool,
    ) -> Result<Vec<DependencyInfo>>;

    /// Resolve every matching version of a single id. Used while expanding.
    async fn resolve_one(
        &self,
        id: &PackageId,
        framework: &Framework,
        include_prerelease: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<DependencyInfo>>;
}

/// A handle to a package source.
pub trait PackageSource: Send + Sync {
    /// Stable key for this source.
    fn key(&self) -> SourceKey;

    /// The dependency-query capability, if this source has one.
    fn dependency_query(&self) -> Option<Arc<dyn DependencyQuery>>;
}

/// The usable sources for a run, keyed by [`SourceKey`] and kept in caller order.
///
/// Built once per run from a source list. Sources without a capability are left out.
/// If two sources share a key, the first one wins.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    order: Vec<SourceKey>,
    by_source: HashMap<SourceKey, Arc<dyn DependencyQuery>>,
}

impl CapabilitySet {
    /// Collect the capabilities of `sources`, skipping sources without one.
    pub fn from_sources(sources: &[Arc<dyn PackageSource>]) -> Self {
        let mut set = Self::default();
        for source in sources {
            let key = source.key();
            let Some(query) = source.dependency_query() else {
                tracing::debug!("Source '{}' has no dependency query capability, skipping", key);
                continue;
            };
            if set.by_source.contains_key(&key) {
                tracing::warn!("Source '{}' listed more than once, keeping the first entry", key);
                continue;
            }
            set.order.push(key.clone());
            set.by_source.insert(key, query);
        }
        set
    }

    /// Iterate `(key, capability)` pairs in caller order.
    pub fn iter(&self) -> impl Iterator<Item = (&SourceKey, &Arc<dyn DependencyQuery>)> {
        self.order.iter().filter_map(|key| self.by_source.get(key).map(|query| (key, query)))
    }

    /// Source keys in caller order.
    pub fn keys(&self) -> impl Iterator<Item = &SourceKey> {
        self.order.iter()
    }

    /// Look up the capability for a source.
    #[must_use]
    pub fn get(&self, key: &SourceKey) -> Option<&Arc<dyn DependencyQuery>> {
        self.by_source.get(key)
    }

    /// Number of usable sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no source is usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}
