//! Local package feeds backed by TOML files.
//!
//! A feed file lists packages with their versions, supported frameworks and declared
//! dependencies:
//!
//! ```toml
//! [[packages]]
//! id = "Contoso.Core"
//! version = "1.2.0"
//! frameworks = ["net8.0", "netstandard2.0"]   # optional; empty means any framework
//! dependencies = [
//!     { id = "Contoso.Abstractions", range = "[1.0.0, )" },
//! ]
//! ```
//!
//! [`LocalFeed`] answers dependency queries from memory. [`FeedSource`] pairs a feed with a
//! source name; a `FeedSource` without a feed is a source with no query capability.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::{BatchQuery, DependencyQuery, PackageSource, SourceKey};
use crate::core::{PackageId, PackageIdentity};
use crate::models::{DependencyInfo, Framework, PackageDependency};

/// One package version in a feed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPackage {
    /// Package id
    pub id: PackageId,
    /// Package version
    pub version: semver::Version,
    /// Frameworks this version supports; empty supports every framework
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

impl FeedPackage {
    /// The identity of this package version.
    #[must_use]
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(self.id.clone(), self.version.clone())
    }

    fn supports(&self, framework: &Framework) -> bool {
        framework.is_any()
            || self.frameworks.is_empty()
            || self.frameworks.iter().any(|f| f.as_str().eq_ignore_ascii_case(framework.as_str()))
    }

    fn to_info(&self) -> DependencyInfo {
        DependencyInfo {
            identity: self.identity(),
            dependencies: self.dependencies.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FeedFile {
    #[serde(default)]
    packages: Vec<FeedPackage>,
}

/// An in-memory feed that answers dependency queries.
#[derive(Debug, Clone, Default)]
pub struct LocalFeed {
    packages: Vec<FeedPackage>,
}

impl LocalFeed {
    /// Create a feed from package entries.
    #[must_use]
    pub const fn new(packages: Vec<FeedPackage>) -> Self {
        Self {
            packages,
        }
    }

    /// Parse a feed from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: FeedFile = toml::from_str(content).context("Failed to parse feed file")?;
        Ok(Self::new(file.packages))
    }

    /// Load a feed file from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read feed file: {}", path.display()))?;
        let feed = Self::from_toml(&content)
            .with_context(|| format!("Invalid feed file: {}", path.display()))?;
        tracing::debug!("Loaded {} package(s) from feed {}", feed.packages.len(), path.display());
        Ok(feed)
    }

    /// Package entries in file order.
    #[must_use]
    pub fn packages(&self) -> &[FeedPackage] {
        &self.packages
    }

    fn versions_of<'a>(
        &'a self,
        id: &'a PackageId,
        framework: &'a Framework,
        include_prerelease: bool,
    ) -> impl Iterator<Item = &'a FeedPackage> + 'a {
        self.packages.iter().filter(move |p| {
            &p.id == id && p.supports(framework) && (include_prerelease || p.version.pre.is_empty())
        })
    }

    fn exact<'a>(
        &'a self,
        identity: &'a PackageIdentity,
        framework: &'a Framework,
    ) -> Option<&'a FeedPackage> {
        self.packages
            .iter()
            .find(|p| p.id == identity.id && p.version == identity.version && p.supports(framework))
    }
}

#[async_trait]
impl DependencyQuery for LocalFeed {
    async fn resolve_batch(
        &self,
        query: &BatchQuery,
        framework: &Framework,
        include_prerelease: bool,
    ) -> Result<Vec<DependencyInfo>> {
        let infos = match query {
            BatchQuery::Ids(ids) => ids
                .iter()
                .flat_map(|id| self.versions_of(id, framework, include_prerelease))
                .map(FeedPackage::to_info)
                .collect(),
            // An exact version is returned even when it is a prerelease.
            BatchQuery::Identities(identities) => identities
                .iter()
                .filter_map(|identity| self.exact(identity, framework))
                .map(FeedPackage::to_info)
                .collect(),
        };
        Ok(infos)
    }

    async fn resolve_one(
        &self,
        id: &PackageId,
        framework: &Framework,
        include_prerelease: bool,
        _cancel: &CancellationToken,
    ) -> Result<Vec<DependencyInfo>> {
        Ok(self.versions_of(id, framework, include_prerelease).map(FeedPackage::to_info).collect())
    }
}

/// A named source backed by an optional [`LocalFeed`].
#[derive(Debug, Clone)]
pub struct FeedSource {
    key: SourceKey,
    feed: Option<Arc<LocalFeed>>,
}

impl FeedSource {
    /// Create a source. Passing `None` yields a source with no query capability.
    pub fn new(name: impl AsRef<str>, feed: Option<LocalFeed>) -> Self {
        Self {
            key: SourceKey::new(name),
            feed: feed.map(Arc::new),
        }
    }
}

impl PackageSource for FeedSource {
    fn key(&self) -> SourceKey {
        self.key.clone()
    }

    fn dependency_query(&self) -> Option<Arc<dyn DependencyQuery>> {
        self.feed.clone().map(|feed| feed as Arc<dyn DependencyQuery>)
    }
}
