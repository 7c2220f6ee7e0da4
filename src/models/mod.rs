//! Dependency metadata returned by package sources.
//!
//! A source answers a dependency query with [`DependencyInfo`] records: one package
//! identity plus the dependency edges it declares. The gather core tags each record with
//! the source that produced it ([`SourceDependencyInfo`]) before accumulating it.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::{PackageId, PackageIdentity};
use crate::source::SourceKey;

/// An acceptable version range for a dependency edge.
///
/// The range is carried verbatim from the source. Gathering never interprets it; that is
/// left to the version resolver that consumes the gathered set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRange(pub String);

impl VersionRange {
    /// Create a range from its textual form.
    pub fn new(range: impl Into<String>) -> Self {
        Self(range.into())
    }

    /// The range as written by the source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// A target framework moniker such as `net8.0` or `netstandard2.0`.
///
/// Treated as an opaque token. [`Framework::any`] (the default) asks sources not to filter
/// by framework.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Framework(String);

impl Framework {
    const ANY: &'static str = "any";

    /// Create a framework from its moniker.
    pub fn new(moniker: impl Into<String>) -> Self {
        Self(moniker.into())
    }

    /// The framework that matches every package.
    #[must_use]
    pub fn any() -> Self {
        Self(Self::ANY.to_string())
    }

    /// Whether this is the unfiltered framework.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ANY)
    }

    /// The moniker.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One dependency edge: the id a package depends on and the acceptable range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
    /// Id of the package depended upon
    pub id: PackageId,
    /// Acceptable versions, opaque to gathering
    #[serde(default)]
    pub range: VersionRange,
}

impl PackageDependency {
    /// Create a dependency edge.
    pub fn new(id: impl Into<PackageId>, range: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            range: VersionRange::new(range),
        }
    }
}

/// Dependency metadata for one package identity, as reported by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInfo {
    /// The package this record describes
    pub identity: PackageIdentity,
    /// Declared dependencies, in the order the source listed them
    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,
}

impl DependencyInfo {
    /// Create a record with no dependencies.
    #[must_use]
    pub const fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            dependencies: Vec::new(),
        }
    }

    /// Builder-style helper adding one dependency edge.
    #[must_use]
    pub fn with_dependency(mut self, id: impl Into<PackageId>, range: impl Into<String>) -> Self {
        self.dependencies.push(PackageDependency::new(id, range));
        self
    }

    /// Ids of every dependency edge.
    pub fn dependency_ids(&self) -> impl Iterator<Item = &PackageId> {
        self.dependencies.iter().map(|dep| &dep.id)
    }
}

/// A [`DependencyInfo`] tagged with the source that produced it.
///
/// Equality and hashing consider only the wrapped package identity. The source is
/// metadata: two records for the same identity from different sources are duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct SourceDependencyInfo {
    /// The dependency metadata
    #[serde(flatten)]
    pub info: DependencyInfo,
    /// Source that returned the metadata
    pub source: SourceKey,
}

impl SourceDependencyInfo {
    /// Tag `info` with `source`.
    #[must_use]
    pub const fn new(info: DependencyInfo, source: SourceKey) -> Self {
        Self {
            info,
            source,
        }
    }

    /// The identity used for deduplication.
    #[must_use]
    pub const fn identity(&self) -> &PackageIdentity {
        &self.info.identity
    }
}

impl PartialEq for SourceDependencyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.info.identity == other.info.identity
    }
}

impl Eq for SourceDependencyInfo {}

impl Hash for SourceDependencyInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.identity.hash(state);
    }
}
