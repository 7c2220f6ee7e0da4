//! Package identifiers and identities.
//!
//! Package ids are compared case-insensitively everywhere in depgather: `Newtonsoft.Json`
//! and `newtonsoft.json` name the same package. The original spelling is kept for display
//! so that results read the way the source reported them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::GatherError;

/// A case-insensitive package id.
///
/// Equality, hashing and ordering all use the Unicode-lowercased form of the id, while
/// [`Display`](fmt::Display) and [`PackageId::as_str`] return the spelling the id was
/// created with.
///
/// # Examples
///
/// ```rust
/// use depgather::core::PackageId;
///
/// let a = PackageId::new("Newtonsoft.Json");
/// let b = PackageId::new("newtonsoft.json");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "Newtonsoft.Json");
/// ```
#[derive(Debug, Clone)]
pub struct PackageId {
    display: String,
    folded: String,
}

impl PackageId {
    /// Create a package id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        let display = id.into();
        let folded = display.to_lowercase();
        Self {
            display,
            folded,
        }
    }

    /// The id as originally spelled.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// The lowercased comparison key.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.folded
    }
}

impl PartialEq for PackageId {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for PackageId {}

impl Hash for PackageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl PartialOrd for PackageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PackageId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl FromStr for PackageId {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(GatherError::InvalidTarget {
                input: s.to_string(),
                reason: "package id cannot be empty".to_string(),
            });
        }
        Ok(Self::new(trimmed))
    }
}

impl Serialize for PackageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for PackageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An exact package version: `(id, version)`.
///
/// Two identities are equal when their ids match case-insensitively and their versions are
/// equal. Identities are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Package id
    pub id: PackageId,
    /// Exact version. Parsed as SemVer 2.0, so build metadata takes part in equality and
    /// four-part versions (`1.0.0.0`) are rejected.
    pub version: semver::Version,
}

impl PackageIdentity {
    /// Create an identity from an id and a version.
    pub fn new(id: impl Into<PackageId>, version: semver::Version) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Whether this identity's version is a prerelease.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// Parses `id@version`.
impl FromStr for PackageIdentity {
    type Err = GatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, version) = s.trim().rsplit_once('@').ok_or_else(|| GatherError::InvalidTarget {
            input: s.to_string(),
            reason: "expected the form id@version".to_string(),
        })?;

        let id: PackageId = id.parse()?;
        let version = semver::Version::parse(version.trim()).map_err(|e| {
            GatherError::InvalidTarget {
                input: s.to_string(),
                reason: format!("invalid version '{version}': {e}"),
            }
        })?;

        Ok(Self {
            id,
            version,
        })
    }
}
