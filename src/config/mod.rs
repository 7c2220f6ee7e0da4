//! Configuration for depgather
//!
//! Two pieces of configuration feed a gather run:
//!
//! - [`ResolutionContext`] - read-only settings consulted by every query
//!   (currently whether prerelease versions are acceptable)
//! - [`GatherConfig`] - the `depgather.toml` file naming the local feeds to gather from
//!
//! # Configuration File
//!
//! ```toml
//! include_prerelease = false
//! framework = "net8.0"
//!
//! [[feeds]]
//! name = "main"
//! path = "feeds/main.toml"        # relative to this file
//!
//! [[feeds]]
//! name = "mirror"
//! path = "feeds/mirror.toml"
//! primary = false                 # only searched during expansion
//!
//! [[feeds]]
//! name = "symbols"
//! path = "feeds/symbols.toml"
//! capability = false              # listed, but cannot answer dependency queries
//! ```
//!
//! # Location
//!
//! 1. An explicit path (`--config`)
//! 2. The `DEPGATHER_CONFIG` environment variable
//! 3. `./depgather.toml`
//! 4. `~/.depgather/config.toml` (`%LOCALAPPDATA%\depgather\config.toml` on Windows)
//!
//! When none of these exist an empty configuration is used.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::core::GatherError;
use crate::models::Framework;
use crate::source::{FeedSource, LocalFeed, PackageSource};

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "DEPGATHER_CONFIG";

/// Settings consulted read-only by every dependency query of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    /// Whether prerelease versions may be returned by id queries
    #[serde(default)]
    pub include_prerelease: bool,
}

/// One `[[feeds]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Unique feed name, used as the source key
    pub name: String,
    /// Path to the feed file, relative to the configuration file
    pub path: PathBuf,
    /// Whether primary targets may be found on this feed
    #[serde(default = "default_true")]
    pub primary: bool,
    /// Whether this feed answers dependency queries
    #[serde(default = "default_true")]
    pub capability: bool,
}

const fn default_true() -> bool {
    true
}

/// Contents of `depgather.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Whether prerelease versions may be returned by id queries
    #[serde(default)]
    pub include_prerelease: bool,
    /// Target framework; unset means any framework
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    /// Configured feeds, in search order
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    /// Directory feed paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Sources opened from a configuration.
pub struct OpenedSources {
    /// Feeds marked `primary`
    pub primary: Vec<Arc<dyn PackageSource>>,
    /// Every feed
    pub all: Vec<Arc<dyn PackageSource>>,
}

impl GatherConfig {
    /// Load configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file at a default location yields an empty configuration; a missing file
    /// at an explicit path is an error.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path).await,
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;

        tracing::debug!("Loaded {} feed(s) from {}", config.feeds.len(), path.display());
        Ok(config)
    }

    /// The first existing default location, if any.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from("depgather.toml");
        if local.exists() {
            return Some(local);
        }

        let user_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir().map(|dir| dir.join("depgather"))
        } else {
            dirs::home_dir().map(|dir| dir.join(".depgather"))
        };
        user_dir.map(|dir| dir.join("config.toml"))
    }

    /// Check feed names are non-empty and unique.
    pub fn validate(&self) -> Result<(), GatherError> {
        let mut seen = HashSet::new();
        for feed in &self.feeds {
            let name = feed.name.trim();
            if name.is_empty() {
                return Err(GatherError::Config {
                    message: format!("feed at '{}' has an empty name", feed.path.display()),
                });
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(GatherError::Config {
                    message: format!("feed '{name}' is defined more than once"),
                });
            }
        }
        Ok(())
    }

    /// The resolution context described by this configuration.
    #[must_use]
    pub fn resolution_context(&self) -> ResolutionContext {
        ResolutionContext {
            include_prerelease: self.include_prerelease,
        }
    }

    /// The configured framework, or [`Framework::any`].
    #[must_use]
    pub fn framework(&self) -> Framework {
        self.framework.clone().unwrap_or_default()
    }

    fn resolve_feed_path(&self, feed: &FeedConfig) -> PathBuf {
        match &self.base_dir {
            Some(base) if feed.path.is_relative() => base.join(&feed.path),
            _ => feed.path.clone(),
        }
    }

    /// Load every feed and split them into primary and all-source lists.
    ///
    /// Feeds with `capability = false` are not read; they become sources without a
    /// dependency query capability.
    pub async fn open_sources(&self) -> Result<OpenedSources> {
        let mut primary = Vec::new();
        let mut all = Vec::new();

        for feed in &self.feeds {
            let local = if feed.capability {
                let path = self.resolve_feed_path(feed);
                let loaded = LocalFeed::load(&path)
                    .await
                    .with_context(|| format!("Failed to open feed '{}'", feed.name))?;
                Some(loaded)
            } else {
                None
            };

            let source: Arc<dyn PackageSource> = Arc::new(FeedSource::new(&feed.name, local));
            if feed.primary {
                primary.push(Arc::clone(&source));
            }
            all.push(source);
        }

        Ok(OpenedSources {
            primary,
            all,
        })
    }
}
