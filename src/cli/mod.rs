//! Command-line interface for depgather.
//!
//! The binary is a thin front-end over [`crate::gather`]: it reads `depgather.toml`,
//! opens the configured feeds, runs one gather and prints the result.
//!
//! # Usage
//!
//! ```bash
//! # Any version of each target
//! depgather Contoso.Core Contoso.Web
//!
//! # Exact versions, plus an already-installed package searched on every feed
//! depgather Contoso.Core@1.2.0 --also Contoso.Legacy@0.9.0
//!
//! # Explicit configuration, framework and JSON output
//! depgather --config ci/depgather.toml --framework net8.0 --format json Contoso.Core
//! ```
//!
//! Targets are either all bare ids or all `id@version`; mixing the two is rejected.
//! Pressing Ctrl-C cancels the run.
//!
//! # Logging
//!
//! `--verbose` logs at debug level, `--quiet` only reports errors, and the default shows
//! warnings. `RUST_LOG` takes precedence over all three.

mod output;

pub use output::{OutputFormat, render_json, render_text};

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::GatherConfig;
use crate::core::{GatherError, PackageId, PackageIdentity};
use crate::gather::{GatherReport, GatherRequest, GatherTarget, gather_with_stats};
use crate::models::Framework;

/// Gather the transitive dependency metadata of packages across local feeds.
#[derive(Parser, Debug)]
#[command(name = "depgather", version, about, long_about = None)]
pub struct Cli {
    /// Primary targets: `id` for any version, `id@version` for an exact version
    #[arg(required = true, value_name = "TARGET")]
    targets: Vec<String>,

    /// Additional known-relevant packages (for example already installed ones)
    #[arg(long, value_name = "TARGET", num_args = 1..)]
    also: Vec<String>,

    /// Path to depgather.toml (defaults to $DEPGATHER_CONFIG, ./depgather.toml,
    /// then ~/.depgather/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Target framework; overrides the configuration file
    #[arg(short, long)]
    framework: Option<String>,

    /// Accept prerelease versions; overrides the configuration file
    #[arg(long)]
    prerelease: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,
}

/// Targets parsed from the command line, all of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTargets {
    /// Bare ids
    Ids {
        /// Primary targets
        primary: Vec<PackageId>,
        /// Primary targets followed by the additional ones
        all: Vec<PackageId>,
    },
    /// Exact identities
    Identities {
        /// Primary targets
        primary: Vec<PackageIdentity>,
        /// Primary targets followed by the additional ones
        all: Vec<PackageIdentity>,
    },
}

impl ParsedTargets {
    /// Parse primary and additional targets, rejecting a mix of ids and identities.
    pub fn parse(primary: &[String], also: &[String]) -> Result<Self, GatherError> {
        let exact = primary.iter().chain(also).filter(|t| t.contains('@')).count();
        let total = primary.len() + also.len();

        if exact == 0 {
            let primary = parse_all::<PackageId>(primary)?;
            let all = with_additional(&primary, parse_all::<PackageId>(also)?);
            Ok(Self::Ids {
                primary,
                all,
            })
        } else if exact == total {
            let primary = parse_all::<PackageIdentity>(primary)?;
            let all = with_additional(&primary, parse_all::<PackageIdentity>(also)?);
            Ok(Self::Identities {
                primary,
                all,
            })
        } else {
            Err(GatherError::InvalidTarget {
                input: primary.iter().chain(also).cloned().collect::<Vec<_>>().join(" "),
                reason: "targets must be all 'id' or all 'id@version'".to_string(),
            })
        }
    }
}

fn parse_all<T: std::str::FromStr<Err = GatherError>>(raw: &[String]) -> Result<Vec<T>, GatherError> {
    raw.iter().map(|t| t.parse()).collect()
}

fn with_additional<T: PartialEq + Clone>(primary: &[T], additional: Vec<T>) -> Vec<T> {
    let mut all = primary.to_vec();
    for target in additional {
        if !all.contains(&target) {
            all.push(target);
        }
    }
    all
}

impl Cli {
    /// Log filter for the selected verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let targets = ParsedTargets::parse(&self.targets, &self.also)?;

        let mut config = GatherConfig::load_with_optional(self.config.clone()).await?;
        if self.prerelease {
            config.include_prerelease = true;
        }
        if let Some(framework) = &self.framework {
            config.framework = Some(Framework::new(framework));
        }

        let sources = config.open_sources().await.context("Failed to open configured feeds")?;
        if sources.all.is_empty() {
            tracing::warn!("No feeds configured; nothing can be found");
        }

        let cancel = CancellationToken::new();
        let ctrl_c = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.cancel();
            }
        });

        let framework = config.framework();
        let report = match &targets {
            ParsedTargets::Ids {
                primary,
                all,
            } => run(&config, &framework, primary, all, &sources, &cancel).await?,
            ParsedTargets::Identities {
                primary,
                all,
            } => run(&config, &framework, primary, all, &sources, &cancel).await?,
        };
        tracing::debug!("Gather finished with {:?}", report.stats);

        let rendered = match self.format {
            OutputFormat::Text => render_text(&report.results),
            OutputFormat::Json => render_json(&report.results)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

async fn run<T: GatherTarget>(
    config: &GatherConfig,
    framework: &Framework,
    primary: &[T],
    all: &[T],
    sources: &crate::config::OpenedSources,
    cancel: &CancellationToken,
) -> Result<GatherReport, GatherError> {
    gather_with_stats(
        &config.resolution_context(),
        GatherRequest {
            primary_targets: primary,
            all_targets: all,
            framework,
            primary_sources: &sources.primary,
            all_sources: &sources.all,
        },
        cancel,
    )
    .await
}
