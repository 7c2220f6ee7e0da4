//! Rendering of gathered records.

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::models::SourceDependencyInfo;

/// Output format for the gathered set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per package, dependencies indented below it
    Text,
    /// A JSON array of records
    Json,
}

/// Render records as plain text.
///
/// ```text
/// Contoso.Core@1.2.0  (main)
///     Contoso.Abstractions [1.0.0, )
/// ```
#[must_use]
pub fn render_text(results: &[SourceDependencyInfo]) -> String {
    let mut lines = Vec::new();
    for record in results {
        lines.push(format!("{}  ({})", record.identity(), record.source));
        for dependency in &record.info.dependencies {
            lines.push(format!("    {} {}", dependency.id, dependency.range));
        }
    }
    lines.join("\n")
}

/// Render records as pretty-printed JSON.
pub fn render_json(results: &[SourceDependencyInfo]) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize gathered packages")
}
