// Integration tests running gathers over configured local feeds.

use std::path::{Path, PathBuf};

use anyhow::Result;
use depgather::config::GatherConfig;
use depgather::core::{GatherError, PackageId, PackageIdentity};
use depgather::gather::{GatherRequest, GatherTarget, gather};
use depgather::models::SourceDependencyInfo;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::common::{identities, ids, rendered};

const MAIN_FEED: &str = r#"
[[packages]]
id = "App"
version = "1.0.0"
dependencies = [{ id = "Lib", range = "[1.0.0, )" }]

[[packages]]
id = "App"
version = "2.0.0-beta.1"
dependencies = [{ id = "Beta", range = "" }]

[[packages]]
id = "Core"
version = "1.0.0"
"#;

const MIRROR_FEED: &str = r#"
[[packages]]
id = "Lib"
version = "1.0.0"
frameworks = ["net8.0"]
dependencies = [{ id = "Core", range = "1.0.0" }]

[[packages]]
id = "Lib"
version = "1.1.0"
frameworks = ["net6.0"]
"#;

/// Write a config with `settings` on top and the main, mirror and symbols feeds below.
///
/// The symbols feed has no capability, so its file is never created.
fn write_config(temp: &TempDir, settings: &str) -> Result<PathBuf> {
    let feeds = temp.path().join("feeds");
    std::fs::create_dir_all(&feeds)?;
    std::fs::write(feeds.join("main.toml"), MAIN_FEED)?;
    std::fs::write(feeds.join("mirror.toml"), MIRROR_FEED)?;

    let config = format!(
        r#"{settings}

[[feeds]]
name = "main"
path = "feeds/main.toml"

[[feeds]]
name = "mirror"
path = "feeds/mirror.toml"
primary = false

[[feeds]]
name = "symbols"
path = "feeds/symbols.toml"
capability = false
"#
    );
    let path = temp.path().join("depgather.toml");
    std::fs::write(&path, config)?;
    Ok(path)
}

async fn gather_from<T: GatherTarget>(
    config_path: &Path,
    targets: &[T],
) -> Result<Vec<SourceDependencyInfo>, GatherError> {
    depgather::test_utils::init_test_logging(None);
    let config = GatherConfig::load_from(config_path).await.map_err(GatherError::Query)?;
    let sources = config.open_sources().await.map_err(GatherError::Query)?;

    gather(
        &config.resolution_context(),
        GatherRequest {
            primary_targets: targets,
            all_targets: targets,
            framework: &config.framework(),
            primary_sources: &sources.primary,
            all_sources: &sources.all,
        },
        &CancellationToken::new(),
    )
    .await
}

#[tokio::test]
async fn test_feeds_gather_stable_versions_for_any_framework() -> Result<()> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "")?;

    let results = gather_from::<PackageId>(&config, &ids(&["app"])).await?;

    // The mirror is not primary but still completes Lib during expansion.
    assert_eq!(
        rendered(&results),
        vec![
            "App@1.0.0 from main",
            "Lib@1.0.0 from mirror",
            "Lib@1.1.0 from mirror",
            "Core@1.0.0 from main",
        ]
    );
    assert!(results.iter().all(|r| r.source.as_str() != "symbols"));
    Ok(())
}

#[tokio::test]
async fn test_feeds_respect_framework_and_prerelease_settings() -> Result<()> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "include_prerelease = true\nframework = \"net6.0\"")?;

    let results = gather_from::<PackageId>(&config, &ids(&["App"])).await?;

    // Only the net6.0 Lib matches, and it has no dependency on Core.
    assert_eq!(
        rendered(&results),
        vec!["App@1.0.0 from main", "App@2.0.0-beta.1 from main", "Lib@1.1.0 from mirror"]
    );
    Ok(())
}

#[tokio::test]
async fn test_target_on_non_primary_feed_is_not_found() -> Result<()> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "")?;

    let err = gather_from::<PackageId>(&config, &ids(&["Lib"])).await.unwrap_err();

    assert!(matches!(&err, GatherError::PackageNotFound { target } if target == "Lib"));
    Ok(())
}

#[tokio::test]
async fn test_exact_prerelease_identity_from_feed() -> Result<()> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "")?;

    let results =
        gather_from::<PackageIdentity>(&config, &identities(&["App@2.0.0-beta.1"])).await?;

    // Beta is discovered but no feed has it.
    assert_eq!(rendered(&results), vec!["App@2.0.0-beta.1 from main"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_feed_file_fails_to_open() -> Result<()> {
    let temp = TempDir::new()?;
    let config = write_config(&temp, "")?;
    std::fs::remove_file(temp.path().join("feeds/mirror.toml"))?;

    let config = GatherConfig::load_from(&config).await?;
    let err = config.open_sources().await.err().expect("mirror feed is missing");

    assert!(err.to_string().contains("Failed to open feed 'mirror'"));
    Ok(())
}
