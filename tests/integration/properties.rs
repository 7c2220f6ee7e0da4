// Integration tests for properties that hold for every gather run.

use std::collections::HashSet;

use anyhow::Result;
use depgather::test_utils::{RecordedQuery, ScriptedSource};

use crate::common::{gather_all, ids, info, rendered};

/// Three overlapping sources that share identities and a dependency cycle.
fn overlapping_sources() -> Vec<ScriptedSource> {
    vec![
        ScriptedSource::new("s1")
            .with_package(info("A@1.0.0").with_dependency("B", "").with_dependency("C", ""))
            .with_package(info("B@1.0.0").with_dependency("A", "")),
        ScriptedSource::new("s2")
            .with_package(info("a@1.0.0"))
            .with_package(info("C@1.0.0").with_dependency("D", ""))
            .with_package(info("D@1.0.0").with_dependency("C", ""))
            .with_package(info("E@1.0.0")),
        ScriptedSource::new("s3")
            .with_package(info("B@1.0.0"))
            .with_package(info("D@1.0.0"))
            .with_package(info("D@2.0.0").with_dependency("E", "")),
    ]
}

#[tokio::test]
async fn test_results_never_repeat_an_identity() -> Result<()> {
    let scripted = overlapping_sources();
    let sources: Vec<_> = scripted.iter().cloned().map(ScriptedSource::into_source).collect();

    let report = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await?;

    // s2 repeats A under another casing and is dropped. Ids a source listed as dependencies
    // are never asked of it, so B, D and E each come from a later source.
    let mut seen = HashSet::new();
    for record in &report.results {
        assert!(seen.insert(record.identity().clone()), "duplicate {}", record.identity());
    }
    assert_eq!(
        rendered(&report.results),
        vec![
            "A@1.0.0 from s1",
            "C@1.0.0 from s2",
            "B@1.0.0 from s3",
            "D@1.0.0 from s3",
            "D@2.0.0 from s3",
            "E@1.0.0 from s2",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_each_source_is_asked_about_each_id_at_most_once() -> Result<()> {
    let scripted = overlapping_sources();
    let sources: Vec<_> = scripted.iter().cloned().map(ScriptedSource::into_source).collect();

    let report = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await?;

    let discovered = ["A", "B", "C", "D", "E"];
    for source in &scripted {
        for id in discovered {
            assert!(source.single_queries_for(id) <= 1, "repeated query for {id}");
        }
    }
    // Single-id queries are bounded by sources x discovered ids.
    assert!(report.stats.single_queries <= scripted.len() * discovered.len());
    Ok(())
}

#[tokio::test]
async fn test_long_chain_terminates_within_bound() -> Result<()> {
    // P0 -> P1 -> ... -> P29, alternating between two sources.
    let mut even = ScriptedSource::new("even");
    let mut odd = ScriptedSource::new("odd");
    let length = 30;
    for n in 0..length {
        let mut package = info(&format!("P{n}@1.0.0"));
        if n + 1 < length {
            package = package.with_dependency(format!("P{}", n + 1).as_str(), "");
        }
        if n % 2 == 0 {
            even = even.with_package(package);
        } else {
            odd = odd.with_package(package);
        }
    }
    let sources = vec![even.into_source(), odd.into_source()];

    let report = gather_all(&ids(&["P0"]), &ids(&["P0"]), &sources, &sources).await?;

    assert_eq!(report.results.len(), length);
    assert!(report.stats.single_queries <= 2 * length);
    assert!(report.stats.expansion_passes <= length + 1);
    Ok(())
}

#[tokio::test]
async fn test_runs_are_deterministic() -> Result<()> {
    let first_sources: Vec<_> =
        overlapping_sources().into_iter().map(ScriptedSource::into_source).collect();
    let second_sources: Vec<_> =
        overlapping_sources().into_iter().map(ScriptedSource::into_source).collect();

    let first = gather_all(&ids(&["A"]), &ids(&["A"]), &first_sources, &first_sources).await?;
    let second = gather_all(&ids(&["A"]), &ids(&["A"]), &second_sources, &second_sources).await?;

    assert_eq!(rendered(&first.results), rendered(&second.results));
    assert_eq!(first.stats, second.stats);
    Ok(())
}

/// A source that lists an id as a dependency is never asked about that id, even when it
/// holds richer metadata for it than the source that ends up supplying it.
#[tokio::test]
async fn test_dependency_ids_are_not_requeried_on_the_reporting_source() -> Result<()> {
    let rich = ScriptedSource::new("rich")
        .with_package(info("A@1.0.0").with_dependency("B", ""))
        .with_package(info("B@1.0.0").with_dependency("Hidden", ""))
        .with_package(info("Hidden@1.0.0"));
    let sparse = ScriptedSource::new("sparse").with_package(info("B@1.0.0"));
    let sources = vec![rich.clone().into_source(), sparse.clone().into_source()];

    let report = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await?;

    assert!(!rich.was_queried_for("B"));
    assert_eq!(sparse.single_queries_for("B"), 1);
    // B comes from the sparse source without its dependency, so Hidden is never discovered.
    assert_eq!(rendered(&report.results), vec!["A@1.0.0 from rich", "B@1.0.0 from sparse"]);
    assert!(!rich.was_queried_for("Hidden"));
    Ok(())
}

#[tokio::test]
async fn test_ids_checked_while_seeding_are_not_rechecked() -> Result<()> {
    let s1 = ScriptedSource::new("s1").with_package(info("A@1.0.0"));
    let s2 = ScriptedSource::new("s2").with_package(info("A@2.0.0"));
    let sources = vec![s1.clone().into_source(), s2.clone().into_source()];

    let report = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await?;

    assert_eq!(rendered(&report.results), vec!["A@1.0.0 from s1", "A@2.0.0 from s2"]);
    for source in [&s1, &s2] {
        assert!(source.queries().iter().all(|q| matches!(q, RecordedQuery::Batch(_))));
    }
    assert_eq!(report.stats.batch_queries, 4);
    assert_eq!(report.stats.single_queries, 0);
    Ok(())
}
