// Integration tests for runs that end without a result.

use anyhow::Result;
use depgather::core::GatherError;
use depgather::test_utils::{RecordedQuery, ScriptedSource};
use tokio_util::sync::CancellationToken;

use crate::common::{gather_all, gather_with_cancel, ids, info};

#[tokio::test]
async fn test_cancellation_during_expansion_stops_the_run() -> Result<()> {
    let cancel = CancellationToken::new();
    let s1 = ScriptedSource::new("s1").with_package(info("A@1.0.0").with_dependency("B", ""));
    let s2 = ScriptedSource::new("s2")
        .with_package(info("B@1.0.0").with_dependency("C", ""))
        .with_package(info("C@1.0.0"))
        .cancelling_on("B", cancel.clone());
    let s3 = ScriptedSource::new("s3").with_package(info("C@1.0.0"));
    let sources = vec![s1.into_source(), s2.clone().into_source(), s3.clone().into_source()];

    let err = gather_with_cancel(&ids(&["A"]), &ids(&["A"]), &sources, &sources, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
    // s3 comes after the cancelling source in the pass and is never reached.
    assert!(!s3.was_queried_for("B"));
    assert!(!s3.was_queried_for("C"));
    assert!(!s2.was_queried_for("C"));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_token_prevents_any_query() -> Result<()> {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let s1 = ScriptedSource::new("s1").with_package(info("A@1.0.0"));
    let sources = vec![s1.clone().into_source()];

    let err = gather_with_cancel(&ids(&["A"]), &ids(&["A"]), &sources, &sources, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, GatherError::Cancelled));
    assert!(s1.queries().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cancellation_while_seeding() -> Result<()> {
    let cancel = CancellationToken::new();
    let s1 = ScriptedSource::new("s1").with_package(info("A@1.0.0")).cancelling_on("A", cancel.clone());
    let s2 = ScriptedSource::new("s2").with_package(info("A@2.0.0"));
    let sources = vec![s1.into_source(), s2.clone().into_source()];

    let err = gather_with_cancel(&ids(&["A"]), &ids(&["A"]), &sources, &sources, &cancel)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(s2.queries().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_query_failure_is_passed_through_unchanged() -> Result<()> {
    let s1 = ScriptedSource::new("s1").with_package(info("A@1.0.0").with_dependency("B", ""));
    let s2 = ScriptedSource::new("s2").with_package(info("B@1.0.0")).failing_on("B");
    let s3 = ScriptedSource::new("s3").with_package(info("B@1.0.0"));
    let sources = vec![s1.into_source(), s2.into_source(), s3.clone().into_source()];

    let err = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await.unwrap_err();

    match &err {
        GatherError::Query(upstream) => {
            assert_eq!(upstream.to_string(), "scripted failure for 'B'");
        }
        other => panic!("expected Query, got {other:?}"),
    }
    assert_eq!(err.to_string(), "scripted failure for 'B'");
    // Nothing is queried after the failure.
    assert!(!s3.was_queried_for("B"));
    Ok(())
}

#[tokio::test]
async fn test_query_failure_while_seeding() -> Result<()> {
    let s1 = ScriptedSource::new("s1").failing_on("A");
    let s2 = ScriptedSource::new("s2").with_package(info("A@1.0.0"));
    let sources = vec![s1.clone().into_source(), s2.clone().into_source()];

    let err = gather_all(&ids(&["A"]), &ids(&["A"]), &sources, &sources).await.unwrap_err();

    assert!(matches!(err, GatherError::Query(_)));
    assert_eq!(s1.queries(), vec![RecordedQuery::Batch(ids(&["A"]))]);
    assert!(s2.queries().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_target_is_reported_before_broader_pass() -> Result<()> {
    // s2 has A but is not primary, so the run fails without asking it.
    let s1 = ScriptedSource::new("s1").with_package(info("Other@1.0.0"));
    let s2 = ScriptedSource::new("s2").with_package(info("A@1.0.0"));
    let primary = vec![s1.into_source()];
    let all = vec![primary[0].clone(), s2.clone().into_source()];

    let err = gather_all(&ids(&["A"]), &ids(&["A"]), &primary, &all).await.unwrap_err();

    assert!(matches!(&err, GatherError::PackageNotFound { target } if target == "A"));
    assert_eq!(err.to_string(), "Package 'A' was not found on any primary source");
    assert!(s2.queries().is_empty());
    Ok(())
}
