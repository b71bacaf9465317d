use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use synthbulk_core::{
    BatchOrchestrator, BatchProgress, BatchStatus, BulkError, BulkSettings, ClientError,
    EditSession, InMemoryClient, MonitorFilter,
};
use synthbulk_model::{BatchMode, FieldGroup};
use synthbulk_test_utils::{
    browser_fleet, browser_monitor, http_monitor, with_frequency, with_locations, with_outage,
};

fn store() -> Arc<InMemoryClient> {
    Arc::new(InMemoryClient::from_records([
        with_frequency(with_locations(browser_monitor("SYNTHETIC_TEST-1"), &["loc1"]), 10),
        with_frequency(with_locations(browser_monitor("SYNTHETIC_TEST-2"), &["loc1", "loc2"]), 10),
        with_outage(http_monitor("HTTP_CHECK-1"), true, Some(2)),
    ]))
}

#[tokio::test]
async fn same_type_batch_updates_every_record() {
    let client = store();
    let orchestrator = BatchOrchestrator::new(client.clone());
    let records = orchestrator
        .fetch_all(&["SYNTHETIC_TEST-1", "SYNTHETIC_TEST-2"])
        .await
        .unwrap();

    let mut session = EditSession::new(&records);
    assert_eq!(session.mode(), BatchMode::SameType);
    session.select(FieldGroup::Frequency).unwrap();
    session.submit_text(r#"{"frequencyMin": 30}"#).unwrap();
    session.select(FieldGroup::Locations).unwrap();
    session.submit_text(r#"{"locations": ["loc3", "*"]}"#).unwrap();

    let outcome = orchestrator.apply(&session, &records).await;
    assert_eq!(outcome.status(), BatchStatus::Succeeded);

    let first = client.record("SYNTHETIC_TEST-1").unwrap();
    let second = client.record("SYNTHETIC_TEST-2").unwrap();
    assert_eq!(first.frequency_min, 30);
    assert_eq!(first.locations, vec!["loc3".to_string()]);
    assert_eq!(second.locations, vec!["loc2".to_string(), "loc3".to_string()]);
}

#[tokio::test]
async fn mixed_batch_leaves_frequency_alone() {
    let client = store();
    let orchestrator = BatchOrchestrator::new(client.clone());
    let records = orchestrator
        .fetch_all(&["SYNTHETIC_TEST-1", "HTTP_CHECK-1"])
        .await
        .unwrap();

    let mut session = EditSession::with_settings(&records, &BulkSettings::new());
    assert_eq!(session.mode(), BatchMode::Mixed);
    assert!(session.select(FieldGroup::Frequency).is_err());

    session.select(FieldGroup::OutageHandling).unwrap();
    session
        .submit_text(r#"{"outageHandling":{"globalOutage":false,"globalOutagePolicy":{"consecutiveRuns":"*"}}}"#)
        .unwrap();
    assert!(orchestrator.apply(&session, &records).await.is_success());

    let browser = client.record("SYNTHETIC_TEST-1").unwrap();
    let http = client.record("HTTP_CHECK-1").unwrap();
    assert_eq!(browser.global_outage(), Some(false));
    assert_eq!(browser.consecutive_runs(), None);
    assert_eq!(http.global_outage(), Some(false));
    assert_eq!(http.consecutive_runs(), Some(2));
    assert_eq!(browser.frequency_min, 10);
}

#[tokio::test]
async fn partial_failure_reports_first_error() {
    let client = Arc::new(InMemoryClient::from_records(browser_fleet(4)));
    client.fail_replace("SYNTHETIC_TEST-3", "script rejected");
    let orchestrator = BatchOrchestrator::new(client.clone());
    let mut progress = orchestrator.progress();

    let ids: Vec<String> = (1..=4).map(|i| format!("SYNTHETIC_TEST-{i}")).collect();
    let records = orchestrator.fetch_all(ids.as_slice()).await.unwrap();
    let mut session = EditSession::new(&records);
    session.select(FieldGroup::Tags).unwrap();
    session.submit_text(r#"{"tags":[{"key":"team"}]}"#).unwrap();

    let outcome = orchestrator.apply(&session, &records).await;
    assert_eq!(outcome.status(), BatchStatus::Failed);
    assert_eq!(outcome.succeeded.len(), 3);
    assert_eq!(outcome.failed[0].0, "SYNTHETIC_TEST-3");
    assert!(outcome.first_error.as_deref().unwrap().contains("script rejected"));
    assert_eq!(client.replace_calls(), 4);

    assert!(progress.has_changed().unwrap());
    assert_eq!(*progress.borrow_and_update(), BatchProgress { completed: 4, total: 4 });
}

#[tokio::test]
async fn failed_fetch_blocks_session() {
    let client = store();
    client.fail_get("SYNTHETIC_TEST-2", ClientError::Unavailable("timeout".to_string()));
    let orchestrator = BatchOrchestrator::new(client);

    let err = orchestrator
        .fetch_all(&["SYNTHETIC_TEST-1", "SYNTHETIC_TEST-2", "SYNTHETIC_TEST-9"])
        .await
        .unwrap_err();
    assert!(matches!(err, BulkError::Fetch { failed: 2, .. }));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn superseded_fetch_is_discarded() {
    let client = store();
    client.set_latency("SYNTHETIC_TEST-1", Duration::from_secs(5));
    let orchestrator = BatchOrchestrator::new(client);

    let slow = orchestrator.fetch_latest(&["SYNTHETIC_TEST-1"]);
    let fast = orchestrator.fetch_latest(&["SYNTHETIC_TEST-2"]);
    let (slow, fast) = tokio::join!(slow, fast);

    assert!(slow.unwrap().is_none());
    let fast = fast.unwrap().unwrap();
    assert_eq!(fast[0].entity_id, "SYNTHETIC_TEST-2");
}

#[tokio::test]
async fn collection_filters_and_sorts() {
    let client = store();
    let orchestrator = BatchOrchestrator::new(client);

    let filter = MonitorFilter::from_filter_values("BROWSER", "loc1", "", &[]).unwrap();
    let listed = orchestrator.collection(&filter).await.unwrap();
    let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["synthetic_test-1", "synthetic_test-2"]);
}
