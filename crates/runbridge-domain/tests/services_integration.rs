//! Domain services against the in-memory platform.

mod common;

use std::time::Duration;

use common::{FakePlatform, items, run_json};
use runbridge_client::{Run, RunSource};
use runbridge_domain::constants::LEGACY_ACTOR_ID;
use runbridge_domain::{DatasetQuery, DomainError, EnrichOptions, FetchContext};
use serde_json::json;

fn options(extra_keys: &[&str], context: FetchContext) -> EnrichOptions {
    EnrichOptions {
        output_key: "OUTPUT".to_string(),
        extra_keys: extra_keys.iter().map(|k| k.to_string()).collect(),
        item_limit: 100,
        context,
    }
}

fn run(value: serde_json::Value) -> Run {
    serde_json::from_value(value).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Enrichment
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_enrichment_tolerates_missing_output() {
    let platform = FakePlatform::new();
    platform.add_store("kv1", None);
    platform.add_record("kv1", "INPUT", "application/json", br#"{"url": "https://example.com"}"#);
    platform.add_record("kv1", "BROKEN", "application/json", b"{not json");

    let actions = platform.actions();
    let enriched = actions
        .services()
        .enrichment()
        .enrich(
            run(run_json("r1", "act1", "SUCCEEDED", Some("kv1"), None)),
            &options(&["INPUT", "BROKEN"], FetchContext::Direct),
        )
        .await;
    let value = enriched.to_value();

    let output_error = value["OUTPUT"]["error"].as_str().unwrap();
    assert!(output_error.contains("not found"), "{}", output_error);
    assert_eq!(value["INPUT"], json!({"url": "https://example.com"}));
    assert!(
        value["BROKEN"]["error"]
            .as_str()
            .unwrap()
            .starts_with("parse failure: ")
    );
    // One record request per key
    assert_eq!(platform.count("GET", "key-value-stores/kv1/records/OUTPUT"), 1);
    assert_eq!(platform.count("GET", "key-value-stores/kv1/records/INPUT"), 1);
}

#[tokio::test]
async fn test_enrichment_attaches_dataset_and_links() {
    let platform = FakePlatform::new();
    platform.add_dataset("ds1", None, Some("act1"), items(3));

    let mut raw = run_json("r1", "act1", "SUCCEEDED", None, Some("ds1"));
    raw["actorTaskId"] = json!("task1");
    let enriched = platform
        .actions()
        .services()
        .enrichment()
        .enrich(run(raw), &options(&[], FetchContext::Trigger))
        .await;
    let value = enriched.to_value();

    assert_eq!(value["datasetItems"], json!(items(3)));
    assert_eq!(
        value["datasetItemsFileUrls"]["json"],
        json!("https://api.apify.com/v2/datasets/ds1/items?format=json&clean=true&attachment=true")
    );
    assert_eq!(
        value["detailsPageUrl"],
        json!("https://console.apify.com/actors/tasks/task1/runs/r1")
    );
    for field in ["meta", "stats", "options", "userId"] {
        assert!(value.get(field).is_none());
    }
    // No store on the run, so no record lookups.
    assert!(value.get("OUTPUT").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_enrichment_fetches_records_and_dataset_concurrently() {
    let platform = FakePlatform::new();
    platform.add_store("kv1", None);
    platform.add_dataset("ds1", None, None, items(3));
    for key in ["OUTPUT", "INPUT", "LOG"] {
        platform.add_record("kv1", key, "application/json", b"{}");
        platform.delay(
            &format!("key-value-stores/kv1/records/{}", key),
            Duration::from_millis(100),
        );
    }
    platform.delay("datasets/ds1/items", Duration::from_millis(100));

    let actions = platform.actions();
    let started = tokio::time::Instant::now();
    let enriched = actions
        .services()
        .enrichment()
        .enrich(
            run(run_json("r1", "act1", "SUCCEEDED", Some("kv1"), Some("ds1"))),
            &options(&["INPUT", "LOG"], FetchContext::Direct),
        )
        .await;
    let elapsed = started.elapsed();

    // Four delayed calls in flight together: one delay, not four.
    assert!(elapsed >= Duration::from_millis(100), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(200), "{:?}", elapsed);
    assert_eq!(enriched.records.len(), 3);
    assert_eq!(enriched.dataset_items.unwrap().len(), 3);
}

#[tokio::test]
async fn test_enrichment_keeps_remote_timestamps() {
    let platform = FakePlatform::new();
    let enriched = platform
        .actions()
        .services()
        .enrichment()
        .enrich(
            run(run_json("r1", "act1", "SUCCEEDED", None, None)),
            &options(&[], FetchContext::Direct),
        )
        .await;
    let value = enriched.to_value();
    assert_eq!(value["startedAt"], json!("2024-05-01T12:00:00.000Z"));
    assert_eq!(value["finishedAt"], json!("2024-05-01T12:05:00.000Z"));
}

#[tokio::test]
async fn test_untyped_record_reads_the_same_on_both_paths() {
    let platform = FakePlatform::new();
    platform.add_store("kv1", Some("plain"));
    platform.add_untyped_record("kv1", "STATE", br#"{"page": 3}"#);

    let actions = platform.actions();
    let via_search = actions.get_record("plain", "STATE").await.unwrap().unwrap();
    assert_eq!(via_search["value"], json!({"page": 3}));

    let via_enrichment = actions.services().storage().record_value("kv1", "STATE").await;
    assert_eq!(via_enrichment, via_search["value"]);
}

#[tokio::test]
async fn test_enrichment_degrades_failed_dataset_fetch() {
    let platform = FakePlatform::new();
    platform.fail("datasets/ds1/items", 403);

    let enriched = platform
        .actions()
        .services()
        .enrichment()
        .enrich(
            run(run_json("r1", "act1", "FAILED", None, Some("ds1"))),
            &options(&[], FetchContext::Direct),
        )
        .await;

    let items = enriched.dataset_items.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], json!({"error": "API error (403): forced failure"}));
    assert_eq!(enriched.dataset_items_file_urls.unwrap().len(), 6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Dataset items
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_truncation_warning_only_in_trigger_context() {
    let platform = FakePlatform::new();
    platform.add_dataset("ds1", None, None, items(150));
    let actions = platform.actions();
    let datasets = actions.services().datasets();
    let query = DatasetQuery {
        limit: 100,
        offset: 0,
    };

    let trigger = datasets
        .fetch_items("ds1", query, None, FetchContext::Trigger)
        .await
        .unwrap();
    assert_eq!(trigger.items.len(), 101);
    assert_eq!(trigger.total, Some(150));
    assert!(trigger.items[100]["warning"].as_str().unwrap().contains("100 of 150"));

    let direct = datasets
        .fetch_items("ds1", query, None, FetchContext::Direct)
        .await
        .unwrap();
    assert_eq!(direct.items.len(), 100);
    assert_eq!(direct.file_urls, trigger.file_urls);
}

#[tokio::test]
async fn test_no_warning_when_everything_fits() {
    let platform = FakePlatform::new();
    platform.add_dataset("ds1", None, None, items(100));

    let page = platform
        .actions()
        .services()
        .datasets()
        .fetch_items(
            "ds1",
            DatasetQuery {
                limit: 100,
                offset: 0,
            },
            None,
            FetchContext::Trigger,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 100);
}

#[tokio::test]
async fn test_legacy_actor_uses_simplified_flag() {
    let platform = FakePlatform::new();
    platform.add_dataset("ds1", None, Some(LEGACY_ACTOR_ID), items(2));

    let page = platform
        .actions()
        .services()
        .datasets()
        .fetch_items(
            "ds1",
            DatasetQuery { limit: 10, offset: 0 },
            Some(LEGACY_ACTOR_ID),
            FetchContext::Direct,
        )
        .await
        .unwrap();

    let request = platform
        .requests()
        .into_iter()
        .find(|r| r.path == "datasets/ds1/items")
        .unwrap();
    assert_eq!(request.query_value("simplified"), Some("true"));
    assert_eq!(request.query_value("clean"), None);
    assert!(page.file_urls["csv"].contains("simplified=true"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage resolver
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_resolver_creates_missing_store() {
    let platform = FakePlatform::new();
    let actions = platform.actions();

    let store = actions
        .services()
        .storage()
        .key_value_store("my-store")
        .await
        .unwrap();
    assert_eq!(store.name.as_deref(), Some("my-store"));
    assert_eq!(platform.count("POST", "key-value-stores"), 1);
    assert_eq!(platform.store_count(), 1);
}

#[tokio::test]
async fn test_resolver_does_not_create_existing_store() {
    let platform = FakePlatform::new();
    platform.add_store("kv1", Some("existing"));

    let store = platform
        .actions()
        .services()
        .storage()
        .key_value_store("kv1")
        .await
        .unwrap();
    assert_eq!(store.id, "kv1");
    assert_eq!(platform.count("POST", "key-value-stores"), 0);
}

#[tokio::test]
async fn test_resolver_propagates_other_errors() {
    let platform = FakePlatform::new();
    platform.fail("key-value-stores/kv1", 403);

    let err = platform
        .actions()
        .services()
        .storage()
        .key_value_store("kv1")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Client(_)));
    assert_eq!(platform.count("POST", "key-value-stores"), 0);
}

#[tokio::test]
async fn test_resolver_creates_missing_dataset() {
    let platform = FakePlatform::new();
    let dataset = platform
        .actions()
        .services()
        .storage()
        .dataset("results")
        .await
        .unwrap();
    assert_eq!(dataset.name.as_deref(), Some("results"));
    assert_eq!(platform.count("POST", "datasets"), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscribe_unsubscribe_round_trip() {
    let platform = FakePlatform::new();
    let actions = platform.actions();
    let webhooks = actions.services().webhooks();

    let subscription = webhooks
        .subscribe(&RunSource::task("task1"), "https://hooks.example.com/abc")
        .await
        .unwrap();

    let registered = platform.webhooks();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0]["id"], json!(subscription.id));
    assert_eq!(registered[0]["condition"], json!({"actorTaskId": "task1"}));
    assert_eq!(registered[0]["requestUrl"], json!("https://hooks.example.com/abc"));
    assert_eq!(
        registered[0]["eventTypes"],
        json!([
            "ACTOR.RUN.SUCCEEDED",
            "ACTOR.RUN.FAILED",
            "ACTOR.RUN.TIMED_OUT",
            "ACTOR.RUN.ABORTED"
        ])
    );
    assert!(registered[0]["idempotencyKey"].as_str().is_some());

    webhooks.unsubscribe(&subscription.id).await.unwrap();
    assert!(platform.webhooks().is_empty());

    // Removing it again is not an error.
    webhooks.unsubscribe(&subscription.id).await.unwrap();
}

#[tokio::test]
async fn test_subscriptions_get_distinct_idempotency_keys() {
    let platform = FakePlatform::new();
    let actions = platform.actions();
    let source = RunSource::actor("act1");

    actions.subscribe(&source, "https://hooks.example.com/1").await.unwrap();
    actions.subscribe(&source, "https://hooks.example.com/2").await.unwrap();

    let keys: Vec<_> = platform
        .webhooks()
        .iter()
        .map(|w| w["idempotencyKey"].clone())
        .collect();
    assert_ne!(keys[0], keys[1]);
}

#[tokio::test]
async fn test_receive_refetches_and_enriches() {
    let platform = FakePlatform::new();
    platform.add_run(run_json("r9", "act1", "SUCCEEDED", None, None));

    let payload = json!({
        "eventType": "ACTOR.RUN.SUCCEEDED",
        "resource": {"id": "r9", "status": "RUNNING"}
    });
    let enriched = platform.actions().receive_webhook(&payload).await.unwrap();

    // The stored run wins over the payload copy.
    assert_eq!(enriched.run.status.as_str(), "SUCCEEDED");
    assert_eq!(
        enriched.details_page_url,
        "https://console.apify.com/actors/act1/runs/r9"
    );
    assert_eq!(platform.count("GET", "actor-runs/r9"), 1);
}

#[tokio::test]
async fn test_receive_unknown_run_fails() {
    let platform = FakePlatform::new();
    let err = platform
        .actions()
        .receive_webhook(&json!({"resource": {"id": "gone"}}))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
