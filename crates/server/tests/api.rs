use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use server::{AppState, routes};
use store::{
    Batch, MemoryStore, StatsStore, StatsWriter,
    keys::{MESSAGES_PER_SECOND_FIELD, messages_per_second_key},
};
use tower::ServiceExt;
use utils::time::seconds_since_epoch;

fn app(store: Arc<MemoryStore>) -> Router {
    routes::router(AppState::new(store))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn seeded() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let writer = StatsWriter::new(store.clone());
    writer
        .record_message("#slicyyyon60fps", "slicyyyy", &["MEUBEL"])
        .await
        .unwrap();
    writer
        .record_message("#slicyyyon60fps", "slicyyyy", &["MEUBEL", "our"])
        .await
        .unwrap();
    writer
        .record_message("#sadparu", "moczark", &["our", "seen"])
        .await
        .unwrap();
    writer.record_failure("garbage {not json}").await.unwrap();
    store
}

#[tokio::test]
async fn root_reports_status() {
    let (status, body) = get(app(Arc::new(MemoryStore::new())), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": true }));
}

#[tokio::test]
async fn healthcheck_reports_store_state() {
    let store = Arc::new(MemoryStore::new());

    let (status, body) = get(app(store.clone()), "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["redisStatus"], "ready");
    assert!(body["serverTimestamp"].is_string());

    store.set_unavailable(true).await;
    let (status, body) = get(app(store), "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redisStatus"], "down");
}

#[tokio::test]
async fn top_lists_are_single_key_objects_in_score_order() {
    let store = seeded().await;

    let (status, words) = get(app(store.clone()), "/stats/words").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(words, json!([{ "our": 2 }, { "MEUBEL": 2 }, { "seen": 1 }]));

    let (_, nicks) = get(app(store.clone()), "/stats/nicks").await;
    assert_eq!(nicks, json!([{ "slicyyyy": 2 }, { "moczark": 1 }]));

    let (_, rooms) = get(app(store), "/stats/rooms").await;
    assert_eq!(rooms, json!([{ "#slicyyyon60fps": 2 }, { "#sadparu": 1 }]));
}

#[tokio::test]
async fn empty_store_yields_empty_lists_and_zero_throughput() {
    let store = Arc::new(MemoryStore::new());

    let (_, words) = get(app(store.clone()), "/stats/words").await;
    assert_eq!(words, json!([]));

    let (status, stats) = get(app(store), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "messagesPerSecond": 0 }));
}

#[tokio::test]
async fn stats_reads_the_current_second_bucket() {
    let store = Arc::new(MemoryStore::new());
    let now = seconds_since_epoch();
    let mut batch = Batch::new();
    // Cover the second boundary between seeding and the request.
    for second in [now, now + 1] {
        batch.hset(&messages_per_second_key(second), MESSAGES_PER_SECOND_FIELD, "7");
    }
    store.exec(batch).await.unwrap().into_result().unwrap();

    let (_, stats) = get(app(store), "/stats").await;
    assert_eq!(stats, json!({ "messagesPerSecond": 7 }));
}

#[tokio::test]
async fn failed_messages_are_listed() {
    let (status, failed) = get(app(seeded().await), "/stats/failedMessages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(failed, json!(["garbage {not json}"]));
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let store = Arc::new(MemoryStore::new());
    store.set_unavailable(true).await;

    let (status, body) = get(app(store), "/stats/words").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert!(body["message"].as_str().unwrap().starts_with("StoreUnavailable"));
}
