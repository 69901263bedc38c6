//! Mutations in flight at the same time are folded into the cache in the
//! order they complete, not the order they were issued.

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::json;

use postboard::application::posts::{PostUpdate, PostsService};
use postboard::cache::{CacheConfig, QueryStore, SyncKind};
use postboard::domain::posts::PostPatch;
use postboard::infra::http::HttpClient;

const SLOW: Duration = Duration::from_millis(400);
const FAST: Duration = Duration::from_millis(20);

async fn seeded_service(server: &MockServer) -> PostsService<HttpClient> {
    server
        .mock_async(|when, then| {
            when.method("GET").path("/posts");
            then.status(200).json_body(json!([
                { "userId": 1, "id": 1, "title": "first", "body": "one" },
                { "userId": 1, "id": 2, "title": "second", "body": "two" }
            ]));
        })
        .await;

    let client = HttpClient::new(&server.base_url(), Duration::from_secs(5), 1)
        .expect("client should build");
    let store = Arc::new(QueryStore::new(&CacheConfig::default()));
    let service = PostsService::new(Arc::new(client), store);
    service.load_posts().await.expect("seed load");
    service
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reversed_latencies_apply_in_completion_order() {
    let server = MockServer::start_async().await;
    let service = seeded_service(&server).await;

    server
        .mock_async(|when, then| {
            when.method("PATCH").path("/posts/1");
            then.status(200)
                .delay(SLOW)
                .json_body(json!({ "title": "first [Patched]" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("DELETE").path("/posts/2");
            then.status(200).delay(FAST).json_body(json!({}));
        })
        .await;

    let (patched, deleted) = tokio::join!(
        service.patch(1, PostPatch::title("first [Patched]")),
        service.delete(2),
    );
    let patched = patched.expect("patch");
    let deleted = deleted.expect("delete");

    assert!(deleted.event.epoch < patched.event.epoch);
    let kinds: Vec<SyncKind> = service
        .store()
        .sync_log()
        .events()
        .iter()
        .map(|event| event.kind)
        .collect();
    assert_eq!(kinds, vec![SyncKind::Delete, SyncKind::Patch]);

    let posts = service.store().posts().expect("cached");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "first [Patched]");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn same_id_race_keeps_last_applied() {
    let server = MockServer::start_async().await;
    let service = seeded_service(&server).await;

    server
        .mock_async(|when, then| {
            when.method("PUT").path("/posts/1");
            then.status(200)
                .delay(SLOW)
                .json_body(json!({ "id": 1, "userId": 1, "title": "replaced", "body": "full" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("PATCH").path("/posts/1");
            then.status(200)
                .delay(FAST)
                .json_body(json!({ "title": "patched" }));
        })
        .await;

    let (updated, patched) = tokio::join!(
        service.update(PostUpdate {
            id: 1,
            user_id: 1,
            title: "replaced".into(),
            body: "full".into(),
        }),
        service.patch(1, PostPatch::title("patched")),
    );
    let updated = updated.expect("update");
    let patched = patched.expect("patch");

    assert!(patched.event.epoch < updated.event.epoch);
    let posts = service.store().posts().expect("cached");
    assert_eq!(posts[0].title, "replaced");
    assert_eq!(posts[0].body, "full");
}
