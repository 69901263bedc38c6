use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::json;
use tokio::io::BufReader;

use postboard::application::posts::PostsService;
use postboard::cache::{CacheConfig, QueryStore};
use postboard::infra::http::HttpClient;
use postboard::presentation::OutputFormat;
use postboard::presentation::session::{Reply, Session, SessionError};

async fn mock_api(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method("GET").path("/posts");
            then.status(200).json_body(json!([
                { "userId": 4, "id": 1, "title": "first", "body": "one" },
                { "userId": 1, "id": 2, "title": "second", "body": "two" }
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("PATCH")
                .path("/posts/1")
                .json_body(json!({ "title": "first [Patched]" }));
            then.status(200)
                .json_body(json!({ "id": 1, "userId": 4, "title": "first [Patched]", "body": "one" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/posts/1/comments");
            then.status(200).json_body(json!([
                { "postId": 1, "id": 1, "name": "n", "email": "reader@example.com", "body": "nice" }
            ]));
        })
        .await;
}

fn session(server: &MockServer, format: OutputFormat) -> Session<HttpClient> {
    let client = HttpClient::new(&server.base_url(), Duration::from_secs(5), 1)
        .expect("client should build");
    let store = Arc::new(QueryStore::new(&CacheConfig::default()));
    Session::new(PostsService::new(Arc::new(client), store), 10, 1, format)
}

#[tokio::test]
async fn scripted_session_runs_until_quit() {
    let server = MockServer::start_async().await;
    mock_api(&server).await;
    let mut session = session(&server, OutputFormat::Text);

    let script = b"list\npatch 1\ncomments 1\nlist\nbogus\nlog\nquit\nlist\n";
    let mut output = Vec::new();
    session
        .run(BufReader::new(&script[..]), &mut output)
        .await
        .expect("session should run");
    let output = String::from_utf8(output).expect("utf8 output");

    assert!(output.contains("#1 first"));
    assert!(output.contains("Showing 2 of 2 posts."));
    assert!(output.contains("patched post #1"));
    assert!(output.contains("Comments on post #1 (1)"));
    assert!(output.contains("#1 first [Patched]"));
    assert!(output.contains("> reader@example.com: nice"));
    assert!(output.contains("error: unknown command `bogus`"));
    assert!(output.contains("[epoch 0]"));
    assert_eq!(session.expanded().collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn patch_requires_cached_post() {
    let server = MockServer::start_async().await;
    mock_api(&server).await;
    let mut session = session(&server, OutputFormat::Text);

    let err = session.handle_line("patch 1").await.expect_err("not cached");
    assert!(matches!(err, SessionError::App(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn comments_toggle_and_quit() {
    let server = MockServer::start_async().await;
    mock_api(&server).await;
    let mut session = session(&server, OutputFormat::Text);

    session.handle_line("comments 1").await.expect("expand");
    let reply = session.handle_line("comments 1").await.expect("collapse");
    assert_eq!(reply, Reply::Output("Comments hidden for post #1.".into()));
    assert_eq!(session.expanded().count(), 0);
    assert_eq!(session.handle_line("quit").await.expect("quit"), Reply::Quit);
}

#[tokio::test]
async fn json_format_prints_posts() {
    let server = MockServer::start_async().await;
    mock_api(&server).await;
    let mut session = session(&server, OutputFormat::Json);

    let Reply::Output(out) = session.handle_line("list 1").await.expect("list") else {
        panic!("expected output");
    };
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["userId"], 4);
}

#[tokio::test]
async fn server_errors_are_reported_as_retryable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("DELETE").path("/posts/9");
            then.status(500);
        })
        .await;
    let mut session = session(&server, OutputFormat::Text);

    let mut output = Vec::new();
    session
        .run(BufReader::new(&b"delete 9\n"[..]), &mut output)
        .await
        .expect("session should run");
    let output = String::from_utf8(output).expect("utf8 output");
    assert!(output.contains("status 500"));
    assert!(output.contains("(try again)"));
}

#[tokio::test]
async fn json_format_reports_hidden_comments() {
    let server = MockServer::start_async().await;
    mock_api(&server).await;
    let mut session = session(&server, OutputFormat::Json);

    session.handle_line("comments 1").await.expect("expand");
    let Reply::Output(out) = session.handle_line("comments 1").await.expect("collapse") else {
        panic!("expected output");
    };
    let value: serde_json::Value = serde_json::from_str(&out).expect("json");
    assert_eq!(value, json!({ "postId": 1, "expanded": false }));
}
