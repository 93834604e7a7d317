//! The remote client against a live server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use channeldb::remote::{Method, RemoteClient, RemoteError, TokenProvider};
use channeldb::{GetQuery, ListQuery};
use serde_json::{Value, json};

use crate::helpers::*;

#[tokio::test]
async fn round_trip_through_the_server() {
    let channels = test_channels();
    let events = record_events(&channels);
    let endpoint = start_server(channels.clone(), None).await;
    let client = RemoteClient::new(&endpoint).unwrap();

    let put = client
        .put("/users/alice", json!({ "age": 30 }))
        .await
        .unwrap();
    assert_eq!(put.path, "/users/alice");
    assert_eq!(event_paths(&events), [["/users"], ["/users/alice"]]);

    let entry = client.get("/users/alice").await.unwrap();
    assert_eq!(entry.data, Some(json!({ "age": 30 })));

    let listing = client
        .list("/users", &ListQuery::new().values())
        .await
        .unwrap();
    assert_eq!(listing.paths(), ["/users/alice"]);
    assert!(listing.cursor.is_none());

    let del = client.del("/users").await.unwrap();
    assert_eq!(del.paths, ["/users", "/users/alice"]);
    assert!(channels.get("/users", None).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn remote_handles_and_queries() {
    let endpoint = start_server(test_channels(), None).await;
    let client = RemoteClient::new(&endpoint).unwrap();

    let docs = client.root().child("docs");
    for i in 0..5 {
        docs.child(&format!("{i}")).put(json!({ "i": i })).await.unwrap();
    }

    let mut query = ListQuery::new().limit(2).values();
    let mut seen = Vec::new();
    loop {
        let page = docs.list(&query).await.unwrap();
        seen.extend(page.paths().into_iter().map(str::to_string));
        match page.cursor {
            Some(cursor) => query = cursor.into_query(),
            None => break,
        }
    }
    assert_eq!(seen, ["/docs/0", "/docs/1", "/docs/2", "/docs/3", "/docs/4"]);

    let entry = docs
        .get_with(&GetQuery {
            projection: None,
            children: Some(ListQuery::new().reverse().limit(1)),
        })
        .await
        .unwrap();
    assert_eq!(entry.children.unwrap().paths(), ["/docs/4"]);
}

#[tokio::test]
async fn rejections_carry_the_error_body() {
    let endpoint = start_server(test_channels(), None).await;
    let client = RemoteClient::new(&endpoint).unwrap();

    let err = client.get("/missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
    match err {
        channeldb::Error::Remote(RemoteError::Rejected { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body["code"], 404);
            assert!(body["message"].as_str().unwrap().contains("/missing"));
        }
        other => panic!("expected a rejection, got {other:?}"),
    }

    let err = client.put("/a", json!("")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let endpoint = start_server(test_channels(), None).await;
    let response = reqwest::Client::new()
        .post(&endpoint)
        .header("content-type", "application/json")
        .body(r#"{ "method": "explode" }"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn token_is_enforced() {
    let endpoint = start_server(test_channels(), Some("secret")).await;
    let client = RemoteClient::new(&endpoint).unwrap();

    let err = client.put("/a", json!(1)).await.unwrap_err();
    assert_eq!(err.status_code(), 401);

    let value = client
        .request(Method::Put, "/a", json!(1), Some("secret"))
        .await
        .unwrap();
    assert_eq!(value["path"], "/a");

    client.set_token("secret");
    assert_eq!(client.get("/a").await.unwrap().data, Some(json!(1)));

    // A static token wins over the per-call one
    client.set_token("stale");
    let err = client
        .request(Method::Get, "/a", Value::Null, Some("secret"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 401);
}

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TokenProvider for CountingProvider {
    async fn token(&self) -> channeldb::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("secret".to_string())
    }
}

#[tokio::test]
async fn token_provider_runs_for_every_request() {
    let endpoint = start_server(test_channels(), Some("secret")).await;
    let client = RemoteClient::new(&endpoint).unwrap();
    client.set_token("wrong");

    let calls = Arc::new(AtomicUsize::new(0));
    client.set_token_provider(CountingProvider {
        calls: calls.clone(),
    });

    client.put("/a", json!(1)).await.unwrap();
    client.get("/a").await.unwrap();
    client.list("/", &ListQuery::new()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let endpoint = dead_endpoint().await;
    let client = RemoteClient::with_timeout(&endpoint, Duration::from_secs(2)).unwrap();

    let err = client.get("/a").await.unwrap_err();
    assert!(err.is_transport_error());
    assert!(matches!(
        err,
        channeldb::Error::Remote(RemoteError::Transport { .. })
    ));
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let endpoint = start_server(test_channels(), Some("secret")).await;
    let health = endpoint.replace("/api/v0", "/health");

    let body: Value = reqwest::get(&health).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "channeldb");
}
