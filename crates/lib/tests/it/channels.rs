//! put/get/del semantics and channel handles.

use channeldb::{GetQuery, ListQuery};
use serde_json::{Value, json};

use crate::helpers::*;

#[tokio::test]
async fn users_end_to_end() {
    let channels = test_channels();

    let event = channels
        .put("/users/alice", json!({ "age": 30 }))
        .await
        .unwrap();
    assert_eq!(event.path, "/users/alice");
    assert_eq!(event.channel, "/users");
    assert_eq!(event.key, "alice");

    let parent = channels.get("/users", None).await.unwrap();
    assert_eq!(parent.data, Some(json!({})));

    let listing = channels
        .list("/users", &ListQuery::new().values())
        .await
        .unwrap();
    assert_eq!(listing.paths(), ["/users/alice"]);
    assert_eq!(listing.data[0].data, Some(json!({ "age": 30 })));
    assert!(listing.cursor.is_none());

    let json = serde_json::to_value(&listing).unwrap();
    assert_eq!(
        json,
        json!({
            "data": [{
                "path": "/users/alice",
                "channel": "/users",
                "key": "alice",
                "data": { "age": 30 }
            }],
            "cursor": null
        })
    );
}

#[tokio::test]
async fn ancestors_exist_after_deep_write() {
    let channels = test_channels();
    channels.put("/a/b/c/d", json!("leaf")).await.unwrap();

    for path in ["/a", "/a/b", "/a/b/c"] {
        let entry = channels.get(path, None).await.unwrap();
        assert_eq!(entry.data, Some(json!({})), "{path} was not materialized");
    }
    assert_eq!(
        channels.get("/a/b/c/d", None).await.unwrap().data,
        Some(json!("leaf"))
    );
}

#[tokio::test]
async fn overwrite_keeps_children() {
    let channels = test_channels();
    channels.put("/a/b", json!(1)).await.unwrap();
    channels.put("/a", json!({ "name": "a" })).await.unwrap();

    assert_eq!(channels.get("/a/b", None).await.unwrap().data, Some(json!(1)));
    assert_eq!(
        channels.get("/a", None).await.unwrap().data,
        Some(json!({ "name": "a" }))
    );
}

#[tokio::test]
async fn paths_are_normalized() {
    let channels = test_channels();
    channels.put("//x//y/", json!(true)).await.unwrap();

    let entry = channels.get("/x/y", None).await.unwrap();
    assert_eq!(entry.path(), Some("/x/y"));
    assert_eq!(entry.data, Some(json!(true)));
}

#[tokio::test]
async fn error_codes() {
    let channels = test_channels();

    let err = channels.put("/a", Value::Null).await.unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(err.status_code(), 400);

    let err = channels.put("/a!b", json!(1)).await.unwrap_err();
    assert!(err.is_invalid_path());
    assert_eq!(err.status_code(), 400);

    let err = channels.get("/never", None).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn recursive_delete_spares_siblings() {
    let channels = test_channels();
    seed(
        &channels,
        &[
            ("/a/b/c", json!(1)),
            ("/a/e", json!(2)),
            ("/a-z", json!(3)),
            ("/ab", json!(4)),
        ],
    )
    .await;

    let event = channels.del("/a").await.unwrap();
    let mut removed = event.paths.clone();
    removed.sort();
    assert_eq!(removed, ["/a", "/a/b", "/a/b/c", "/a/e"]);
    assert_eq!(event.paths[0], "/a");

    let remaining = channels.list("/", &ListQuery::new().deep()).await.unwrap();
    assert_eq!(remaining.paths(), ["/a-z", "/ab"]);
}

#[tokio::test]
async fn deleting_a_missing_path_succeeds() {
    let channels = test_channels();
    let event = channels.del("/ghost").await.unwrap();
    assert_eq!(event.paths, ["/ghost"]);
}

#[tokio::test]
async fn get_attaches_children() {
    let channels = test_channels();
    seed(
        &channels,
        &[("/docs/a", json!({ "n": 1 })), ("/docs/b", json!({ "n": 2 }))],
    )
    .await;

    let query = GetQuery {
        projection: None,
        children: Some(ListQuery::new().values().reverse()),
    };
    let entry = channels.get("/docs", Some(&query)).await.unwrap();
    assert_eq!(entry.data, Some(json!({})));
    let children = entry.children.unwrap();
    assert_eq!(children.paths(), ["/docs/b", "/docs/a"]);

    let empty = channels.get("/docs/a", Some(&query)).await.unwrap();
    assert!(empty.children.unwrap().data.is_empty());
}

#[tokio::test]
async fn handles_navigate_and_operate() {
    let channels = test_channels();
    let root = channels.root();
    assert_eq!(root.path(), "/");

    let settings = root.child("app").child("settings");
    assert_eq!(settings.path(), "/app/settings");
    settings.put(json!({ "theme": "dark" })).await.unwrap();

    let app = channels.channel("/app");
    let listing = app.list(&ListQuery::new().values()).await.unwrap();
    assert_eq!(listing.paths(), ["/app/settings"]);

    let projected = settings
        .get_with(&GetQuery {
            projection: serde_json::from_value(json!({ "key": true })).unwrap(),
            children: None,
        })
        .await
        .unwrap();
    assert_eq!(projected.key.as_deref(), Some("settings"));
    assert!(projected.data.is_none());

    app.del().await.unwrap();
    assert!(settings.get().await.unwrap_err().is_not_found());
}
