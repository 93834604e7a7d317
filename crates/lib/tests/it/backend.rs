//! The KeyValueStore seam and the InMemory store.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use channeldb::Channels;
use channeldb::backend::{
    BackendError, DelReceipt, InMemory, KeyValueStore, PutReceipt, ScanEntry, ScanRange,
};
use serde_json::{Value, json};

use crate::helpers::*;

/// Wraps a store and counts batch deletes.
#[derive(Default)]
struct CountingStore {
    inner: InMemory,
    deletes: Arc<AtomicUsize>,
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Value, BackendError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Value) -> Result<PutReceipt, BackendError> {
        self.inner.put(key, value).await
    }

    async fn del(&self, keys: Vec<String>) -> Result<DelReceipt, BackendError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.del(keys).await
    }

    async fn list(&self, range: ScanRange) -> Result<Vec<ScanEntry>, BackendError> {
        self.inner.list(range).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A store whose every operation fails.
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Value, BackendError> {
        Err(BackendError::Store {
            reason: "offline".to_string(),
        })
    }

    async fn put(&self, _key: &str, _value: Value) -> Result<PutReceipt, BackendError> {
        Err(BackendError::Store {
            reason: "offline".to_string(),
        })
    }

    async fn del(&self, _keys: Vec<String>) -> Result<DelReceipt, BackendError> {
        Err(BackendError::Store {
            reason: "offline".to_string(),
        })
    }

    async fn list(&self, _range: ScanRange) -> Result<Vec<ScanEntry>, BackendError> {
        Err(BackendError::Store {
            reason: "offline".to_string(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[tokio::test]
async fn subtree_delete_is_one_batch() {
    let store = CountingStore::default();
    let deletes = store.deletes.clone();
    let channels = Channels::open(Box::new(store));
    seed(
        &channels,
        &[("/a/b/c", json!(1)), ("/a/d", json!(2)), ("/a/b/e/f", json!(3))],
    )
    .await;

    let event = channels.del("/a").await.unwrap();
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
    assert_eq!(event.paths.len(), 6);
}

#[tokio::test]
async fn store_failures_pass_through() {
    let channels = Channels::open(Box::new(BrokenStore));

    let err = channels.put("/a", json!(1)).await.unwrap_err();
    assert!(err.is_backend_error());
    assert_eq!(err.status_code(), 500);

    let err = channels.get("/a", None).await.unwrap_err();
    assert!(err.is_backend_error());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn storage_layout_is_channel_then_key() {
    let channels = Channels::open(Box::new(InMemory::new()));
    channels.put("/users/alice", json!({ "age": 30 })).await.unwrap();

    let keys = channels
        .backend()
        .as_any()
        .downcast_ref::<InMemory>()
        .unwrap()
        .keys()
        .await;
    assert_eq!(keys, ["!/!users", "!/users!alice"]);
}

#[tokio::test]
async fn persisted_store_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("channeldb.json");

    let channels = test_channels();
    seed(
        &channels,
        &[("/users/alice", json!({ "age": 30 })), ("/users/bob", json!({ "age": 40 }))],
    )
    .await;
    let store = channels
        .backend()
        .as_any()
        .downcast_ref::<InMemory>()
        .unwrap();
    store.save_to_file(&path).await.unwrap();

    let reopened = Channels::open(Box::new(InMemory::load_from_file(&path).await.unwrap()));
    let alice = reopened.get("/users/alice", None).await.unwrap();
    assert_eq!(alice.data, Some(json!({ "age": 30 })));
    assert_eq!(
        reopened
            .list("/users", &channeldb::ListQuery::new())
            .await
            .unwrap()
            .paths(),
        ["/users/alice", "/users/bob"]
    );
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, b"{ not json").await.unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(matches!(err, BackendError::DeserializationFailed { .. }));
}

#[tokio::test]
async fn unsupported_version_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    let contents = r#"{"_v":7,"entries":{"!/!a":{"x":1}}}"#;
    tokio::fs::write(&path, contents).await.unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(matches!(err, BackendError::DeserializationFailed { .. }));
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), contents);
}
