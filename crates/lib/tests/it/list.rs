//! The list pipeline: ranges, bounds, filters, projections and cursors.

use channeldb::{Channels, ListQuery};
use serde_json::{Map, Value, json};

use crate::helpers::*;

fn projection(value: Value) -> Map<String, Value> {
    serde_json::from_value(value).unwrap()
}

/// Follows cursors until the listing is exhausted, returning every page.
async fn all_pages(channels: &Channels, path: &str, query: ListQuery) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut query = query;
    loop {
        let page = channels.list(path, &query).await.unwrap();
        pages.push(page.paths().into_iter().map(str::to_string).collect());
        match page.cursor {
            Some(cursor) => query = cursor.into(),
            None => return pages,
        }
    }
}

async fn tree() -> Channels {
    let channels = test_channels();
    seed(
        &channels,
        &[
            ("/t/a", json!({ "n": 1 })),
            ("/t/b/x", json!({ "n": 2 })),
            ("/t/b/y", json!({ "n": 3 })),
            ("/t/c", json!({ "n": 4 })),
            ("/t-sibling", json!({ "n": 5 })),
        ],
    )
    .await;
    channels
}

#[tokio::test]
async fn shallow_lists_direct_children_only() {
    let channels = tree().await;
    let listing = channels.list("/t", &ListQuery::new()).await.unwrap();
    assert_eq!(listing.paths(), ["/t/a", "/t/b", "/t/c"]);
}

#[tokio::test]
async fn deep_lists_the_subtree() {
    let channels = tree().await;
    let listing = channels.list("/t", &ListQuery::new().deep()).await.unwrap();
    assert_eq!(
        listing.paths(),
        ["/t/a", "/t/b", "/t/c", "/t/b/x", "/t/b/y"]
    );
}

#[tokio::test]
async fn forward_pages_cover_everything_once() {
    let channels = tree().await;
    let pages = all_pages(&channels, "/t", ListQuery::new().deep().limit(2)).await;
    assert_eq!(
        pages,
        [
            vec!["/t/a", "/t/b"],
            vec!["/t/c", "/t/b/x"],
            vec!["/t/b/y"],
        ]
    );
}

#[tokio::test]
async fn reverse_pages_cover_everything_once() {
    let channels = tree().await;
    let pages = all_pages(&channels, "/t", ListQuery::new().deep().reverse().limit(2)).await;
    assert_eq!(
        pages,
        [
            vec!["/t/b/y", "/t/b/x"],
            vec!["/t/c", "/t/b"],
            vec!["/t/a"],
        ]
    );
}

#[tokio::test]
async fn exact_multiple_ends_with_an_empty_page() {
    let channels = test_channels();
    seed(&channels, &[("/p/1", json!(1)), ("/p/2", json!(2))]).await;

    let pages = all_pages(&channels, "/p", ListQuery::new().limit(2)).await;
    assert_eq!(pages, [vec!["/p/1", "/p/2"], vec![]]);
}

#[tokio::test]
async fn cursor_echoes_the_query() {
    let channels = tree().await;
    let query = ListQuery::new()
        .values()
        .limit(1)
        .lt("c")
        .filter(json!({}))
        .projection(projection(json!({ "path": true })));

    let page = channels.list("/t", &query).await.unwrap();
    let cursor = page.cursor.unwrap();
    let next = cursor.query();
    assert_eq!(next.gt.as_deref(), Some("a"));
    assert_eq!(next.lt.as_deref(), Some("c"));
    assert!(next.values);
    assert_eq!(next.limit, Some(1));
    assert_eq!(next.filter, query.filter);
    assert_eq!(next.projection, query.projection);
}

#[tokio::test]
async fn text_filter_matches_all_terms() {
    let channels = test_channels();
    seed(
        &channels,
        &[
            ("/notes/1", json!("Buy milk and bread")),
            ("/notes/2", json!("bread recipes")),
            ("/notes/3", json!("call mom")),
        ],
    )
    .await;

    let listing = channels
        .list("/notes", &ListQuery::new().values().filter(json!("BREAD buy")))
        .await
        .unwrap();
    assert_eq!(listing.paths(), ["/notes/1"]);
}

#[tokio::test]
async fn structural_filter_checks_types() {
    let channels = test_channels();
    seed(
        &channels,
        &[
            ("/u/a", json!({ "age": 30, "tags": ["admin"] })),
            ("/u/b", json!({ "age": "30" })),
            ("/u/c", json!({ "name": "c" })),
        ],
    )
    .await;

    let listing = channels
        .list("/u", &ListQuery::new().values().filter(json!({ "age": 30 })))
        .await
        .unwrap();
    assert_eq!(listing.paths(), ["/u/a"]);

    let everyone = channels
        .list("/u", &ListQuery::new().values().filter(json!({})))
        .await
        .unwrap();
    assert_eq!(everyone.paths(), ["/u/a", "/u/b", "/u/c"]);
}

#[tokio::test]
async fn projection_restricts_entries() {
    let channels = test_channels();
    seed(
        &channels,
        &[(
            "/u/alice",
            json!({ "age": 30, "address": { "city": "Oslo", "zip": "0150" } }),
        )],
    )
    .await;

    let listing = channels
        .list(
            "/u",
            &ListQuery::new().values().projection(projection(json!({
                "key": 1,
                "data": { "address": { "city": true } }
            }))),
        )
        .await
        .unwrap();

    let json = serde_json::to_value(&listing.data[0]).unwrap();
    assert_eq!(
        json,
        json!({ "key": "alice", "data": { "address": { "city": "Oslo" } } })
    );
    assert!(listing.paths().is_empty());
}

#[tokio::test]
async fn listing_a_leaf_is_empty() {
    let channels = tree().await;
    let listing = channels
        .list("/t/a", &ListQuery::new().deep().limit(5))
        .await
        .unwrap();
    assert!(listing.data.is_empty());
    assert!(listing.cursor.is_none());
}
