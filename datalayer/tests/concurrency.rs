mod common;

use futures::future::join_all;
use tempfile::tempdir;

use datalayer::{file::IdentifiableFileStore, memory::IdentifiableMemoryStore, prelude::*};

use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_are_all_kept() {
    let store = IdentifiableMemoryStore::<Dummy>::new();
    store.open("test").await.unwrap();

    let tasks = (0..50).map(|index| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .create("test", Dummy::new(&format!("Key {index}"), "Content"))
                .await
                .unwrap()
        })
    });

    let created: Vec<Dummy> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 50);

    let mut ids: Vec<_> = created.iter().map(|item| item.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_partial_updates_touch_their_own_field() {
    let store = IdentifiableMemoryStore::<Dummy>::new();
    let created = store.create("test", dummy1()).await.unwrap();

    let key_update = store.update_partially("test", &created.id, Patch::new().with("key", "Key 3"));
    let content_update = store.update_partially("test", &created.id, Patch::new().with("content", "Content 3"));
    let (first, second) = tokio::join!(key_update, content_update);
    first.unwrap();
    second.unwrap();

    let stored = store.get_one_by_id("test", &created.id).await.unwrap().unwrap();
    assert_eq!(stored.key, "Key 3");
    assert_eq!(stored.content, "Content 3");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_writes_to_file_store_are_saved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dummies.json");

    let store = IdentifiableFileStore::<Dummy>::new(&path);
    store.open("test").await.unwrap();

    let creates = (0..32).map(|index| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .create("test", Dummy::new(&format!("Key {index}"), "Content"))
                .await
        })
    });

    let created: Vec<Dummy> = join_all(creates)
        .await
        .into_iter()
        .map(|result| result.unwrap().unwrap())
        .collect();

    let updates = created.iter().map(|item| {
        let store = store.clone();
        let id = item.id.clone();
        tokio::spawn(async move {
            store
                .update_partially("test", &id, Patch::new().with("content", format!("Content {id}")))
                .await
        })
    });

    for result in join_all(updates).await {
        assert!(result.unwrap().unwrap().is_some());
    }

    store.close("test").await.unwrap();

    let reopened = IdentifiableFileStore::<Dummy>::new(&path);
    reopened.open("test").await.unwrap();

    assert_eq!(reopened.get_count_by_filter("test", None).await.unwrap(), 32);
    for item in &created {
        let stored = reopened.get_one_by_id("test", &item.id).await.unwrap().unwrap();
        assert_eq!(stored.key, item.key);
        assert_eq!(stored.content, format!("Content {}", item.id));
    }
}
