#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use datalayer::{memory::IdentifiableMemoryStore, prelude::*};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Identifiable, PartialUpdate)]
pub struct Dummy {
    #[patch(skip)]
    pub id: String,
    pub key: String,
    pub content: String,
}

impl Dummy {
    pub fn new(key: &str, content: &str) -> Self {
        Self {
            key: key.to_string(),
            content: content.to_string(),
            ..Self::default()
        }
    }
}

pub fn dummy1() -> Dummy {
    Dummy::new("Key 11", "Content 1")
}

pub fn dummy2() -> Dummy {
    Dummy::new("Key 2", "Content 2")
}

/// Matches dummies by the optional `key` filter parameter.
pub fn dummy_filter(params: &FilterParams) -> Filter<Dummy> {
    let key = params.get_as_nullable_string("key");

    Filter::new(move |item: &Dummy| key.as_ref().is_none_or(|key| &item.key == key))
}

/// Orders dummies by the length of their key.
pub fn dummy_query(params: &FilterParams) -> Query<Dummy> {
    Query {
        filter: Some(dummy_filter(params)),
        sort: Some(Comparator::new(|a: &Dummy, b: &Dummy| a.key.len() < b.key.len())),
        select: None,
    }
}

pub async fn test_crud_operations(store: &IdentifiableMemoryStore<Dummy>) {
    let created1 = store.create("crud", dummy1()).await.unwrap();
    assert!(!created1.id.is_empty());
    assert_eq!(created1.key, "Key 11");
    assert_eq!(created1.content, "Content 1");

    let created2 = store.create("crud", dummy2()).await.unwrap();
    assert!(!created2.id.is_empty());
    assert_ne!(created1.id, created2.id);

    // Shorter keys sort first
    let page = store
        .get_page_by_filter("crud", dummy_query(&FilterParams::new()), PagingParams::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].key, created2.key);
    assert_eq!(page.data[1].key, created1.key);

    let count = store
        .get_count_by_filter("crud", Some(dummy_filter(&FilterParams::new())))
        .await
        .unwrap();
    assert_eq!(count, 2);

    let filtered = store
        .get_list_by_filter("crud", dummy_query(&FilterParams::from_tuples([("Key", "Key 2")])))
        .await
        .unwrap();
    assert_eq!(filtered, vec![created2.clone()]);

    let changed = Dummy {
        content: "Updated Content 1".to_string(),
        ..created1.clone()
    };
    let updated = store.update("crud", changed.clone()).await.unwrap();
    assert_eq!(updated, Some(changed));

    let patched = store
        .update_partially(
            "crud",
            &created1.id,
            Patch::new().with("Content", "Partially Updated Content 1"),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.id, created1.id);
    assert_eq!(patched.key, created1.key);
    assert_eq!(patched.content, "Partially Updated Content 1");

    let found = store.get_one_by_id("crud", &created1.id).await.unwrap();
    assert_eq!(found, Some(patched.clone()));

    let deleted = store.delete_by_id("crud", &created1.id).await.unwrap();
    assert_eq!(deleted, Some(patched));

    assert_eq!(store.get_one_by_id("crud", &created1.id).await.unwrap(), None);
    assert_eq!(store.delete_by_id("crud", &created1.id).await.unwrap(), None);
}

pub async fn test_batch_operations(store: &IdentifiableMemoryStore<Dummy>) {
    let created1 = store.create("batch", dummy1()).await.unwrap();
    let created2 = store.create("batch", dummy2()).await.unwrap();
    let ids = vec![created1.id.clone(), created2.id.clone()];

    let items = store.get_list_by_ids("batch", &ids).await.unwrap();
    assert_eq!(items, vec![created1, created2]);

    assert_eq!(store.delete_by_ids("batch", &ids).await.unwrap(), 2);

    let items = store.get_list_by_ids("batch", &ids).await.unwrap();
    assert!(items.is_empty());
}

/// Runs the id-based lifecycle of a record through the capability traits only.
pub async fn test_capabilities<S>(store: &S)
where
    S: Writer<Dummy> + Setter<Dummy> + Getter<Dummy> + PartialUpdater<Dummy>,
{
    let created = store.create("traits", dummy1()).await.unwrap();

    let missing = Dummy {
        id: "missing".to_string(),
        ..dummy2()
    };
    assert_eq!(store.update("traits", missing.clone()).await.unwrap(), None);
    assert_eq!(store.get_one_by_id("traits", &missing.id).await.unwrap(), None);

    let upserted = store.set("traits", missing.clone()).await.unwrap();
    assert_eq!(upserted, missing);
    assert_eq!(store.get_one_by_id("traits", &missing.id).await.unwrap(), Some(missing));

    let patched = store
        .update_partially("traits", &created.id, Patch::new().with("key", "Key 3"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.key, "Key 3");
    assert_eq!(patched.content, created.content);

    assert!(store.delete_by_id("traits", &created.id).await.unwrap().is_some());
}

pub async fn test_map_operations(store: &IdentifiableMemoryStore<DataMap>) {
    let created1 = store
        .create("map", DataMap::new().with("key", "Key 11").with("content", "Content 1"))
        .await
        .unwrap();
    assert!(!created1.id().is_empty());
    assert_eq!(created1.get_as_string("key"), "Key 11");

    let created2 = store
        .create("map", DataMap::new().with("Id", "custom").with("key", "Key 2"))
        .await
        .unwrap();
    assert_eq!(created2.id(), "custom");

    let sorted = store
        .get_list_by_filter(
            "map",
            Query::builder()
                .sort(|a: &DataMap, b: &DataMap| a.get_as_string("key").len() < b.get_as_string("key").len())
                .build(),
        )
        .await
        .unwrap();
    assert_eq!(sorted[0].id(), "custom");

    let patched = store
        .update_partially(
            "map",
            created1.id(),
            Patch::new().with("Content", "Partially Updated Content 1").with("extra", 1),
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched.get_as_string("content"), "Partially Updated Content 1");
    assert_eq!(patched.get_as_string("key"), "Key 11");
    assert_eq!(patched.get_value("extra"), Some(&serde_json::json!(1)));

    let ids = vec![created1.id().clone(), created2.id().clone()];
    assert_eq!(store.get_list_by_ids("map", &ids).await.unwrap().len(), 2);
    assert_eq!(store.delete_by_ids("map", &ids).await.unwrap(), 2);
    assert_eq!(store.get_count_by_filter("map", None).await.unwrap(), 0);
}
