//! In-memory record store.
//!
//! This module provides [`MemoryStore`], an ordered collection of records behind an
//! async-safe read-write lock. When wired to a [`Loader`] and a [`Saver`] it mirrors
//! its entire contents to external storage: it loads on open and saves after every
//! mutation.

use std::{fmt, sync::Arc};
use async_trait::async_trait;
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use datalayer_core::{
    backend::{Loader, Persister, Saver},
    config::{DEFAULT_MAX_PAGE_SIZE, StoreConfig},
    error::{PersistenceResult, WriteError, WriteResult},
    page::{DataPage, PagingParams},
    query::{Filter, Query},
    record::Record,
    sort::Sorter,
    store::{Cleanable, Openable},
};

/// Records held by a store, in storage order, and the lifecycle flag.
pub(crate) struct StoreState<T> {
    pub(crate) items: Vec<T>,
    pub(crate) opened: bool,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            opened: false,
        }
    }
}


/// Thread-safe in-memory record store.
///
/// Records are kept in insertion order. Every read returns clones and every write
/// stores clones, so callers never alias stored state.
///
/// # Thread Safety
///
/// `MemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying records, loader and saver.
///
/// # Persistence
///
/// Mutations are applied in memory under the write lock, then [`MemoryStore::save`]
/// hands the whole record set to the saver under the read lock. A failed save does
/// not roll the mutation back: mutating operations report it as a
/// [`WriteError`] carrying the record as it now exists in memory.
///
/// # Example
///
/// ```ignore
/// use datalayer_memory::MemoryStore;
/// use datalayer::query::Query;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStore::new();
///     store.open("main").await?;
///
///     store.create("main", "hello".to_string()).await?;
///     let items = store.get_list_by_filter("main", Query::new()).await?;
///     assert_eq!(items, vec!["hello".to_string()]);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MemoryStore<T: Record> {
    pub(crate) state: Arc<RwLock<StoreState<T>>>,
    loader: Option<Arc<dyn Loader<T>>>,
    saver: Option<Arc<dyn Saver<T>>>,
    max_page_size: usize,
}

impl<T: Record> MemoryStore<T> {
    /// Creates a new empty store with no loader or saver.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for constructing a `MemoryStore` with custom options.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = MemoryStore::<Note>::builder()
    ///     .max_page_size(20)
    ///     .persister(Arc::new(JsonFilePersister::new("notes.json")))
    ///     .build();
    /// ```
    pub fn builder() -> MemoryStoreBuilder<T> {
        MemoryStoreBuilder::default()
    }

    /// Maximum number of records returned by a single page.
    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    /// Returns `true` between a successful [`MemoryStore::open`] and [`MemoryStore::close`].
    pub async fn is_open(&self) -> bool {
        self.state
            .read()
            .await
            .opened
    }

    /// Opens the store, filling it from the loader when one is configured.
    ///
    /// The load happens under the write lock. A loader reporting that nothing has
    /// been stored yet leaves the current records in place.
    ///
    /// # Errors
    ///
    /// Returns the loader's error verbatim. The store then stays unopened and its
    /// records are untouched.
    pub async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        let mut state = self.state.write().await;

        if let Some(loader) = &self.loader {
            if let Some(items) = loader.load(correlation_id).await? {
                trace!(correlation_id = %correlation_id, "Loaded {} items", items.len());
                state.items = items;
            }
        }

        state.opened = true;
        debug!(correlation_id = %correlation_id, "Opened store");

        Ok(())
    }

    /// Saves every record, then marks the store closed.
    ///
    /// The store is closed even when the save fails; the save error is still returned.
    pub async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        let result = self.save(correlation_id).await;

        if let Err(err) = &result {
            warn!(correlation_id = %correlation_id, error = %err, "Failed to save items while closing");
        }

        self.state.write().await.opened = false;
        debug!(correlation_id = %correlation_id, "Closed store");

        result
    }

    /// Hands the entire record set to the saver. Does nothing without a saver.
    pub async fn save(&self, correlation_id: &str) -> PersistenceResult<()> {
        let Some(saver) = &self.saver else {
            return Ok(());
        };

        let state = self.state.read().await;
        saver
            .save(correlation_id, &state.items)
            .await?;

        trace!(correlation_id = %correlation_id, "Saved {} items", state.items.len());
        Ok(())
    }

    /// Removes every record, then saves so that the emptiness is persisted too.
    pub async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.state.write().await.items.clear();
        trace!(correlation_id = %correlation_id, "Cleared items");

        self.save(correlation_id).await
    }

    /// Runs a query and returns one page of the result.
    ///
    /// Matching records are sorted (stably), counted when `paging.total` is set,
    /// skipped and taken according to `paging`, and finally projected. `take`
    /// defaults to, and never exceeds, the store's maximum page size.
    ///
    /// # Arguments
    ///
    /// * `correlation_id` - Id used to trace the call through the call chain
    /// * `query` - Optional filter, sort and projection
    /// * `paging` - Which slice of the sorted result to return
    pub async fn get_page_by_filter(
        &self,
        correlation_id: &str,
        query: Query<T>,
        paging: PagingParams,
    ) -> PersistenceResult<DataPage<T>> {
        let mut items = self.snapshot(query.filter.as_ref()).await;
        Sorter::new(&mut items, query.sort.as_ref()).sort();

        let mut page = paging.paginate(items, self.max_page_size);
        if let Some(select) = &query.select {
            page.data = page.data
                .into_iter()
                .map(|item| select.apply(item))
                .collect();
        }

        trace!(correlation_id = %correlation_id, "Retrieved {} items", page.data.len());
        Ok(page)
    }

    /// Runs a query and returns every matching record, sorted and projected.
    pub async fn get_list_by_filter(&self, correlation_id: &str, query: Query<T>) -> PersistenceResult<Vec<T>> {
        let mut items = self.snapshot(query.filter.as_ref()).await;
        Sorter::new(&mut items, query.sort.as_ref()).sort();

        if let Some(select) = &query.select {
            items = items
                .into_iter()
                .map(|item| select.apply(item))
                .collect();
        }

        trace!(correlation_id = %correlation_id, "Retrieved {} items", items.len());
        Ok(items)
    }

    /// Returns a uniformly random record among those matching `filter`, or `None`
    /// when nothing matches.
    pub async fn get_one_random(
        &self,
        correlation_id: &str,
        filter: Option<Filter<T>>,
    ) -> PersistenceResult<Option<T>> {
        let item = {
            let state = self.state.read().await;
            pick_random(&state.items, filter.as_ref())
        };

        match &item {
            Some(_) => trace!(correlation_id = %correlation_id, "Retrieved a random item"),
            None => trace!(correlation_id = %correlation_id, "Nothing to return as random item"),
        }

        Ok(item)
    }

    /// Counts the records matching `filter`; every record when there is no filter.
    pub async fn get_count_by_filter(
        &self,
        correlation_id: &str,
        filter: Option<Filter<T>>,
    ) -> PersistenceResult<usize> {
        let count = self.state
            .read()
            .await
            .items
            .iter()
            .filter(|item| matches(filter.as_ref(), item))
            .count();

        trace!(correlation_id = %correlation_id, "Counted {} items", count);
        Ok(count)
    }

    /// Appends a record and saves.
    ///
    /// # Returns
    ///
    /// A clone of the stored record, or a [`WriteError`] carrying that clone when
    /// the save failed.
    pub async fn create(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        self.state.write().await.items.push(item.clone());
        trace!(correlation_id = %correlation_id, "Created item");

        self.commit(correlation_id, item).await
    }

    /// Removes every record matching `filter`, keeping the order of the others.
    ///
    /// Nothing is saved when no record matches.
    ///
    /// # Returns
    ///
    /// The number of removed records.
    pub async fn delete_by_filter(&self, correlation_id: &str, filter: Filter<T>) -> PersistenceResult<usize> {
        let deleted = {
            let mut state = self.state.write().await;
            let before = state.items.len();
            state.items.retain(|item| !filter.matches(item));
            before - state.items.len()
        };

        trace!(correlation_id = %correlation_id, "Deleted {} items", deleted);

        if deleted > 0 {
            self.save(correlation_id).await?;
        }

        Ok(deleted)
    }

    /// Saves after a mutation, handing `record` back alongside any save error.
    pub(crate) async fn commit(&self, correlation_id: &str, record: T) -> WriteResult<T> {
        match self.save(correlation_id).await {
            Ok(()) => Ok(record),
            Err(err) => Err(WriteError::unsaved(record, err)),
        }
    }

    /// Clones the records matching `filter` under the read lock.
    async fn snapshot(&self, filter: Option<&Filter<T>>) -> Vec<T> {
        self.state
            .read()
            .await
            .items
            .iter()
            .filter(|item| matches(filter, item))
            .cloned()
            .collect()
    }
}

fn matches<T>(filter: Option<&Filter<T>>, item: &T) -> bool {
    filter.is_none_or(|filter| filter.matches(item))
}

fn pick_random<T: Clone>(items: &[T], filter: Option<&Filter<T>>) -> Option<T> {
    items
        .iter()
        .filter(|item| matches(filter, item))
        .choose(&mut rand::thread_rng())
        .cloned()
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("has_loader", &self.loader.is_some())
            .field("has_saver", &self.saver.is_some())
            .field("max_page_size", &self.max_page_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Record> Openable for MemoryStore<T> {
    async fn is_open(&self) -> bool {
        MemoryStore::is_open(self).await
    }

    async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        MemoryStore::open(self, correlation_id).await
    }

    async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        MemoryStore::close(self, correlation_id).await
    }
}

#[async_trait]
impl<T: Record> Cleanable for MemoryStore<T> {
    async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        MemoryStore::clear(self, correlation_id).await
    }
}


/// Builder for constructing [`MemoryStore`] instances.
pub struct MemoryStoreBuilder<T: Record> {
    loader: Option<Arc<dyn Loader<T>>>,
    saver: Option<Arc<dyn Saver<T>>>,
    max_page_size: usize,
}

impl<T: Record> MemoryStoreBuilder<T> {
    /// Sets the maximum number of records returned by a single page.
    pub fn max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Applies the options of a [`StoreConfig`]. The path is ignored here.
    pub fn config(self, config: &StoreConfig) -> Self {
        self.max_page_size(config.options.max_page_size)
    }

    /// Sets the component the store is filled from on open.
    pub fn loader(mut self, loader: impl Loader<T> + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Sets the component receiving the record set after every mutation.
    pub fn saver(mut self, saver: impl Saver<T> + 'static) -> Self {
        self.saver = Some(Arc::new(saver));
        self
    }

    /// Uses one shared component as both loader and saver.
    pub fn persister<P: Persister<T> + 'static>(mut self, persister: Arc<P>) -> Self {
        self.loader = Some(persister.clone());
        self.saver = Some(persister);
        self
    }

    /// Builds the store.
    pub fn build(self) -> MemoryStore<T> {
        MemoryStore {
            state: Arc::new(RwLock::new(StoreState::default())),
            loader: self.loader,
            saver: self.saver,
            max_page_size: self.max_page_size,
        }
    }
}

impl<T: Record> Default for MemoryStoreBuilder<T> {
    fn default() -> Self {
        Self {
            loader: None,
            saver: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use datalayer_core::error::PersistenceError;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        saves: AtomicUsize,
        last: Mutex<Vec<i32>>,
        failing: AtomicBool,
    }

    #[async_trait]
    impl Saver<i32> for Recorder {
        async fn save(&self, _correlation_id: &str, items: &[i32]) -> PersistenceResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PersistenceError::Backend("disk full".to_string()));
            }

            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = items.to_vec();
            Ok(())
        }
    }

    #[async_trait]
    impl Loader<i32> for Recorder {
        async fn load(&self, _correlation_id: &str) -> PersistenceResult<Option<Vec<i32>>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PersistenceError::Serialization("bad json".to_string()));
            }

            let last = self.last.lock().unwrap().clone();
            Ok((!last.is_empty()).then_some(last))
        }
    }

    fn recorded_store(recorder: &Arc<Recorder>) -> MemoryStore<i32> {
        MemoryStore::builder()
            .persister(recorder.clone())
            .build()
    }

    async fn seeded(values: &[i32]) -> MemoryStore<i32> {
        let store = MemoryStore::new();
        for value in values {
            store.create("test", *value).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn open_and_close_toggle_state() {
        let store = MemoryStore::<i32>::new();
        assert!(!store.is_open().await);

        store.open("test").await.unwrap();
        assert!(store.is_open().await);

        store.close("test").await.unwrap();
        assert!(!store.is_open().await);
    }

    #[tokio::test]
    async fn open_replaces_items_with_loaded_ones() {
        let recorder = Arc::new(Recorder::default());
        *recorder.last.lock().unwrap() = vec![7, 8];

        let store = recorded_store(&recorder);
        store.open("test").await.unwrap();

        let items = store.get_list_by_filter("test", Query::new()).await.unwrap();
        assert_eq!(items, vec![7, 8]);
    }

    #[tokio::test]
    async fn failed_open_keeps_items_and_stays_closed() {
        let recorder = Arc::new(Recorder::default());
        let store = recorded_store(&recorder);
        store.create("test", 1).await.unwrap();

        recorder.failing.store(true, Ordering::SeqCst);
        let err = store.open("test").await.unwrap_err();

        assert!(matches!(err, PersistenceError::Serialization(_)));
        assert!(!store.is_open().await);
        assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn close_reports_save_failure_but_still_closes() {
        let recorder = Arc::new(Recorder::default());
        let store = recorded_store(&recorder);
        store.open("test").await.unwrap();

        recorder.failing.store(true, Ordering::SeqCst);
        assert!(store.close("test").await.is_err());
        assert!(!store.is_open().await);
    }

    #[tokio::test]
    async fn create_saves_and_reports_unsaved_records() {
        let recorder = Arc::new(Recorder::default());
        let store = recorded_store(&recorder);

        assert_eq!(store.create("test", 1).await.unwrap(), 1);
        assert_eq!(recorder.saves.load(Ordering::SeqCst), 1);
        assert_eq!(*recorder.last.lock().unwrap(), vec![1]);

        recorder.failing.store(true, Ordering::SeqCst);
        let err = store.create("test", 2).await.unwrap_err();

        assert_eq!(err.record, Some(2));
        assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_saves_empty_set() {
        let recorder = Arc::new(Recorder::default());
        let store = recorded_store(&recorder);
        store.create("test", 1).await.unwrap();

        store.clear("test").await.unwrap();

        assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 0);
        assert_eq!(recorder.saves.load(Ordering::SeqCst), 2);
        assert!(recorder.last.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_is_filtered_sorted_paged_and_projected() {
        let store = seeded(&[5, 3, 8, 1, 9, 2, 7]).await;

        let query = Query::builder()
            .filter(|value: &i32| *value > 1)
            .sort(|a: &i32, b: &i32| a < b)
            .select(|value: i32| value * 10)
            .build();
        let paging = PagingParams::builder()
            .with_skip(1)
            .with_take(3)
            .with_total(true)
            .build();

        let page = store.get_page_by_filter("test", query, paging).await.unwrap();

        assert_eq!(page.data, vec![30, 50, 70]);
        assert_eq!(page.total, Some(6));
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let store = MemoryStore::builder().max_page_size(2).build();
        for value in 0..5 {
            store.create("test", value).await.unwrap();
        }

        let page = store
            .get_page_by_filter("test", Query::new(), PagingParams::default())
            .await
            .unwrap();

        assert_eq!(page.data, vec![0, 1]);
        assert_eq!(page.total, None);
    }

    #[tokio::test]
    async fn skip_past_end_yields_empty_page() {
        let store = seeded(&[1, 2, 3]).await;
        let paging = PagingParams::new(Some(10), None, true);

        let page = store.get_page_by_filter("test", Query::new(), paging).await.unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total, Some(3));
    }

    #[tokio::test]
    async fn list_without_matches_is_empty() {
        let store = seeded(&[1, 2, 3]).await;
        let query = Query::filtered(Filter::new(|value: &i32| *value > 10));

        assert!(store.get_list_by_filter("test", query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn random_item_respects_filter() {
        let store = seeded(&[1, 2, 3, 4]).await;

        for _ in 0..20 {
            let item = store
                .get_one_random("test", Some(Filter::new(|value: &i32| value % 2 == 0)))
                .await
                .unwrap();
            assert!(matches!(item, Some(2) | Some(4)));
        }

        let none = store
            .get_one_random("test", Some(Filter::new(|value: &i32| *value > 4)))
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn count_without_filter_counts_everything() {
        let store = seeded(&[1, 2, 3, 4]).await;

        assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 4);
        assert_eq!(
            store.get_count_by_filter("test", Some(Filter::new(|value: &i32| *value > 2))).await.unwrap(),
            2,
        );
    }

    #[tokio::test]
    async fn delete_by_filter_keeps_order_and_skips_empty_saves() {
        let recorder = Arc::new(Recorder::default());
        let store = recorded_store(&recorder);
        for value in [1, 2, 3, 4, 5] {
            store.create("test", value).await.unwrap();
        }

        let deleted = store.delete_by_filter("test", Filter::new(|value: &i32| value % 2 == 0)).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(*recorder.last.lock().unwrap(), vec![1, 3, 5]);

        let saves = recorder.saves.load(Ordering::SeqCst);
        let deleted = store.delete_by_filter("test", Filter::new(|value: &i32| *value > 10)).await.unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(recorder.saves.load(Ordering::SeqCst), saves);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        other.create("test", 42).await.unwrap();

        assert_eq!(store.get_count_by_filter("test", None).await.unwrap(), 1);
    }
}
