//! In-memory store for records with ids.
//!
//! [`IdentifiableMemoryStore`] layers id-based reads and writes on top of a
//! [`MemoryStore`]. Each id-targeted mutation looks the record up and changes it
//! inside a single write-lock critical section, so a concurrent writer cannot slip
//! in between the lookup and the write.

use std::{fmt, sync::Arc};
use async_trait::async_trait;
use tracing::trace;

use datalayer_core::{
    error::{OptionalWriteResult, PersistenceResult, WriteError, WriteResult},
    page::{DataPage, PagingParams},
    patch::{PartialUpdate, Patch},
    query::{Filter, Query},
    record::{GeneratedId, IdGenerator, Identifiable, RandomIdGenerator},
    store::{Cleanable, Getter, Openable, PartialUpdater, Setter, Writer},
};

use crate::store::MemoryStore;

/// Thread-safe in-memory store for [`Identifiable`] records.
///
/// Records created or set without an id get one from the store's [`IdGenerator`].
/// When several records share an id, id-targeted operations see the first one in
/// storage order.
///
/// # Example
///
/// ```ignore
/// use datalayer_memory::IdentifiableMemoryStore;
///
/// let store = IdentifiableMemoryStore::<Note>::new();
/// store.open("main").await?;
///
/// let note = store.create("main", Note { body: "hello".into(), ..Default::default() }).await?;
/// assert!(!note.id.is_empty());
///
/// let found = store.get_one_by_id("main", &note.id).await?;
/// assert_eq!(found.map(|n| n.body), Some("hello".to_string()));
/// ```
#[derive(Clone)]
pub struct IdentifiableMemoryStore<T: Identifiable> {
    base: MemoryStore<T>,
    id_generator: Arc<dyn IdGenerator<T::Id>>,
}

impl<T> IdentifiableMemoryStore<T>
where
    T: Identifiable,
    T::Id: GeneratedId,
{
    /// Creates a new empty store generating time-ordered random ids.
    pub fn new() -> Self {
        Self::from_store(MemoryStore::new())
    }

    /// Wraps an existing store, generating time-ordered random ids.
    pub fn from_store(base: MemoryStore<T>) -> Self {
        Self::from_parts(base, Arc::new(RandomIdGenerator))
    }
}

impl<T> Default for IdentifiableMemoryStore<T>
where
    T: Identifiable,
    T::Id: GeneratedId,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identifiable> IdentifiableMemoryStore<T> {
    /// Wraps an existing store with the given id generator.
    pub fn from_parts(base: MemoryStore<T>, id_generator: Arc<dyn IdGenerator<T::Id>>) -> Self {
        Self { base, id_generator }
    }

    /// Replaces the id generator.
    pub fn with_id_generator(mut self, id_generator: impl IdGenerator<T::Id> + 'static) -> Self {
        self.id_generator = Arc::new(id_generator);
        self
    }

    /// The underlying store without id awareness.
    pub fn base(&self) -> &MemoryStore<T> {
        &self.base
    }

    pub fn max_page_size(&self) -> usize {
        self.base.max_page_size()
    }

    pub async fn is_open(&self) -> bool {
        self.base.is_open().await
    }

    pub async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.open(correlation_id).await
    }

    pub async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.close(correlation_id).await
    }

    pub async fn save(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.save(correlation_id).await
    }

    pub async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.clear(correlation_id).await
    }

    pub async fn get_page_by_filter(
        &self,
        correlation_id: &str,
        query: Query<T>,
        paging: PagingParams,
    ) -> PersistenceResult<DataPage<T>> {
        self.base
            .get_page_by_filter(correlation_id, query, paging)
            .await
    }

    pub async fn get_list_by_filter(&self, correlation_id: &str, query: Query<T>) -> PersistenceResult<Vec<T>> {
        self.base
            .get_list_by_filter(correlation_id, query)
            .await
    }

    pub async fn get_one_random(
        &self,
        correlation_id: &str,
        filter: Option<Filter<T>>,
    ) -> PersistenceResult<Option<T>> {
        self.base
            .get_one_random(correlation_id, filter)
            .await
    }

    pub async fn get_count_by_filter(
        &self,
        correlation_id: &str,
        filter: Option<Filter<T>>,
    ) -> PersistenceResult<usize> {
        self.base
            .get_count_by_filter(correlation_id, filter)
            .await
    }

    pub async fn delete_by_filter(&self, correlation_id: &str, filter: Filter<T>) -> PersistenceResult<usize> {
        self.base
            .delete_by_filter(correlation_id, filter)
            .await
    }

    /// Returns the storage position of the first record with the given id.
    pub async fn get_index_by_id(&self, id: &T::Id) -> Option<usize> {
        self.base.state
            .read()
            .await
            .items
            .iter()
            .position(|item| item.is_equal_id(id))
    }

    /// Returns a clone of the record with the given id, or `None` when there is none.
    pub async fn get_one_by_id(&self, correlation_id: &str, id: &T::Id) -> PersistenceResult<Option<T>> {
        let item = self.base.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.is_equal_id(id))
            .cloned();

        match &item {
            Some(_) => trace!(correlation_id = %correlation_id, "Retrieved item {:?}", id),
            None => trace!(correlation_id = %correlation_id, "Item {:?} was not found", id),
        }

        Ok(item)
    }

    /// Returns clones of every record whose id is in `ids`, in storage order.
    ///
    /// Unknown ids are skipped.
    pub async fn get_list_by_ids(&self, correlation_id: &str, ids: &[T::Id]) -> PersistenceResult<Vec<T>> {
        self.base
            .get_list_by_filter(correlation_id, Query::filtered(id_filter(ids)))
            .await
    }

    /// Appends a record, generating its id when unset, and saves.
    ///
    /// # Returns
    ///
    /// A clone of the stored record, including the generated id.
    pub async fn create(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        let item = self.ensure_id(item);

        self.base.state.write().await.items.push(item.clone());
        trace!(correlation_id = %correlation_id, "Created item {:?}", item.id());

        self.base.commit(correlation_id, item).await
    }

    /// Replaces the record with the same id, or appends it when the id is unknown,
    /// then saves. A record without an id gets a generated one.
    pub async fn set(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        let item = self.ensure_id(item);

        {
            let mut state = self.base.state.write().await;

            match state.items.iter().position(|stored| stored.is_equal_id(item.id())) {
                Some(index) => state.items[index] = item.clone(),
                None => state.items.push(item.clone()),
            }
        }

        trace!(correlation_id = %correlation_id, "Set item {:?}", item.id());
        self.base.commit(correlation_id, item).await
    }

    /// Replaces the record with the same id, then saves.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the id is unknown. Nothing is inserted or saved in that case.
    pub async fn update(&self, correlation_id: &str, item: T) -> OptionalWriteResult<T> {
        let updated = {
            let mut state = self.base.state.write().await;

            match state.items.iter().position(|stored| stored.is_equal_id(item.id())) {
                Some(index) => {
                    state.items[index] = item.clone();
                    true
                }
                None => false,
            }
        };

        if !updated {
            trace!(correlation_id = %correlation_id, "Item {:?} was not found", item.id());
            return Ok(None);
        }

        trace!(correlation_id = %correlation_id, "Updated item {:?}", item.id());
        self.base
            .commit(correlation_id, item)
            .await
            .map(Some)
    }

    /// Removes the record with the given id, keeping the order of the others, then saves.
    ///
    /// # Returns
    ///
    /// The removed record, or `Ok(None)` without saving when the id is unknown.
    pub async fn delete_by_id(&self, correlation_id: &str, id: &T::Id) -> OptionalWriteResult<T> {
        let removed = {
            let mut state = self.base.state.write().await;
            let index = state.items.iter().position(|item| item.is_equal_id(id));

            index.map(|index| state.items.remove(index))
        };

        let Some(item) = removed else {
            trace!(correlation_id = %correlation_id, "Item {:?} was not found", id);
            return Ok(None);
        };

        trace!(correlation_id = %correlation_id, "Deleted item by {:?}", id);
        self.base
            .commit(correlation_id, item)
            .await
            .map(Some)
    }

    /// Removes every record whose id is in `ids`.
    ///
    /// # Returns
    ///
    /// The number of removed records.
    pub async fn delete_by_ids(&self, correlation_id: &str, ids: &[T::Id]) -> PersistenceResult<usize> {
        self.base
            .delete_by_filter(correlation_id, id_filter(ids))
            .await
    }

    fn ensure_id(&self, item: T) -> T {
        if item.is_zero_id() {
            let id = self.id_generator.next_id();
            item.with_id(id)
        } else {
            item
        }
    }
}

impl<T> IdentifiableMemoryStore<T>
where
    T: Identifiable + PartialUpdate,
{
    /// Assigns the fields named by `patch` on the record with the given id, then saves.
    ///
    /// Fields the patch does not name keep their values.
    ///
    /// # Returns
    ///
    /// The updated record, or `Ok(None)` without saving when the id is unknown.
    ///
    /// # Errors
    ///
    /// A patch value that does not fit its field rejects the whole update with
    /// [`PersistenceError::InvalidPatch`](datalayer_core::error::PersistenceError::InvalidPatch);
    /// the stored record is left unchanged.
    pub async fn update_partially(&self, correlation_id: &str, id: &T::Id, patch: Patch) -> OptionalWriteResult<T> {
        let updated = {
            let mut state = self.base.state.write().await;

            match state.items.iter().position(|item| item.is_equal_id(id)) {
                Some(index) => {
                    let mut item = state.items[index].clone();
                    item.apply_patch(&patch)
                        .map_err(WriteError::rejected)?;

                    state.items[index] = item.clone();
                    Some(item)
                }
                None => None,
            }
        };

        let Some(item) = updated else {
            trace!(correlation_id = %correlation_id, "Item {:?} was not found", id);
            return Ok(None);
        };

        trace!(correlation_id = %correlation_id, "Partially updated item {:?}", id);
        self.base
            .commit(correlation_id, item)
            .await
            .map(Some)
    }
}

fn id_filter<T: Identifiable>(ids: &[T::Id]) -> Filter<T> {
    let ids = ids.to_vec();
    Filter::new(move |item: &T| ids.iter().any(|id| item.is_equal_id(id)))
}

impl<T: Identifiable> fmt::Debug for IdentifiableMemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifiableMemoryStore")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Identifiable> Openable for IdentifiableMemoryStore<T> {
    async fn is_open(&self) -> bool {
        self.base.is_open().await
    }

    async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.open(correlation_id).await
    }

    async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.close(correlation_id).await
    }
}

#[async_trait]
impl<T: Identifiable> Cleanable for IdentifiableMemoryStore<T> {
    async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.base.clear(correlation_id).await
    }
}

#[async_trait]
impl<T: Identifiable> Getter<T> for IdentifiableMemoryStore<T> {
    async fn get_one_by_id(&self, correlation_id: &str, id: &T::Id) -> PersistenceResult<Option<T>> {
        IdentifiableMemoryStore::get_one_by_id(self, correlation_id, id).await
    }
}

#[async_trait]
impl<T: Identifiable> Setter<T> for IdentifiableMemoryStore<T> {
    async fn set(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        IdentifiableMemoryStore::set(self, correlation_id, item).await
    }
}

#[async_trait]
impl<T: Identifiable> Writer<T> for IdentifiableMemoryStore<T> {
    async fn create(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        IdentifiableMemoryStore::create(self, correlation_id, item).await
    }

    async fn update(&self, correlation_id: &str, item: T) -> OptionalWriteResult<T> {
        IdentifiableMemoryStore::update(self, correlation_id, item).await
    }

    async fn delete_by_id(&self, correlation_id: &str, id: &T::Id) -> OptionalWriteResult<T> {
        IdentifiableMemoryStore::delete_by_id(self, correlation_id, id).await
    }
}

#[async_trait]
impl<T: Identifiable + PartialUpdate> PartialUpdater<T> for IdentifiableMemoryStore<T> {
    async fn update_partially(&self, correlation_id: &str, id: &T::Id, patch: Patch) -> OptionalWriteResult<T> {
        IdentifiableMemoryStore::update_partially(self, correlation_id, id, patch).await
    }
}
