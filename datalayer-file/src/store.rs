//! Stores mirrored to a JSON file.
//!
//! [`FileStore`] and [`IdentifiableFileStore`] are the in-memory stores wired to a
//! single shared [`JsonFilePersister`], used as both loader and saver. They
//! dereference to the wrapped store, so every query and mutation is available
//! directly on them.

use std::{fmt, ops::Deref, path::PathBuf, sync::Arc};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use datalayer_core::{
    config::StoreConfig,
    error::{OptionalWriteResult, PersistenceResult, WriteResult},
    patch::{PartialUpdate, Patch},
    record::{GeneratedId, IdGenerator, Identifiable, RandomIdGenerator, Record},
    store::{Cleanable, Getter, Openable, PartialUpdater, Setter, Writer},
};
use datalayer_memory::{IdentifiableMemoryStore, MemoryStore};

use crate::persister::JsonFilePersister;

fn build_memory_store<T>(
    persister: &Arc<JsonFilePersister<T>>,
    config: &StoreConfig,
) -> MemoryStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    MemoryStore::builder()
        .config(config)
        .persister(persister.clone())
        .build()
}


/// An in-memory store persisted to a JSON file.
///
/// Records are loaded from the file on [`open`](MemoryStore::open) and the whole
/// file is rewritten after every mutation.
///
/// # Example
///
/// ```ignore
/// use datalayer::file::FileStore;
///
/// let store = FileStore::<Note>::new("./data/notes.json");
/// store.open("startup").await?;
///
/// store.create("import", note).await?;
/// store.close("shutdown").await?;
/// ```
#[derive(Clone)]
pub struct FileStore<T: Record> {
    inner: MemoryStore<T>,
    persister: Arc<JsonFilePersister<T>>,
}

impl<T> FileStore<T>
where
    T: Record + Serialize + DeserializeOwned,
{
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::assemble(JsonFilePersister::new(path), &StoreConfig::default())
    }

    /// Creates a store from a [`StoreConfig`].
    ///
    /// A config without a path yields a store whose open and saves fail with a
    /// configuration error.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::assemble(JsonFilePersister::from_config(config), config)
    }

    fn assemble(persister: JsonFilePersister<T>, config: &StoreConfig) -> Self {
        let persister = Arc::new(persister);

        Self {
            inner: build_memory_store(&persister, config),
            persister,
        }
    }

    /// The persister shared by the store as loader and saver.
    pub fn persister(&self) -> &JsonFilePersister<T> {
        &self.persister
    }
}

impl<T: Record> Deref for FileStore<T> {
    type Target = MemoryStore<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Record> fmt::Debug for FileStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.persister.path())
            .field("inner", &self.inner)
            .finish()
    }
}

#[async_trait]
impl<T: Record> Openable for FileStore<T> {
    async fn is_open(&self) -> bool {
        self.inner.is_open().await
    }

    async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.open(correlation_id).await
    }

    async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.close(correlation_id).await
    }
}

#[async_trait]
impl<T: Record> Cleanable for FileStore<T> {
    async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.clear(correlation_id).await
    }
}


/// An id-aware in-memory store persisted to a JSON file.
///
/// # Example
///
/// ```ignore
/// use datalayer::file::IdentifiableFileStore;
///
/// let store = IdentifiableFileStore::<Note>::new("./data/notes.json");
/// store.open("startup").await?;
///
/// let note = store.create("import", note).await?;
/// store.update_partially("edit", &note.id, Patch::new().with("title", "Renamed")).await?;
/// ```
#[derive(Clone)]
pub struct IdentifiableFileStore<T: Identifiable> {
    inner: IdentifiableMemoryStore<T>,
    persister: Arc<JsonFilePersister<T>>,
}

impl<T> IdentifiableFileStore<T>
where
    T: Identifiable + Serialize + DeserializeOwned,
    T::Id: GeneratedId,
{
    /// Creates a store backed by the file at `path`, generating time-ordered random ids.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let persister = Arc::new(JsonFilePersister::new(path));
        let base = build_memory_store(&persister, &StoreConfig::default());

        Self {
            inner: IdentifiableMemoryStore::from_store(base),
            persister,
        }
    }

    /// Creates a store from a [`StoreConfig`], generating time-ordered random ids.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::from_config_with_id_generator(config, RandomIdGenerator)
    }
}

impl<T> IdentifiableFileStore<T>
where
    T: Identifiable + Serialize + DeserializeOwned,
{
    /// Creates a store from a [`StoreConfig`] with a custom id generator.
    pub fn from_config_with_id_generator(config: &StoreConfig, id_generator: impl IdGenerator<T::Id> + 'static) -> Self {
        let persister = Arc::new(JsonFilePersister::from_config(config));
        let base = build_memory_store(&persister, config);

        Self {
            inner: IdentifiableMemoryStore::from_parts(base, Arc::new(id_generator)),
            persister,
        }
    }

    /// The persister shared by the store as loader and saver.
    pub fn persister(&self) -> &JsonFilePersister<T> {
        &self.persister
    }
}

impl<T: Identifiable> Deref for IdentifiableFileStore<T> {
    type Target = IdentifiableMemoryStore<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Identifiable> fmt::Debug for IdentifiableFileStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifiableFileStore")
            .field("path", &self.persister.path())
            .field("inner", &self.inner)
            .finish()
    }
}

#[async_trait]
impl<T: Identifiable> Openable for IdentifiableFileStore<T> {
    async fn is_open(&self) -> bool {
        self.inner.is_open().await
    }

    async fn open(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.open(correlation_id).await
    }

    async fn close(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.close(correlation_id).await
    }
}

#[async_trait]
impl<T: Identifiable> Cleanable for IdentifiableFileStore<T> {
    async fn clear(&self, correlation_id: &str) -> PersistenceResult<()> {
        self.inner.clear(correlation_id).await
    }
}

#[async_trait]
impl<T: Identifiable> Getter<T> for IdentifiableFileStore<T> {
    async fn get_one_by_id(&self, correlation_id: &str, id: &T::Id) -> PersistenceResult<Option<T>> {
        self.inner.get_one_by_id(correlation_id, id).await
    }
}

#[async_trait]
impl<T: Identifiable> Setter<T> for IdentifiableFileStore<T> {
    async fn set(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        self.inner.set(correlation_id, item).await
    }
}

#[async_trait]
impl<T: Identifiable> Writer<T> for IdentifiableFileStore<T> {
    async fn create(&self, correlation_id: &str, item: T) -> WriteResult<T> {
        self.inner.create(correlation_id, item).await
    }

    async fn update(&self, correlation_id: &str, item: T) -> OptionalWriteResult<T> {
        self.inner.update(correlation_id, item).await
    }

    async fn delete_by_id(&self, correlation_id: &str, id: &T::Id) -> OptionalWriteResult<T> {
        self.inner.delete_by_id(correlation_id, id).await
    }
}

#[async_trait]
impl<T: Identifiable + PartialUpdate> PartialUpdater<T> for IdentifiableFileStore<T> {
    async fn update_partially(&self, correlation_id: &str, id: &T::Id, patch: Patch) -> OptionalWriteResult<T> {
        self.inner.update_partially(correlation_id, id, patch).await
    }
}
