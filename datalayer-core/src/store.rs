//! Capability traits implemented by stores.
//!
//! Services usually depend on a capability rather than a concrete store so that an
//! in-memory store used in tests can be swapped for a file-backed one in
//! production:
//!
//! - [`Openable`] - Open/close lifecycle
//! - [`Cleanable`] - Drop every record
//! - [`Getter`] - Read a record by id
//! - [`Setter`] - Insert-or-replace a record
//! - [`Writer`] - Create, update and delete records by id
//! - [`PartialUpdater`] - Change a few fields of a record by id
//!
//! # Example
//!
//! ```ignore
//! use datalayer::store::{Getter, Writer};
//!
//! async fn rename<S>(store: &S, id: String) -> PersistenceResult<()>
//! where
//!     S: Getter<Note> + Writer<Note>,
//! {
//!     if let Some(note) = store.get_one_by_id("rename", &id).await? {
//!         store.update("rename", Note { title: "Renamed".into(), ..note }).await?;
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use crate::{
    error::{OptionalWriteResult, PersistenceResult, WriteResult},
    patch::Patch,
    record::Identifiable,
};

/// Components with an open/close lifecycle.
#[async_trait]
pub trait Openable: Send + Sync {
    /// Returns `true` once [`Openable::open`] has succeeded and until [`Openable::close`].
    async fn is_open(&self) -> bool;

    /// Opens the component, loading any persisted state.
    async fn open(&self, correlation_id: &str) -> PersistenceResult<()>;

    /// Closes the component, persisting its state.
    async fn close(&self, correlation_id: &str) -> PersistenceResult<()>;
}

/// Components whose state can be wiped.
#[async_trait]
pub trait Cleanable: Send + Sync {
    /// Removes every record.
    async fn clear(&self, correlation_id: &str) -> PersistenceResult<()>;
}

/// Reads records by id.
#[async_trait]
pub trait Getter<T: Identifiable>: Send + Sync {
    /// Returns the record with the given id, or `None` when there is none.
    async fn get_one_by_id(&self, correlation_id: &str, id: &T::Id) -> PersistenceResult<Option<T>>;
}

/// Inserts or replaces records.
#[async_trait]
pub trait Setter<T: Identifiable>: Send + Sync {
    /// Replaces the record with the same id, or inserts it when no such record exists.
    /// A record without an id gets a generated one.
    async fn set(&self, correlation_id: &str, item: T) -> WriteResult<T>;
}

/// Creates, updates and deletes records by id.
#[async_trait]
pub trait Writer<T: Identifiable>: Send + Sync {
    /// Inserts a record, generating its id when unset.
    async fn create(&self, correlation_id: &str, item: T) -> WriteResult<T>;

    /// Replaces an existing record. Returns `Ok(None)` without inserting when the id is unknown.
    async fn update(&self, correlation_id: &str, item: T) -> OptionalWriteResult<T>;

    /// Removes a record. Returns `Ok(None)` when the id is unknown.
    async fn delete_by_id(&self, correlation_id: &str, id: &T::Id) -> OptionalWriteResult<T>;
}

/// Updates selected fields of a record.
#[async_trait]
pub trait PartialUpdater<T: Identifiable>: Send + Sync {
    /// Applies `patch` to the record with the given id. Returns `Ok(None)` when the id is unknown.
    async fn update_partially(
        &self,
        correlation_id: &str,
        id: &T::Id,
        patch: Patch,
    ) -> OptionalWriteResult<T>;
}
