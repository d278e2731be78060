//! Loader and saver abstraction for mirroring a store to external storage.
//!
//! An in-memory store is always the leader. When it is given a [`Loader`] it fills
//! itself from it on open, and when it is given a [`Saver`] it hands over its
//! entire record set after every mutation. Both operations are bulk: the whole
//! set travels every time, never a delta.
//!
//! # Traits
//!
//! - [`Loader`]: Reads every stored record
//! - [`Saver`]: Overwrites external storage with the given records
//! - [`Persister`]: Anything that is both
//!
//! # Examples
//!
//! ```ignore
//! use datalayer::backend::{Loader, Saver};
//!
//! struct Fixed(Vec<Note>);
//!
//! #[async_trait::async_trait]
//! impl Loader<Note> for Fixed {
//!     async fn load(&self, _correlation_id: &str) -> PersistenceResult<Option<Vec<Note>>> {
//!         Ok(Some(self.0.clone()))
//!     }
//! }
//! ```

use std::sync::Arc;
use async_trait::async_trait;

use crate::error::PersistenceResult;

/// Reads the complete record set from external storage.
///
/// # Thread Safety
///
/// Implementations are shared between clones of a store and must support
/// concurrent use from multiple async tasks.
#[async_trait]
pub trait Loader<T>: Send + Sync {
    /// Loads every stored record.
    ///
    /// # Arguments
    ///
    /// * `correlation_id` - Id used to trace the call through the call chain
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing has been stored yet, in which case the store keeps its
    /// current contents. `Ok(Some(records))` replaces the store's contents.
    async fn load(&self, correlation_id: &str) -> PersistenceResult<Option<Vec<T>>>;
}

/// Writes the complete record set to external storage.
#[async_trait]
pub trait Saver<T>: Send + Sync {
    /// Replaces the stored record set with `items`.
    ///
    /// # Arguments
    ///
    /// * `correlation_id` - Id used to trace the call through the call chain
    /// * `items` - Every record currently held by the store, in storage order
    async fn save(&self, correlation_id: &str, items: &[T]) -> PersistenceResult<()>;
}

/// A component that both loads and saves, such as a JSON file persister.
pub trait Persister<T>: Loader<T> + Saver<T> {}

impl<T, P: Loader<T> + Saver<T>> Persister<T> for P {}

#[async_trait]
impl<T, L> Loader<T> for Arc<L>
where
    L: Loader<T> + ?Sized,
{
    async fn load(&self, correlation_id: &str) -> PersistenceResult<Option<Vec<T>>> {
        (**self)
            .load(correlation_id)
            .await
    }
}

#[async_trait]
impl<T, S> Saver<T> for Arc<S>
where
    T: Sync,
    S: Saver<T> + ?Sized,
{
    async fn save(&self, correlation_id: &str, items: &[T]) -> PersistenceResult<()> {
        (**self)
            .save(correlation_id, items)
            .await
    }
}
