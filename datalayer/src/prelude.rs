//! Convenient re-exports of commonly used types from datalayer.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use datalayer::prelude::*;
//! ```
//!
//! This provides access to:
//! - Record traits and their derive macros
//! - Store capability traits and loader/saver traits
//! - Query, paging and patch types
//! - Configuration and error types

pub use datalayer_core::{
    backend::{Loader, Persister, Saver},
    config::{StoreConfig, StoreOptions},
    error::{OptionalWriteResult, PersistenceError, PersistenceResult, WriteError, WriteResult},
    map::DataMap,
    page::{DataPage, PagingParams},
    patch::{PartialUpdate, Patch},
    query::{Comparator, FilterParams, Filter, Projection, Query, QueryBuilder},
    record::{GeneratedId, IdGenerator, Identifiable, RandomIdGenerator, Record, SequenceIdGenerator},
    store::{Cleanable, Getter, Openable, PartialUpdater, Setter, Writer},
};
pub use datalayer_macros::{Identifiable, PartialUpdate};
