//! Main datalayer crate providing a unified interface for in-memory record persistence.
//!
//! This crate is the primary entry point for users of the datalayer project.
//! It re-exports the core types and traits from the sub-crates and gives access to
//! the different stores.
//!
//! # Features
//!
//! - **Typed records** - Any `Clone + Send + Sync` type can be stored; id-aware stores need [`record::Identifiable`]
//! - **Query pipeline** - Closure-based filtering, stable sorting, paging and projection
//! - **Id-based CRUD** - Create, upsert, update, partial update and delete by id
//! - **File mirroring** - Optional JSON file persistence (`file` feature, enabled by default)
//!
//! # Quick Start
//!
//! ```ignore
//! use datalayer::{prelude::*, memory::IdentifiableMemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize, Identifiable, PartialUpdate)]
//! pub struct User {
//!     #[patch(skip)]
//!     pub id: String,
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = IdentifiableMemoryStore::<User>::new();
//!     store.open("startup").await?;
//!
//!     // Ids are generated for records created without one
//!     let user = store
//!         .create("signup", User { name: "Alice".to_string(), age: 30, ..Default::default() })
//!         .await?;
//!
//!     // Change a single field
//!     store
//!         .update_partially("birthday", &user.id, Patch::new().with("age", 31))
//!         .await?;
//!
//!     // Query with closures
//!     let adults = store
//!         .get_page_by_filter(
//!             "report",
//!             Query::builder()
//!                 .filter(|user: &User| user.age >= 18)
//!                 .sort(|a: &User, b: &User| a.name < b.name)
//!                 .build(),
//!             PagingParams::builder().with_take(10).with_total(true).build(),
//!         )
//!         .await?;
//!
//!     println!("Found {:?} adults", adults.total);
//!
//!     store.close("shutdown").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Persisting to a file
//!
//! File-backed stores load their records when opened and rewrite the file after
//! every mutation. They dereference to the in-memory stores, so the API is the same.
//!
//! ```ignore
//! use datalayer::{prelude::*, file::IdentifiableFileStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::from_json(r#"{ "path": "./data/users.json", "options": { "max_page_size": 50 } }"#)?;
//!     let store = IdentifiableFileStore::<User>::from_config(&config);
//!
//!     store.open("startup").await?;
//!     store.set("import", User { id: "alice".to_string(), name: "Alice".to_string(), age: 30 }).await?;
//!     store.close("shutdown").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom persistence
//!
//! Any component implementing [`backend::Loader`] and [`backend::Saver`] can back a
//! store, through [`memory::MemoryStoreBuilder`].
//!
//! # Stores
//!
//! - [`memory`] - In-memory stores
//! - [`file`] - JSON file-backed stores (requires the `file` feature)

#[allow(unused_extern_crates)]
extern crate self as datalayer;

pub mod prelude;

pub use datalayer_core::{backend, config, error, map, page, patch, query, record, sort, store, Uuid};
pub use datalayer_macros::{Identifiable, PartialUpdate};

// Re-exported for the code generated by the derive macros and for custom loaders/savers
pub use async_trait;
pub use serde_json;

/// In-memory store implementations.
pub mod memory {
    pub use datalayer_memory::{IdentifiableMemoryStore, MemoryStore, MemoryStoreBuilder};
}

/// JSON file-backed store implementations.
///
/// This module is only available when the `file` feature is enabled.
#[cfg(feature = "file")]
pub mod file {
    pub use datalayer_file::{FileStore, IdentifiableFileStore, JsonFilePersister};
}
