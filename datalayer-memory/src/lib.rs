//! In-memory record stores for datalayer.
//!
//! This crate provides thread-safe, in-memory stores built on async-aware read-write
//! locks. They are ideal for tests and small deployments, and can mirror their
//! contents to external storage through the `Loader`/`Saver` traits.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an async-aware RwLock
//! - **Query pipeline** - Filtering, stable sorting, paging and projection
//! - **Id-based CRUD** - Create, upsert, update, partial update and delete by id
//! - **Optional persistence** - Load on open and save after every mutation
//!
//! # Quick Start
//!
//! ```ignore
//! use datalayer::{memory::IdentifiableMemoryStore, record::Identifiable};
//!
//! #[derive(Debug, Clone, Default, Identifiable)]
//! pub struct User {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = IdentifiableMemoryStore::<User>::new();
//!     store.open("startup").await?;
//!
//!     let user = store
//!         .create("signup", User { name: "Alice".to_string(), ..Default::default() })
//!         .await?;
//!
//!     assert!(store.get_one_by_id("lookup", &user.id).await?.is_some());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as datalayer_memory;

pub mod identifiable;
pub mod store;

pub use identifiable::IdentifiableMemoryStore;
pub use store::{MemoryStore, MemoryStoreBuilder};
