//! A thin in-memory persistence layer for typed records, optionally mirrored to external storage.
//!
//! This crate is the core of the datalayer project and provides:
//!
//! - **Record traits** ([`record`]) - Capabilities a record type must offer, and id generation
//! - **Map records** ([`map`]) - A ready-made map-like record type
//! - **Partial updates** ([`patch`]) - Field-by-name assignment without reflection
//! - **Loader/saver abstraction** ([`backend`]) - Traits for mirroring a store to external storage
//! - **Store capabilities** ([`store`]) - Traits for getters, setters, writers and lifecycle
//! - **Query API** ([`query`]) - Filter, sort and projection closures
//! - **Sorting** ([`sort`]) - Stable sorting helper used by the query pipeline
//! - **Paging** ([`page`]) - Page and paging parameter types
//! - **Configuration** ([`config`]) - Store configuration with serde support
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use datalayer::record::Identifiable;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! impl Identifiable for User {
//!     type Id = String;
//!
//!     fn id(&self) -> &String { &self.id }
//!     fn is_zero_id(&self) -> bool { self.id.is_empty() }
//!     fn with_id(mut self, id: String) -> Self {
//!         self.id = id;
//!         self
//!     }
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as datalayer_core;

pub mod backend;
pub mod config;
pub mod error;
pub mod map;
pub mod page;
pub mod patch;
pub mod query;
pub mod record;
pub mod sort;
pub mod store;

pub use uuid::Uuid;
