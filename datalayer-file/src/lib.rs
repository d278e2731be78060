//! JSON file persistence for datalayer stores.
//!
//! This crate mirrors the in-memory stores of `datalayer-memory` to a single JSON
//! file holding an array of every record. The file is read when a store opens and
//! rewritten in full after every mutation.
//!
//! To use this backend, keep the default `file` feature enabled in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! datalayer = { version = "x.y.z", features = ["file"] }
//! ```
//!
//! # Features
//!
//! - **Plain JSON** - Records are written with their serde representation
//! - **Replace-by-rename saves** - A crash mid-save never leaves a truncated file behind
//! - **Lazy creation** - A missing file means an empty store; parent directories are created on save
//!
//! # Example
//!
//! ```ignore
//! use datalayer::{file::IdentifiableFileStore, config::StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::from_json(r#"{ "path": "./data/users.json" }"#)?;
//!     let store = IdentifiableFileStore::<User>::from_config(&config);
//!
//!     store.open("startup").await?;
//!     store.create("signup", User::new("Alice")).await?;
//!     store.close("shutdown").await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as datalayer_file;

pub mod persister;
pub mod store;

pub use persister::JsonFilePersister;
pub use store::{FileStore, IdentifiableFileStore};
