//! Store configuration.
//!
//! Configuration can be built in code or deserialized from JSON:
//!
//! ```json
//! {
//!     "path": "./data/notes.json",
//!     "options": { "max_page_size": 50 }
//! }
//! ```
//!
//! Every field is optional. `path` is only meaningful for file-backed stores.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceResult;

/// Default maximum number of records returned in a single page.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Main configuration for a store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file mirroring the store.
    pub path: Option<String>,
    /// Tuning options.
    pub options: StoreOptions,
}

/// Tuning options shared by every store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StoreOptions {
    /// Maximum number of records returned in a single page.
    pub max_page_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { max_page_size: DEFAULT_MAX_PAGE_SIZE }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is malformed or has fields of the wrong type.
    pub fn from_json(json: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`StoreConfig`]
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the path of the backing JSON file
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Set the maximum page size
    pub fn max_page_size(mut self, max_page_size: usize) -> Self {
        self.config.options.max_page_size = max_page_size;
        self
    }

    /// Build the config
    pub fn build(self) -> StoreConfig {
        self.config
    }
}
