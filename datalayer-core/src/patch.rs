//! Partial updates: change a few named fields of a stored record.
//!
//! A [`Patch`] is a map from field name to JSON value. Record types opt into
//! partial updates by implementing [`PartialUpdate`], usually through
//! `#[derive(PartialUpdate)]`, which matches field names case-insensitively and
//! converts each value into the field's type with serde.
//!
//! # Example
//!
//! ```ignore
//! use datalayer::patch::Patch;
//!
//! let patch = Patch::new()
//!     .with("content", "Updated content")
//!     .with("views", 10);
//!
//! store.update_partially("corr-1", &id, patch).await?;
//! ```

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, from_value};

use crate::error::{PersistenceError, PersistenceResult};

/// A set of field assignments to apply to a record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Patch(Map<String, Value>);

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds a field assignment, replacing an earlier one for the same name.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Adds a field assignment for any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn try_with<V: Serialize>(mut self, field: impl Into<String>, value: &V) -> PersistenceResult<Self> {
        self.0.insert(field.into(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Looks up a field assignment, ignoring case.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Patch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        )
    }
}

/// Records whose fields can be assigned by name.
pub trait PartialUpdate {
    /// Assigns a single field.
    ///
    /// Returns `Ok(false)` when the record has no field with that name; the record
    /// is left unchanged in that case.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidPatch`] if the value cannot be converted
    /// to the field's type.
    fn set_field(&mut self, name: &str, value: Value) -> PersistenceResult<bool>;

    /// Applies every assignment of the patch. Fields not named by the patch are untouched.
    fn apply_patch(&mut self, patch: &Patch) -> PersistenceResult<()> {
        for (name, value) in patch.iter() {
            self.set_field(name, value.clone())?;
        }

        Ok(())
    }
}

/// Converts a patch value into the type of the field it targets.
///
/// Used by the code generated for `#[derive(PartialUpdate)]`.
pub fn decode_field<T: DeserializeOwned>(field: &str, value: Value) -> PersistenceResult<T> {
    from_value(value)
        .map_err(|err| PersistenceError::InvalidPatch(format!("field `{field}`: {err}")))
}
