//! Map-like records.
//!
//! [`DataMap`] stores a record as a loose JSON object instead of a struct. Its id
//! lives under the `"id"` key (matched case-insensitively, so `"Id"` works too) and
//! partial updates assign keys directly.

use std::ops::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::PersistenceResult,
    patch::PartialUpdate,
    record::Identifiable,
};

const ID_KEY: &str = "id";

static EMPTY_ID: String = String::new();

/// A record represented as a JSON object with a string id.
///
/// Only a non-empty string under `"id"` counts as an id. Any other value there
/// (a number, `null`, an object) reads as the empty id, so the record is treated
/// as having no id and `create` overwrites the value with a generated string id.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct DataMap(Map<String, Value>);

impl DataMap {
    /// Creates an empty map without an id.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds a key, replacing an earlier value stored under the same name (ignoring case).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key.into(), value.into());
        self
    }

    /// Returns the value stored under a key, ignoring case.
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.find_key(key).and_then(|k| self.0.get(k))
    }

    /// Returns the value stored under a key as a string, or an empty string.
    pub fn get_as_string(&self, key: &str) -> String {
        match self.get_value(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Stores a value, reusing an existing key that matches ignoring case.
    pub fn put(&mut self, key: String, value: Value) {
        let key = self.find_key(&key).map(str::to_string).unwrap_or(key);
        self.0.insert(key, value);
    }

    fn find_key(&self, key: &str) -> Option<&str> {
        self.0
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .map(String::as_str)
    }
}

impl From<Map<String, Value>> for DataMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Deref for DataMap {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DataMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Identifiable for DataMap {
    type Id = String;

    fn id(&self) -> &String {
        match self.get_value(ID_KEY) {
            Some(Value::String(id)) => id,
            _ => &EMPTY_ID,
        }
    }

    fn is_zero_id(&self) -> bool {
        self.id().is_empty()
    }

    fn with_id(mut self, id: String) -> Self {
        self.put(ID_KEY.to_string(), Value::String(id));
        self
    }
}

impl PartialUpdate for DataMap {
    fn set_field(&mut self, name: &str, value: Value) -> PersistenceResult<bool> {
        self.put(name.to_string(), value);
        Ok(true)
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::patch::Patch;

    #[test]
    fn id_key_is_case_insensitive() {
        let map = DataMap::new().with("Id", "42").with("Key", "K");

        assert_eq!(map.id(), "42");
        assert!(!map.is_zero_id());

        let map = map.with_id("43".to_string());
        assert_eq!(map.get_value("Id"), Some(&json!("43")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn missing_or_empty_id_is_zero() {
        assert!(DataMap::new().is_zero_id());
        assert!(DataMap::new().with("id", "").is_zero_id());
        assert!(DataMap::new().with("id", 5).is_zero_id());
    }

    #[test]
    fn patch_assigns_existing_and_new_keys() {
        let mut map = DataMap::new().with("Content", "C");

        map
            .apply_patch(&Patch::new().with("content", "C2").with("extra", 1))
            .unwrap();

        assert_eq!(map.get_as_string("Content"), "C2");
        assert_eq!(map.get_as_string("extra"), "1");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn serializes_as_a_plain_object() {
        let map = DataMap::new().with("id", "1").with("key", "K");

        assert_eq!(serde_json::to_value(&map).unwrap(), json!({ "id": "1", "key": "K" }));
    }
}
