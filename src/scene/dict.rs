//! Ordered scene dictionary consumed by the rendering kernel.
//!
//! Entries keep their insertion order and identifiers must be unique: a
//! second insertion under an existing id is rejected instead of silently
//! replacing the first one.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::core::{Error, Result};

/// Insertion-ordered map from scene identifiers to plugin specifications
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneDict {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl SceneDict {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, failing if `id` is already present
    pub fn insert(&mut self, id: impl Into<String>, value: Value) -> Result<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(Error::KeyCollision(id));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        Ok(())
    }

    /// Append every entry of `other`, in order
    pub fn merge(&mut self, other: SceneDict) -> Result<()> {
        for (id, value) in other.entries {
            self.insert(id, value)?;
        }
        Ok(())
    }

    /// Builder-style `merge`
    pub fn merged(mut self, other: SceneDict) -> Result<Self> {
        self.merge(other)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume into a JSON object
    ///
    /// Key order of the result follows `serde_json`'s map implementation;
    /// serialize the `SceneDict` itself to keep insertion order.
    pub fn into_value(self) -> Value {
        Value::Object(self.into_map())
    }

    /// Consume into a JSON map (for nesting, e.g. shape groups)
    pub fn into_map(self) -> Map<String, Value> {
        self.entries.into_iter().collect()
    }
}

impl Serialize for SceneDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
