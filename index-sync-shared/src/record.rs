//! Flat records pushed to the search service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the primary identifier every record carries.
pub const OBJECT_ID_KEY: &str = "objectID";

/// A flat key-value document identified by its `objectID`.
///
/// Records are what the remote index stores; a single item may map to several
/// of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create a record holding only its `objectID`.
    pub fn new(object_id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(OBJECT_ID_KEY.to_string(), Value::String(object_id.into()));
        Self(fields)
    }

    /// Build a record from attributes that are expected to already hold an `objectID`.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The record's `objectID`, if it is set to a string.
    pub fn object_id(&self) -> Option<&str> {
        self.0.get(OBJECT_ID_KEY).and_then(Value::as_str)
    }

    /// Replace the `objectID`.
    pub fn set_object_id(&mut self, object_id: impl Into<String>) {
        self.0
            .insert(OBJECT_ID_KEY.to_string(), Value::String(object_id.into()));
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set an attribute and return the record, for chained construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The record as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
