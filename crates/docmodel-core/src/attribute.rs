//! Input attribute model: an ordered key → typed-value tree.
//!
//! This mirrors the shape of a telemetry attribute map. Entries iterate in
//! insertion order, which matters downstream: when two attributes flatten to
//! the same dotted key, the one inserted later wins.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::{DocError, Result};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    /// No value. Skipped during ingestion, converted to null otherwise.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
    Slice(Vec<AttributeValue>),
    Map(AttributeMap),
}

impl AttributeValue {
    /// Human-readable kind name, used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Empty => "empty",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Int(_) => "int",
            AttributeValue::Double(_) => "double",
            AttributeValue::Str(_) => "string",
            AttributeValue::Timestamp(_) => "timestamp",
            AttributeValue::Slice(_) => "slice",
            AttributeValue::Map(_) => "map",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AttributeValue::Empty)
    }

    pub fn as_map(&self) -> Option<&AttributeMap> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Double(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Str(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Str(v)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(v: DateTime<Utc>) -> Self {
        AttributeValue::Timestamp(v)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(v: Vec<AttributeValue>) -> Self {
        AttributeValue::Slice(v)
    }
}

impl From<AttributeMap> for AttributeValue {
    fn from(v: AttributeMap) -> Self {
        AttributeValue::Map(v)
    }
}

/// JSON has no timestamp type; strings stay strings. Integers that fit in
/// `i64` become `Int`, every other number becomes `Double`.
impl From<JsonValue> for AttributeValue {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => AttributeValue::Empty,
            JsonValue::Bool(b) => AttributeValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Int(i),
                None => n
                    .as_f64()
                    .map(AttributeValue::Double)
                    .unwrap_or(AttributeValue::Empty),
            },
            JsonValue::String(s) => AttributeValue::Str(s),
            JsonValue::Array(items) => {
                AttributeValue::Slice(items.into_iter().map(AttributeValue::from).collect())
            }
            JsonValue::Object(map) => AttributeValue::Map(AttributeMap::from(map)),
        }
    }
}

/// Ordered attribute map. Keys are unique; putting an existing key replaces
/// its value in place without changing its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeMap {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object into an attribute map, keeping member order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        match serde_json::from_str::<JsonValue>(json)? {
            JsonValue::Object(map) => Ok(AttributeMap::from(map)),
            JsonValue::Null => Err(DocError::NotAnObject("null")),
            JsonValue::Bool(_) => Err(DocError::NotAnObject("bool")),
            JsonValue::Number(_) => Err(DocError::NotAnObject("number")),
            JsonValue::String(_) => Err(DocError::NotAnObject("string")),
            JsonValue::Array(_) => Err(DocError::NotAnObject("array")),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace `key`, returning a handle to the stored value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> &mut AttributeValue {
        let key = key.into();
        let value = value.into();
        let idx = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => {
                self.entries[idx].1 = value;
                idx
            }
            None => {
                self.entries.push((key, value));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i64) {
        self.insert(key, value);
    }

    pub fn put_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, AttributeValue::Str(value.into()));
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.insert(key, value);
    }

    pub fn put_double(&mut self, key: impl Into<String>, value: f64) {
        self.insert(key, value);
    }

    pub fn put_timestamp(&mut self, key: impl Into<String>, value: DateTime<Utc>) {
        self.insert(key, value);
    }

    pub fn put_empty(&mut self, key: impl Into<String>) {
        self.insert(key, AttributeValue::Empty);
    }

    /// Insert an empty nested map under `key` and return it for filling.
    pub fn put_empty_map(&mut self, key: impl Into<String>) -> &mut AttributeMap {
        match self.insert(key, AttributeMap::new()) {
            AttributeValue::Map(map) => map,
            _ => unreachable!("slot was just filled with a map"),
        }
    }

    /// Insert an empty slice under `key` and return it for filling.
    pub fn put_empty_slice(&mut self, key: impl Into<String>) -> &mut Vec<AttributeValue> {
        match self.insert(key, Vec::new()) {
            AttributeValue::Slice(items) => items,
            _ => unreachable!("slot was just filled with a slice"),
        }
    }
}

impl From<serde_json::Map<String, JsonValue>> for AttributeMap {
    fn from(map: serde_json::Map<String, JsonValue>) -> Self {
        map.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A named, timestamped occurrence attached to a span, carrying its own
/// attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub attributes: AttributeMap,
}

impl SpanEvent {
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            timestamp,
            attributes: AttributeMap::new(),
        }
    }
}
