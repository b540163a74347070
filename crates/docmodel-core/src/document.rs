//! The flat document and its ingestion entry points.
//!
//! A [`Document`] is an ordered list of [`Field`]s keyed by dotted paths.
//! Nested attribute maps are flattened at ingestion time so that a plain
//! byte-wise sort groups every namespace contiguously; both
//! [`Document::dedup`] and the dedot serializer rely on that grouping.
//!
//! ```
//! use docmodel_core::{AttributeMap, Document, Layout};
//!
//! let mut attrs = AttributeMap::new();
//! attrs.put_str("a", "x");
//! attrs.put_empty_map("b").put_int("i", 1);
//!
//! let mut doc = Document::from_attributes(&attrs);
//! doc.sort();
//! doc.dedup();
//! assert_eq!(doc.to_json_string(Layout::Flat), r#"{"a":"x","b.i":1}"#);
//! assert_eq!(doc.to_json_string(Layout::Dedot), r#"{"a":"x","b":{"i":1}}"#);
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::attribute::{AttributeMap, AttributeValue, SpanEvent};
use crate::value::{Field, Value};

/// An ordered, possibly duplicate-keyed list of fields.
///
/// Uniqueness of live keys holds only after [`sort`](Document::sort) followed
/// by [`dedup`](Document::dedup).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub(crate) fields: Vec<Field>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unsorted document from a flattened attribute map.
    pub fn from_attributes(attributes: &AttributeMap) -> Self {
        Self::from_attributes_with_prefix("", attributes)
    }

    /// Like [`from_attributes`](Document::from_attributes), with every key
    /// placed under `prefix`.
    pub fn from_attributes_with_prefix(prefix: &str, attributes: &AttributeMap) -> Self {
        let mut doc = Self::new();
        doc.add_attributes(prefix, attributes);
        doc
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields that have not been superseded by dedup.
    pub fn live_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.value.is_ignored())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field as-is. No flattening happens here, even for objects.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.push(Field::new(key, value));
    }

    pub fn add_int(&mut self, key: impl Into<String>, value: i64) {
        self.add(key, value);
    }

    pub fn add_bool(&mut self, key: impl Into<String>, value: bool) {
        self.add(key, value);
    }

    pub fn add_double(&mut self, key: impl Into<String>, value: f64) {
        self.add(key, value);
    }

    /// Empty strings are not added.
    pub fn add_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.add(key, Value::String(value));
        }
    }

    pub fn add_timestamp(&mut self, key: impl Into<String>, value: DateTime<Utc>) {
        self.add(key, value);
    }

    /// Add a trace id as lower-case hex. The all-zero id means "unset" and is skipped.
    pub fn add_trace_id(&mut self, key: impl Into<String>, id: &[u8; 16]) {
        if let Some(hex) = hex_id(id) {
            self.add(key, hex);
        }
    }

    /// Add a span id as lower-case hex. The all-zero id means "unset" and is skipped.
    pub fn add_span_id(&mut self, key: impl Into<String>, id: &[u8; 8]) {
        if let Some(hex) = hex_id(id) {
            self.add(key, hex);
        }
    }

    /// Add a single attribute. Map values are flattened under `key`;
    /// everything else is converted with [`Value::from`], so maps nested in
    /// arrays stay nested.
    pub fn add_attribute(&mut self, key: &str, value: &AttributeValue) {
        match value {
            AttributeValue::Map(map) => self.add_attributes(key, map),
            other => self.add(key, Value::from(other)),
        }
    }

    /// Flatten every entry of `attributes` under `prefix`, in insertion
    /// order. Empty values are skipped and nested maps recurse with the
    /// dotted key as the new prefix.
    pub fn add_attributes(&mut self, prefix: &str, attributes: &AttributeMap) {
        for (key, value) in attributes.iter() {
            let key = flatten_key(prefix, key);
            match value {
                AttributeValue::Empty => trace!(key = %key, "skipping empty attribute"),
                AttributeValue::Map(map) => self.add_attributes(&key, map),
                other => self.fields.push(Field::new(key, Value::from(other))),
            }
        }
    }

    /// Add span events. Each event contributes `<key>.<name>.time` and its
    /// attributes flattened under `<key>.<name>`.
    pub fn add_events(&mut self, key: &str, events: &[SpanEvent]) {
        for event in events {
            let event_key = flatten_key(key, &event.name);
            self.add_timestamp(flatten_key(&event_key, "time"), event.timestamp);
            self.add_attributes(&event_key, &event.attributes);
        }
    }

    /// Stable byte-wise sort by key. Fields with equal keys keep their
    /// relative insertion order, which dedup's last-wins rule depends on.
    pub fn sort(&mut self) {
        self.fields.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn is_sorted(&self) -> bool {
        self.fields.is_sorted_by(|a, b| a.key <= b.key)
    }
}

impl FromIterator<Field> for Document {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Extend<Field> for Document {
    fn extend<I: IntoIterator<Item = Field>>(&mut self, iter: I) {
        self.fields.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn flatten_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn hex_id(id: &[u8]) -> Option<String> {
    if id.iter().all(|b| *b == 0) {
        return None;
    }
    let mut out = String::with_capacity(id.len() * 2);
    for b in id {
        let _ = write!(out, "{b:02x}");
    }
    Some(out)
}
