//! Document value types.
//!
//! [`Value`] is the closed set of kinds a document field can carry. Unlike the
//! input [`AttributeValue`], it never flattens: a map converted through
//! `Value::from` stays a nested [`Value::Object`].

use chrono::{DateTime, Utc};

use crate::attribute::AttributeValue;

/// A typed document value.
///
/// Doubles are stored as given; NaN and infinities are accepted here and
/// encoded as `null` by the serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Absolute instant with nanosecond resolution.
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    /// Fields in insertion order. Duplicate keys are kept as-is.
    Object(Vec<Field>),
    /// Marker left behind by [`Document::dedup`](crate::Document::dedup) on a
    /// superseded field. Serializers skip fields carrying it.
    Ignored,
}

impl Value {
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Value::Object(fields.into_iter().collect())
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Value::Ignored)
    }

    /// True for null, the ignored marker, and empty arrays or objects.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null | Value::Ignored => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[Field]> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

/// Standalone conversion: arrays and maps keep their nesting.
impl From<&AttributeValue> for Value {
    fn from(attr: &AttributeValue) -> Self {
        match attr {
            AttributeValue::Empty => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Int(i) => Value::Int(*i),
            AttributeValue::Double(d) => Value::Double(*d),
            AttributeValue::Str(s) => Value::String(s.clone()),
            AttributeValue::Timestamp(ts) => Value::Timestamp(*ts),
            AttributeValue::Slice(items) => Value::Array(items.iter().map(Value::from).collect()),
            AttributeValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| Field::new(k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A single `(key, value)` entry of a document or object.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) key: String,
    pub(crate) value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeMap;

    #[test]
    fn empty_attribute_is_null() {
        assert_eq!(Value::from(&AttributeValue::Empty), Value::Null);
    }

    #[test]
    fn map_converts_to_object_without_flattening() {
        let mut map = AttributeMap::new();
        map.put_empty_map("b").put_int("c", 1);
        let value = Value::from(&AttributeValue::Map(map));
        assert_eq!(
            value,
            Value::object([Field::new("b", Value::object([Field::new("c", 1i64)]))])
        );
    }

    #[test]
    fn array_elements_convert_independently() {
        let mut inner = AttributeMap::new();
        inner.put_str("k", "v");
        let attr = AttributeValue::Slice(vec![
            AttributeValue::Int(1),
            AttributeValue::Empty,
            AttributeValue::Map(inner),
        ]);
        assert_eq!(
            Value::from(&attr),
            Value::Array(vec![
                Value::Int(1),
                Value::Null,
                Value::object([Field::new("k", "v")]),
            ])
        );
    }

    #[test]
    fn is_empty_covers_degenerate_containers() {
        assert!(Value::Null.is_empty());
        assert!(Value::Ignored.is_empty());
        assert!(Value::Array(vec![]).is_empty());
        assert!(Value::Object(vec![]).is_empty());
        assert!(!Value::Int(0).is_empty());
        assert!(!Value::String(String::new()).is_empty());
    }
}
