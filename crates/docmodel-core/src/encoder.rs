//! Streaming JSON serializer for documents and values.
//!
//! Two key layouts are supported:
//!
//! - [`Layout::Flat`]: one JSON member per live field, dotted keys verbatim.
//! - [`Layout::Dedot`]: dotted keys re-nested into objects. The document is
//!   walked once, left to right, keeping only a stack of the namespace
//!   segments currently open. Sorted order guarantees every namespace is
//!   contiguous, so a namespace is never reopened once closed.
//!
//! Values nested inside a field (arrays, objects) are always written with
//! their keys verbatim; only document-level keys are dedotted.
//!
//! # Example
//! ```
//! use docmodel_core::{Document, Layout};
//!
//! let mut doc = Document::new();
//! doc.add_string("a.str", "test");
//! doc.add_int("a.i", 1);
//! doc.sort();
//! doc.dedup();
//! assert_eq!(doc.to_json_string(Layout::Dedot), r#"{"a":{"i":1,"str":"test"}}"#);
//! ```

use std::io::{self, Write};

use chrono::SecondsFormat;
use serde_json::ser::{CompactFormatter, Formatter};
use tracing::debug;

use crate::document::Document;
use crate::error::Result;
use crate::value::{Field, Value};

/// Key layout of a serialized document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `{"a.b":1}`
    #[default]
    Flat,
    /// `{"a":{"b":1}}`
    Dedot,
}

impl Document {
    /// Write the document as a JSON object.
    ///
    /// The document should be sorted and deduplicated first. Fields marked
    /// [`Value::Ignored`] are left out. The only possible error is a failure
    /// of `writer`.
    pub fn serialize<W: Write>(&self, writer: W, layout: Layout) -> Result<()> {
        debug!(fields = self.len(), ?layout, "serializing document");
        let mut encoder = Encoder::new(writer);
        match layout {
            Layout::Flat => encoder.object(self.live_fields())?,
            Layout::Dedot => encoder.dedot(self.live_fields())?,
        }
        Ok(())
    }

    /// Serialize into a `String`.
    pub fn to_json_string(&self, layout: Layout) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.serialize(&mut buf, layout);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Value {
    /// Write this value as JSON.
    pub fn serialize<W: Write>(&self, writer: W) -> Result<()> {
        Encoder::new(writer).value(self)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> String {
        let mut buf = Vec::new();
        let _ = self.serialize(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

struct Encoder<W> {
    writer: W,
    fmt: CompactFormatter,
}

impl<W: Write> Encoder<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            fmt: CompactFormatter,
        }
    }

    /// `{"k":v,...}` with keys verbatim.
    fn object<'a>(&mut self, fields: impl Iterator<Item = &'a Field>) -> io::Result<()> {
        self.fmt.begin_object(&mut self.writer)?;
        for (i, field) in fields.enumerate() {
            self.member(&field.key, i == 0, &field.value)?;
        }
        self.fmt.end_object(&mut self.writer)
    }

    fn dedot<'a>(&mut self, fields: impl Iterator<Item = &'a Field>) -> io::Result<()> {
        let mut open: Vec<&'a str> = Vec::new();
        let mut first = true;

        self.fmt.begin_object(&mut self.writer)?;
        for field in fields {
            let (ns, leaf) = match field.key.rsplit_once('.') {
                Some((ns, leaf)) => (Some(ns), leaf),
                None => (None, field.key.as_str()),
            };

            let common = open
                .iter()
                .zip(segments(ns))
                .take_while(|&(open_seg, seg)| *open_seg == seg)
                .count();

            while open.len() > common {
                open.pop();
                self.close_nested()?;
                first = false;
            }

            for seg in segments(ns).skip(common) {
                self.key(seg, first)?;
                self.fmt.begin_object(&mut self.writer)?;
                open.push(seg);
                first = true;
            }

            self.member(leaf, first, &field.value)?;
            first = false;
        }

        while open.pop().is_some() {
            self.close_nested()?;
        }
        self.fmt.end_object(&mut self.writer)
    }

    fn close_nested(&mut self) -> io::Result<()> {
        self.fmt.end_object(&mut self.writer)?;
        self.fmt.end_object_value(&mut self.writer)
    }

    fn member(&mut self, key: &str, first: bool, value: &Value) -> io::Result<()> {
        self.key(key, first)?;
        self.value(value)?;
        self.fmt.end_object_value(&mut self.writer)
    }

    fn key(&mut self, key: &str, first: bool) -> io::Result<()> {
        self.fmt.begin_object_key(&mut self.writer, first)?;
        self.string(key)?;
        self.fmt.end_object_key(&mut self.writer)?;
        self.fmt.begin_object_value(&mut self.writer)
    }

    fn value(&mut self, value: &Value) -> io::Result<()> {
        match value {
            Value::Null | Value::Ignored => self.fmt.write_null(&mut self.writer),
            Value::Bool(b) => self.fmt.write_bool(&mut self.writer, *b),
            Value::Int(i) => self.fmt.write_i64(&mut self.writer, *i),
            Value::Double(d) if !d.is_finite() => self.fmt.write_null(&mut self.writer),
            Value::Double(d) => self.fmt.write_f64(&mut self.writer, *d),
            Value::String(s) => self.string(s),
            Value::Timestamp(ts) => self.string(&ts.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            Value::Array(items) => {
                self.fmt.begin_array(&mut self.writer)?;
                for (i, item) in items.iter().enumerate() {
                    self.fmt.begin_array_value(&mut self.writer, i == 0)?;
                    self.value(item)?;
                    self.fmt.end_array_value(&mut self.writer)?;
                }
                self.fmt.end_array(&mut self.writer)
            }
            Value::Object(fields) if fields.is_empty() => self.fmt.write_null(&mut self.writer),
            Value::Object(fields) => self.object(fields.iter().filter(|f| !f.value.is_ignored())),
        }
    }

    fn string(&mut self, s: &str) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, s).map_err(io::Error::from)
    }
}

/// Namespace segments of a key's parent path; empty for undotted keys.
fn segments(ns: Option<&str>) -> impl Iterator<Item = &str> {
    ns.into_iter().flat_map(|ns| ns.split('.'))
}
