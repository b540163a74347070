//! # docmodel-core
//!
//! Turns nested telemetry attributes into flat, collision-free JSON documents.
//!
//! The pipeline has four fixed stages, each a pure transformation on an owned
//! [`Document`]:
//!
//! 1. **Ingest**: [`Document::add_attributes`] flattens nested maps into
//!    dotted keys (`{"b":{"i":1}}` becomes `b.i`). Maps inside arrays stay
//!    nested.
//! 2. **Sort**: [`Document::sort`], stable and byte-wise by key.
//! 3. **Dedup**: [`Document::dedup`] marks superseded duplicates as
//!    [`Value::Ignored`] and moves scalars that collide with a namespace to
//!    `<key>.value`.
//! 4. **Serialize**: [`Document::serialize`] streams the document as JSON,
//!    either with flat dotted keys or re-nested ([`Layout::Dedot`]).
//!
//! ## Quick start
//!
//! ```rust
//! use docmodel_core::{AttributeMap, Document, Layout};
//!
//! let attrs = AttributeMap::from_json_str(r#"{"ns":1,"ns.a":2}"#).unwrap();
//! let mut doc = Document::from_attributes(&attrs);
//! doc.sort();
//! doc.dedup();
//! assert_eq!(
//!     doc.to_json_string(Layout::Dedot),
//!     r#"{"ns":{"a":2,"value":1}}"#
//! );
//! ```
//!
//! ## Modules
//!
//! - [`attribute`]: input attribute model (`AttributeMap`, `AttributeValue`)
//! - [`value`]: document value union and fields
//! - [`document`]: the document, ingestion and sort
//! - [`dedup`]: collision resolution
//! - [`encoder`]: flat and dedot JSON serialization
//! - [`error`]: error types

pub mod attribute;
pub mod dedup;
pub mod document;
pub mod encoder;
pub mod error;
pub mod value;

pub use attribute::{AttributeMap, AttributeValue, SpanEvent};
pub use document::Document;
pub use encoder::Layout;
pub use error::{DocError, Result};
pub use value::{Field, Value};
