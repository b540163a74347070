/// Ingestion and sort behavior of `Document`.
///
/// Covers flattening of nested attribute maps into dotted keys, skipping of
/// empty attributes, the convenience builders, and the stable key sort.
use chrono::{TimeZone, Utc};
use docmodel_core::{AttributeMap, AttributeValue, Document, Field, SpanEvent, Value};

fn keys(doc: &Document) -> Vec<&str> {
    doc.fields().iter().map(|f| f.key()).collect()
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn from_map() {
    let mut m = AttributeMap::new();
    m.put_int("i", 42);
    m.put_str("str", "test");
    let mut doc = Document::from_attributes(&m);
    doc.sort();
    let want: Document = [Field::new("i", 42i64), Field::new("str", "test")]
        .into_iter()
        .collect();
    assert_eq!(doc, want);
}

#[test]
fn ignores_empty_values() {
    let mut m = AttributeMap::new();
    m.put_empty("null");
    m.put_str("str", "test");
    let doc = Document::from_attributes(&m);
    assert_eq!(doc.fields(), &[Field::new("str", "test")]);
}

#[test]
fn add_attributes_with_prefix() {
    let mut m = AttributeMap::new();
    m.put_int("i", 42);
    m.put_str("str", "test");
    let mut doc = Document::new();
    doc.add_attributes("prefix", &m);
    assert_eq!(keys(&doc), vec!["prefix.i", "prefix.str"]);
}

#[test]
fn add_attribute_flattens_a_map_value() {
    let mut m = AttributeMap::new();
    m.put_int("i", 42);
    m.put_str("str", "test");
    let mut doc = Document::new();
    doc.add_attribute("prefix", &AttributeValue::Map(m));
    assert_eq!(
        doc.fields(),
        &[Field::new("prefix.i", 42i64), Field::new("prefix.str", "test")]
    );
}

#[test]
fn add_attribute_keeps_scalars_whole() {
    let mut doc = Document::new();
    doc.add_attribute("k", &AttributeValue::Double(1.5));
    doc.add_attribute("e", &AttributeValue::Empty);
    assert_eq!(
        doc.fields(),
        &[Field::new("k", 1.5f64), Field::new("e", Value::Null)]
    );
}

#[test]
fn flatten_through_nested_maps() {
    let mut m = AttributeMap::new();
    m.put_str("a", "x");
    let b = m.put_empty_map("b");
    b.put_int("i", 1);
    b.put_str("str", "y");
    let mut doc = Document::from_attributes(&m);
    doc.sort();
    assert_eq!(keys(&doc), vec!["a", "b.i", "b.str"]);
    assert!(doc.fields().iter().all(|f| f.value().as_object().is_none()));
}

#[test]
fn flatten_many_levels() {
    let mut m = AttributeMap::new();
    m.put_empty_map("a")
        .put_empty_map("b")
        .put_empty_map("c")
        .put_bool("d", true);
    let doc = Document::from_attributes_with_prefix("root", &m);
    assert_eq!(doc.fields(), &[Field::new("root.a.b.c.d", true)]);
}

#[test]
fn maps_inside_arrays_are_not_flattened() {
    let mut inner = AttributeMap::new();
    inner.put_int("x", 1);
    let mut m = AttributeMap::new();
    m.put_empty_slice("arr")
        .push(AttributeValue::Map(inner));
    let doc = Document::from_attributes(&m);
    assert_eq!(
        doc.fields(),
        &[Field::new(
            "arr",
            Value::Array(vec![Value::object([Field::new("x", 1i64)])])
        )]
    );
}

#[test]
fn insertion_order_is_preserved_before_sort() {
    let m = AttributeMap::from_json_str(r#"{"z":1,"a":{"y":2,"b":3}}"#).unwrap();
    let doc = Document::from_attributes(&m);
    assert_eq!(keys(&doc), vec!["z", "a.y", "a.b"]);
}

// ============================================================================
// Builders
// ============================================================================

#[test]
fn add_string_skips_empty() {
    let mut doc = Document::new();
    doc.add_string("empty", "");
    doc.add_string("full", "x");
    assert_eq!(doc.fields(), &[Field::new("full", "x")]);
}

#[test]
fn scalar_builders_do_not_flatten() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let mut doc = Document::new();
    doc.add_int("a.b", 1);
    doc.add_bool("c", false);
    doc.add_double("d", 0.5);
    doc.add_timestamp("t", ts);
    assert_eq!(
        doc.fields(),
        &[
            Field::new("a.b", 1i64),
            Field::new("c", false),
            Field::new("d", 0.5f64),
            Field::new("t", ts),
        ]
    );
}

#[test]
fn trace_and_span_ids_as_hex() {
    let mut doc = Document::new();
    doc.add_trace_id("trace_id", &[0u8; 16]);
    doc.add_span_id("span_id", &[0u8; 8]);
    assert!(doc.is_empty());

    let mut trace = [0u8; 16];
    trace[15] = 0xff;
    doc.add_trace_id("trace_id", &trace);
    doc.add_span_id("span_id", &[0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 1]);
    assert_eq!(
        doc.fields(),
        &[
            Field::new("trace_id", "000000000000000000000000000000ff"),
            Field::new("span_id", "deadbeef00000001"),
        ]
    );
}

#[test]
fn events_flatten_under_their_name() {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut event = SpanEvent::new("exception", ts);
    event.attributes.put_str("message", "boom");
    let mut doc = Document::new();
    doc.add_events("Events", &[event]);
    assert_eq!(
        doc.fields(),
        &[
            Field::new("Events.exception.time", ts),
            Field::new("Events.exception.message", "boom"),
        ]
    );
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn keys_are_sorted() {
    let mut doc = Document::new();
    doc.add_int("z", 26);
    doc.add_int("a", 1);
    doc.sort();
    assert_eq!(
        doc.fields(),
        &[Field::new("a", 1i64), Field::new("z", 26i64)]
    );
}

#[test]
fn sorting_is_stable() {
    let mut doc = Document::new();
    doc.add_int("a", 1);
    doc.add_int("c", 3);
    doc.add_int("a", 2);
    doc.sort();
    assert_eq!(
        doc.fields(),
        &[
            Field::new("a", 1i64),
            Field::new("a", 2i64),
            Field::new("c", 3i64),
        ]
    );
}

#[test]
fn prefix_sorts_before_its_namespace() {
    let mut doc = Document::new();
    doc.add_int("namespace.a", 1);
    doc.add_int("namespace", 2);
    doc.sort();
    assert_eq!(keys(&doc), vec!["namespace", "namespace.a"]);
    assert!(doc.is_sorted());
}
