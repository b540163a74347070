//! Collision resolution for sorted documents.
//!
//! Two shapes of collision survive flattening:
//!
//! - **Duplicate keys**: `a=1` and `a=2`. Every occurrence but the last is
//!   marked [`Value::Ignored`].
//! - **Scalar vs. namespace**: `ns=1` next to `ns.a=2`. Dedotted, `ns` would
//!   have to be both a scalar and an object, so the scalar moves to
//!   `ns.value`. The renamed field re-enters the scan at its new sorted slot
//!   and can collide again, either with an existing `ns.value` (which wins) or
//!   with an `ns.value.*` namespace (which triggers another rename).
//!
//! Fields are never removed or reordered except for the renamed one, so
//! positions held by callers stay valid apart from that single move.

use tracing::{debug, trace};

use crate::document::Document;
use crate::value::Value;

/// Suffix given to a scalar that shares its key with a namespace.
pub const VALUE_SUFFIX: &str = "value";

impl Document {
    /// Resolve key collisions in place. The document must already be sorted
    /// (see [`Document::sort`]); the result stays sorted.
    ///
    /// Running dedup on an already deduplicated document is a no-op.
    pub fn dedup(&mut self) {
        debug_assert!(self.is_sorted(), "dedup requires a sorted document");

        let mut cursor = 0;
        while cursor < self.fields.len() {
            if self.fields[cursor].value.is_ignored() {
                cursor += 1;
                continue;
            }

            if self.has_live_duplicate(cursor) {
                trace!(key = %self.fields[cursor].key, "superseded by later field");
                self.fields[cursor].value = Value::Ignored;
                cursor += 1;
                continue;
            }

            if self.has_live_children(cursor) {
                let field = &mut self.fields[cursor];
                debug!(key = %field.key, "scalar collides with namespace, renaming");
                field.key.push('.');
                field.key.push_str(VALUE_SUFFIX);
                self.reposition(cursor);
                // Whatever now sits at `cursor` has not been examined yet.
                continue;
            }

            cursor += 1;
        }
    }

    /// A later live field carries the same key. Equal keys are adjacent.
    fn has_live_duplicate(&self, idx: usize) -> bool {
        let key = &self.fields[idx].key;
        self.fields[idx + 1..]
            .iter()
            .take_while(|f| f.key == *key)
            .any(|f| !f.value.is_ignored())
    }

    /// A later live field lives under `<key>.`.
    ///
    /// Keys such as `<key>-x` sort between `<key>` and `<key>.x`, so the
    /// namespace is located by binary search rather than by looking at the
    /// immediate neighbour.
    fn has_live_children(&self, idx: usize) -> bool {
        let key = self.fields[idx].key.as_str();
        let rest = &self.fields[idx + 1..];
        let start = rest.partition_point(|f| f.key.bytes().lt(namespace_bytes(key)));
        rest[start..]
            .iter()
            .take_while(|f| is_child_key(&f.key, key))
            .any(|f| !f.value.is_ignored())
    }

    /// Move the field at `idx` forward to its sorted slot, ahead of any
    /// fields that already carry its (new) key.
    fn reposition(&mut self, idx: usize) {
        let offset = {
            let key = self.fields[idx].key.as_str();
            self.fields[idx + 1..].partition_point(|f| f.key.as_str() < key)
        };
        self.fields[idx..=idx + offset].rotate_left(1);
    }
}

/// Bytes of `<ns>.`, without allocating.
fn namespace_bytes(ns: &str) -> impl Iterator<Item = u8> + '_ {
    ns.bytes().chain(std::iter::once(b'.'))
}

fn is_child_key(key: &str, ns: &str) -> bool {
    key.len() > ns.len() && key.starts_with(ns) && key.as_bytes()[ns.len()] == b'.'
}
