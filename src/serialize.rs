//! The serializer boundary.
//!
//! A detached graph serializes structurally: leaves as themselves,
//! containers as sequences and maps, composites as maps of slot name to
//! value. The two placeholder shapes refuse to serialize: the serializer
//! must never be the thing that triggers a fetch, so a graph that still
//! holds a placeholder fails loudly instead of loading quietly.
//!
//! Cycle handling is the serializer's own concern, as with any shared
//! structure handed to serde; run the audit first if the graph's shape is
//! in doubt.

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::graph::{Composite, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Array(items) | Value::Sequence(items) | Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Object(obj) => match obj.try_borrow() {
                Ok(composite) => composite.serialize(serializer),
                Err(_) => Err(S::Error::custom("composite is mutably borrowed")),
            },
            Value::Proxy(p) => Err(S::Error::custom(format!(
                "unresolved lazy reference to {} was never detached",
                p.entity()
            ))),
            Value::LazyCollection(c) => Err(S::Error::custom(format!(
                "lazy-backed {} was never detached",
                c.kind()
            ))),
        }
    }
}

impl Serialize for Composite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.descriptor().fields().len()))?;
        for (name, value) in self.slot_values() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
