use super::core::Value;

/// The closed set of node shapes the engine dispatches over.
///
/// Resolving a shape is one `match` on the value enum: the per-type
/// classification work that a reflective implementation would memoize is
/// done once, here, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Null or scalar leaf; traversal terminates here.
    Leaf,
    /// Fixed array, recursed in place.
    Array,
    /// Plain ordered sequence.
    Sequence,
    /// Plain set.
    Set,
    /// Plain mapping.
    Mapping,
    /// Unresolved single-valued reference.
    LazyReference,
    /// Lazy-backed container placeholder.
    LazyCollection,
    /// Composite domain object.
    Composite,
}

impl Shape {
    /// Classifies a value.
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Text(_) => Shape::Leaf,
            Value::Array(_) => Shape::Array,
            Value::Sequence(_) => Shape::Sequence,
            Value::Set(_) => Shape::Set,
            Value::Mapping(_) => Shape::Mapping,
            Value::Proxy(_) => Shape::LazyReference,
            Value::LazyCollection(_) => Shape::LazyCollection,
            Value::Object(_) => Shape::Composite,
        }
    }

    /// Whether this shape is a plain container the engine recurses into
    /// without consulting the domain filter.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Shape::Array | Shape::Sequence | Shape::Set | Shape::Mapping
        )
    }

    /// Stable lowercase label used in diagnostics and audit reports.
    pub fn label(self) -> &'static str {
        match self {
            Shape::Leaf => "leaf",
            Shape::Array => "array",
            Shape::Sequence => "sequence",
            Shape::Set => "set",
            Shape::Mapping => "mapping",
            Shape::LazyReference => "lazy reference",
            Shape::LazyCollection => "lazy collection",
            Shape::Composite => "composite",
        }
    }
}
