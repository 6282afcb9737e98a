// src/inspector.rs

//! Tools for inspecting a graph for remaining lazy placeholders.
//! Useful for callers that need a hard zero-placeholder guarantee before
//! handing the graph to a serializer: detachment is best-effort by
//! contract, the audit is the re-check.

use std::fmt;

use serde::Serialize;

use crate::graph::{IdentitySet, NodeId, Shape, Value};

/// A structural report over everything reachable from one root.
#[derive(Debug, Serialize)]
pub struct GraphAudit {
    /// Distinct composite object nodes.
    pub objects: usize,
    /// Plain containers (arrays, sequences, sets, mappings).
    pub containers: usize,
    /// Null and scalar leaves.
    pub leaves: usize,
    /// Object nodes that could not be read because they were borrowed.
    pub skipped: usize,
    /// Every remaining lazy placeholder, with its path from the root.
    pub residue: Vec<Residue>,
}

/// One remaining placeholder found by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Residue {
    /// Path from the root, e.g. `$.lines[2].customer`.
    pub location: String,
    /// The placeholder's shape label.
    pub shape: String,
    /// The target entity name (references) or container kind (collections).
    pub detail: String,
}

impl GraphAudit {
    /// Whether the graph is safe to hand to a serializer.
    pub fn is_clean(&self) -> bool {
        self.residue.is_empty()
    }
}

/// The graph audit tool.
#[derive(Debug)]
pub struct SeverInspector;

impl SeverInspector {
    /// Scans a graph read-only and reports node counts and placeholder
    /// residue. Cycle-safe through the same identity memoization the
    /// engine uses; the scan itself never mutates or resolves anything.
    pub fn audit(root: &Value) -> GraphAudit {
        let mut audit = GraphAudit {
            objects: 0,
            containers: 0,
            leaves: 0,
            skipped: 0,
            residue: Vec::new(),
        };
        let mut seen = IdentitySet::new();
        Self::scan(root, "$", &mut seen, &mut audit);
        audit
    }

    fn scan(value: &Value, location: &str, seen: &mut IdentitySet, audit: &mut GraphAudit) {
        match value {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_) => {
                audit.leaves += 1;
            }
            Value::Array(items) | Value::Sequence(items) | Value::Set(items) => {
                audit.containers += 1;
                for (i, item) in items.iter().enumerate() {
                    Self::scan(item, &format!("{location}[{i}]"), seen, audit);
                }
            }
            Value::Mapping(pairs) => {
                audit.containers += 1;
                for (i, (key, val)) in pairs.iter().enumerate() {
                    Self::scan(key, &format!("{location}[{i}].key"), seen, audit);
                    Self::scan(val, &format!("{location}[{i}].value"), seen, audit);
                }
            }
            Value::Proxy(p) => audit.residue.push(Residue {
                location: location.to_string(),
                shape: Shape::LazyReference.label().to_string(),
                detail: p.entity().to_string(),
            }),
            Value::LazyCollection(c) => audit.residue.push(Residue {
                location: location.to_string(),
                shape: Shape::LazyCollection.label().to_string(),
                detail: c.kind().label().to_string(),
            }),
            Value::Object(obj) => {
                if !seen.mark(NodeId::of(obj)) {
                    return;
                }
                match obj.try_borrow() {
                    Ok(composite) => {
                        audit.objects += 1;
                        for (name, slot) in composite.slot_values() {
                            Self::scan(slot, &format!("{location}.{name}"), seen, audit);
                        }
                    }
                    Err(_) => audit.skipped += 1,
                }
            }
        }
    }
}

impl fmt::Display for GraphAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SEVER AUDIT REPORT ===")?;
        writeln!(f, "Objects:    {}", self.objects)?;
        writeln!(f, "Containers: {}", self.containers)?;
        writeln!(f, "Leaves:     {}", self.leaves)?;
        if self.skipped > 0 {
            writeln!(f, "Skipped:    {}", self.skipped)?;
        }
        writeln!(f, "\n[RESIDUE: {}]", self.residue.len())?;
        for r in &self.residue {
            writeln!(f, "  - {} ({}) at {}", r.shape, r.detail, r.location)?;
        }
        Ok(())
    }
}
