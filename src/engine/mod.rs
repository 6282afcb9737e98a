//! The recursion core.
//!
//! A [`Session`] owns everything one detachment pass needs (the
//! collaborator handle, the configuration, the identity set), so
//! independent passes can never interfere through shared state. The walk
//! is single-threaded, depth-first, and runs to completion; every failure
//! is converted into a log line at the slot where it happened.
//!
//! Dispatch order per value mirrors the rewrite contract: depth guard
//! first, then shape classification, then, for composites only,
//! identity memoization and the strategy walk.

mod field;
mod property;

use crate::api::{AccessMode, DetachConfig};
use crate::error::{Result, SeverError};
use crate::graph::{IdentitySet, NodeId, ObjectRef, Value};
use crate::lazy::{ContainerKind, LazyCollection, LazyReference, LazySource, Materialized};
use crate::registry::TypeDescriptor;

pub(crate) struct Session<'a> {
    pub(crate) source: &'a dyn LazySource,
    pub(crate) config: &'a DetachConfig,
    seen: IdentitySet,
}

impl<'a> Session<'a> {
    pub(crate) fn new(source: &'a dyn LazySource, config: &'a DetachConfig) -> Self {
        Self {
            source,
            config,
            seen: IdentitySet::new(),
        }
    }

    /// Walks the whole graph and returns the number of distinct object
    /// nodes processed.
    pub(crate) fn run(&mut self, root: &mut Value) -> usize {
        self.visit(root, 0);
        self.seen.len()
    }

    pub(crate) fn visit(&mut self, value: &mut Value, depth: usize) {
        if depth > self.config.depth_limit {
            log::warn!(
                "recursion depth {depth} is too much at {}, abandoning branch",
                value.type_label()
            );
            return;
        }
        match value {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_) => {}
            Value::Array(items) | Value::Sequence(items) | Value::Set(items) => {
                for item in items.iter_mut() {
                    self.visit(item, depth + 1);
                }
            }
            Value::Mapping(pairs) => {
                for (key, val) in pairs.iter_mut() {
                    self.visit(val, depth + 1);
                    self.visit(key, depth + 1);
                }
            }
            placeholder @ (Value::Proxy(_) | Value::LazyCollection(_)) => {
                // A placeholder outside any composite slot (container
                // element, mapping key, or the root itself): no accessor is
                // involved, so substitute-or-null applies in both modes.
                *placeholder = match std::mem::replace(placeholder, Value::Null) {
                    Value::Proxy(proxy) => {
                        self.resolve_proxy(proxy, "container", "element", depth)
                    }
                    Value::LazyCollection(col) => {
                        self.rewrite_lazy_collection(col, "container", "element", depth)
                    }
                    other => other,
                };
            }
            Value::Object(obj) => {
                let obj = obj.clone();
                self.visit_object(&obj, depth);
            }
        }
    }

    fn visit_object(&mut self, obj: &ObjectRef, depth: usize) {
        let id = NodeId::of(obj);
        if self.seen.visited(id) {
            return;
        }
        self.seen.mark(id);

        let descriptor = match obj.try_borrow() {
            Ok(composite) => composite.descriptor().clone(),
            Err(_) => {
                log::warn!(
                    "{}",
                    SeverError::Access(format!("object {id} is already borrowed, skipping"))
                );
                return;
            }
        };

        match self.effective_mode(&descriptor) {
            AccessMode::Field => field::walk(self, obj, &descriptor, depth),
            AccessMode::Property => property::walk(self, obj, &descriptor, depth),
        }
    }

    /// Property mode honors a per-type field-access hint; field mode is
    /// unconditional.
    fn effective_mode(&self, descriptor: &TypeDescriptor) -> AccessMode {
        match (self.config.mode, descriptor.access_hint()) {
            (AccessMode::Property, Some(AccessMode::Field)) => AccessMode::Field,
            (mode, _) => mode,
        }
    }

    pub(crate) fn owns(&self, type_name: &str) -> bool {
        self.config.domain.owns(type_name)
    }

    /// Resolves an unresolved single-valued reference into either a
    /// recursively-detached substitute or null. Never fails; failures
    /// become diagnostics.
    pub(crate) fn resolve_proxy(
        &mut self,
        proxy: LazyReference,
        owner: &str,
        slot: &str,
        depth: usize,
    ) -> Value {
        match self.source.try_substitute(proxy.token()) {
            Ok(Some(mut substitute)) => {
                if substitute.is_lazy_backed() {
                    log::debug!(
                        "substitute for {} at {owner}.{slot} is still lazy-backed, nulling",
                        proxy.entity()
                    );
                    return Value::Null;
                }
                // Detach the substitute before it takes the proxy's place.
                self.visit(&mut substitute, depth);
                substitute
            }
            Ok(None) => {
                log::debug!("no substitute for {} at {owner}.{slot}, nulling", proxy.entity());
                Value::Null
            }
            Err(e) => {
                log::error!("unable to substitute {} at {owner}.{slot}: {e}", proxy.entity());
                Value::Null
            }
        }
    }

    /// Rewrites a lazy collection placeholder: null when uninitialized, a
    /// recursed plain snapshot when initialized.
    pub(crate) fn rewrite_lazy_collection(
        &mut self,
        col: LazyCollection,
        owner: &str,
        slot: &str,
        depth: usize,
    ) -> Value {
        if !self.source.is_initialized(col.token()) {
            log::debug!("nulled uninitialized lazy {} at {owner}.{slot}", col.kind());
            return Value::Null;
        }
        match self.snapshot(&col) {
            Ok(mut plain) => {
                // The snapshot severed the fetch link; its contents may
                // still hold placeholders of their own.
                self.visit(&mut plain, depth);
                plain
            }
            Err(e) => {
                log::warn!("{e} at {owner}.{slot}, nulling");
                Value::Null
            }
        }
    }

    fn snapshot(&self, col: &LazyCollection) -> Result<Value> {
        let contents = self.source.materialize(col.token())?;
        match (col.kind(), contents) {
            (ContainerKind::Sequence, Materialized::Elements(items)) => Ok(Value::Sequence(items)),
            (ContainerKind::Set, Materialized::Elements(items)) => Ok(Value::Set(items)),
            (ContainerKind::Mapping, Materialized::Pairs(pairs)) => Ok(Value::Mapping(pairs)),
            (kind, _) => Err(SeverError::Materialize(format!(
                "lazy {kind} materialized into the wrong shape"
            ))),
        }
    }
}

// --- SLOT ACCESS SHARED BY BOTH STRATEGIES ---

/// Takes a slot's value out, leaving `Null` while it is processed.
pub(crate) fn read_slot(obj: &ObjectRef, idx: usize) -> Result<Value> {
    let mut composite = obj
        .try_borrow_mut()
        .map_err(|_| SeverError::Access("object is already borrowed".into()))?;
    composite
        .take_slot(idx)
        .ok_or_else(|| SeverError::Internal(format!("slot index {idx} out of bounds")))
}

/// Puts a processed (or restored) value back into its slot.
pub(crate) fn write_back(obj: &ObjectRef, idx: usize, value: Value) {
    match obj.try_borrow_mut() {
        Ok(mut composite) => composite.put_slot(idx, value),
        Err(_) => log::warn!("lost slot {idx} write-back: object is already borrowed"),
    }
}
