//! Per-type slot metadata, computed once and reused.
//!
//! A reflective implementation would re-derive an object's fields and
//! accessor pairs on every visit. Here each domain type is registered once:
//! [`TypeRegistry::define`] flattens the type's own slots together with all
//! of its ancestors' into a stable, ordered [`TypeDescriptor`] that every
//! instance of the type shares. Visiting a composite is then index
//! arithmetic over the cached descriptor.
//!
//! Visibility elevation for private slots is a scoped acquisition: the
//! access guard raises the slot's accessibility for the duration of one
//! slot's processing and restores it on drop, on every exit path.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use twox_hash::XxHash64;

use crate::api::AccessMode;
use crate::error::{Result, SeverError};
use crate::graph::{Composite, ObjectRef, Value};

type TypeTable = HashMap<String, Rc<TypeDescriptor>, BuildHasherDefault<XxHash64>>;

/// Declared visibility of a field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Readable and writable without elevation.
    Public,
    /// Requires scoped elevation before direct access.
    Private,
}

/// Metadata for one field slot of a registered type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    visibility: Visibility,
    frozen: bool,
    accessible: Cell<bool>,
}

impl FieldDescriptor {
    fn new(name: String, visibility: Visibility, frozen: bool) -> Self {
        let accessible = Cell::new(visibility == Visibility::Public);
        Self {
            name,
            visibility,
            frozen,
            accessible,
        }
    }

    /// The slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Frozen slots can be read but never rewritten, elevation or not.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether the slot is currently accessible for direct access. Private
    /// slots are accessible only while an elevation guard is alive.
    pub fn is_accessible(&self) -> bool {
        self.accessible.get()
    }
}

/// Metadata for one accessor pair (getter, optional setter) of a
/// registered type. Accessors resolve to a backing field by the property's
/// name at invocation time; a property without a matching field is a
/// getter failure at traversal time, not a registration error.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    has_setter: bool,
    setter_transient: bool,
}

impl PropertyDescriptor {
    fn new(name: String, has_setter: bool, setter_transient: bool) -> Self {
        Self {
            name,
            has_setter,
            setter_transient,
        }
    }

    /// The property (and backing field) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a setter exists at all.
    pub fn has_setter(&self) -> bool {
        self.has_setter
    }

    /// Whether the setter is marked transient. A transient setter must not
    /// be invoked; nulling falls back to the backing slot directly.
    pub fn is_transient(&self) -> bool {
        self.setter_transient
    }
}

/// The cached, flattened metadata for one registered domain type.
#[derive(Debug)]
pub struct TypeDescriptor {
    name: String,
    access_hint: Option<AccessMode>,
    fields: Vec<FieldDescriptor>,
    properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// The namespaced type name, e.g. `"billing.Invoice"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A per-type accessor-style override. A type hinted `Field` is walked
    /// with the field strategy even in property mode; field mode ignores
    /// the hint.
    pub fn access_hint(&self) -> Option<AccessMode> {
        self.access_hint
    }

    /// Every field slot: the type's own first, then each ancestor's, in
    /// registration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Every accessor pair, own first, then ancestors'.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Resolves a field name to its slot index.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// --- TYPE SPECIFICATION (BUILDER) ---

/// A fluent specification for registering one domain type.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    name: String,
    parent: Option<String>,
    access_hint: Option<AccessMode>,
    fields: Vec<(String, Visibility, bool)>,
    properties: Vec<(String, bool, bool)>,
}

impl TypeSpec {
    /// Starts a specification for `name`. Use a dotted namespace prefix
    /// (`"billing.Invoice"`) so the domain filter has something to match.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            access_hint: None,
            fields: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Declares an ancestor type; its slots are appended after this type's
    /// own. The ancestor must already be registered.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Forces an accessor style for this type (honored in property mode).
    pub fn access_hint(mut self, mode: AccessMode) -> Self {
        self.access_hint = Some(mode);
        self
    }

    /// Adds a public, writable field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), Visibility::Public, false));
        self
    }

    /// Adds a private field; direct access requires scoped elevation.
    pub fn private_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), Visibility::Private, false));
        self
    }

    /// Adds a frozen field: readable, never rewritable.
    pub fn frozen_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), Visibility::Public, true));
        self
    }

    /// Adds an accessor pair with both getter and setter.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push((name.into(), true, false));
        self
    }

    /// Adds a getter-only property.
    pub fn readonly_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push((name.into(), false, false));
        self
    }

    /// Adds an accessor pair whose setter carries a transience marker.
    pub fn transient_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push((name.into(), true, true));
        self
    }
}

// --- REGISTRY ---

/// The per-application table of registered domain types.
///
/// Descriptors are flattened at registration and shared (`Rc`) by every
/// instance, so the per-visit cost of slot enumeration is a borrow and an
/// index. The registry is single-threaded by design, like the engine.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RefCell<TypeTable>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, flattening ancestor slots into the descriptor.
    pub fn define(&self, spec: TypeSpec) -> Result<Rc<TypeDescriptor>> {
        let mut table = self.types.borrow_mut();
        if table.contains_key(&spec.name) {
            return Err(SeverError::Registry(format!(
                "duplicate type {}",
                spec.name
            )));
        }

        let mut fields: Vec<FieldDescriptor> = spec
            .fields
            .into_iter()
            .map(|(name, vis, frozen)| FieldDescriptor::new(name, vis, frozen))
            .collect();
        let mut properties: Vec<PropertyDescriptor> = spec
            .properties
            .into_iter()
            .map(|(name, setter, transient)| PropertyDescriptor::new(name, setter, transient))
            .collect();

        if let Some(parent) = &spec.parent {
            let ancestor = table.get(parent).ok_or_else(|| {
                SeverError::Registry(format!(
                    "type {} extends unknown type {parent}",
                    spec.name
                ))
            })?;
            // Ancestor descriptors are themselves flattened, so one level of
            // append covers the whole chain.
            fields.extend(ancestor.fields.iter().cloned());
            properties.extend(ancestor.properties.iter().cloned());
        }

        let descriptor = Rc::new(TypeDescriptor {
            name: spec.name.clone(),
            access_hint: spec.access_hint,
            fields,
            properties,
        });
        table.insert(spec.name, descriptor.clone());
        Ok(descriptor)
    }

    /// Looks up a registered type.
    pub fn get(&self, name: &str) -> Option<Rc<TypeDescriptor>> {
        self.types.borrow().get(name).cloned()
    }

    /// Builds a shared object node of a registered type.
    pub fn instantiate(&self, name: &str, fields: Vec<Value>) -> Result<ObjectRef> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| SeverError::Registry(format!("unknown type {name}")))?;
        let composite = Composite::new(descriptor, fields)?;
        Ok(Rc::new(RefCell::new(composite)))
    }
}

// --- SCOPED VISIBILITY ELEVATION ---

/// RAII elevation of one slot's accessibility.
///
/// Acquired before a slot is touched, restored on drop (including early
/// returns and unwinds), so no altered access state outlives the slot's
/// processing.
pub(crate) struct AccessGuard<'a> {
    slot: &'a FieldDescriptor,
    elevated: bool,
}

impl<'a> AccessGuard<'a> {
    pub(crate) fn acquire(slot: &'a FieldDescriptor) -> Self {
        let elevated = !slot.accessible.get();
        if elevated {
            slot.accessible.set(true);
        }
        Self { slot, elevated }
    }
}

impl Drop for AccessGuard<'_> {
    fn drop(&mut self) {
        if self.elevated {
            self.slot.accessible.set(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestor_slots_flatten_after_own() {
        let registry = TypeRegistry::new();
        registry
            .define(TypeSpec::new("core.Entity").private_field("id"))
            .expect("parent");
        let child = registry
            .define(TypeSpec::new("core.Tagged").extends("core.Entity").field("tag"))
            .expect("child");
        let names: Vec<&str> = child.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["tag", "id"]);
        assert_eq!(child.field_index("id"), Some(1));
    }

    #[test]
    fn duplicate_and_unknown_parent_are_rejected() {
        let registry = TypeRegistry::new();
        registry.define(TypeSpec::new("a.T")).expect("first");
        assert!(registry.define(TypeSpec::new("a.T")).is_err());
        assert!(registry
            .define(TypeSpec::new("a.U").extends("a.Missing"))
            .is_err());
    }

    #[test]
    fn guard_elevates_and_restores() {
        let slot = FieldDescriptor::new("secret".into(), Visibility::Private, false);
        assert!(!slot.is_accessible());
        {
            let _guard = AccessGuard::acquire(&slot);
            assert!(slot.is_accessible());
        }
        assert!(!slot.is_accessible());

        // Public slots are untouched by the guard.
        let open = FieldDescriptor::new("open".into(), Visibility::Public, false);
        {
            let _guard = AccessGuard::acquire(&open);
            assert!(open.is_accessible());
        }
        assert!(open.is_accessible());
    }
}
