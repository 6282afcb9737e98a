//! Property-access traversal strategy.
//!
//! Used when the serializer goes through accessor pairs (marshalling that
//! honors accessor-level transience markers). Getters and setters resolve
//! to the backing slot by the property's name; a property with no backing
//! slot is a getter failure (logged, skipped, nothing nulled). Unresolved
//! placeholders are nulled through the setter when one exists and is not
//! transient, and through the backing slot directly otherwise.

use std::rc::Rc;

use crate::graph::{ObjectRef, Value};
use crate::registry::{AccessGuard, TypeDescriptor};

use super::{read_slot, write_back, Session};

pub(crate) fn walk(
    session: &mut Session<'_>,
    obj: &ObjectRef,
    desc: &Rc<TypeDescriptor>,
    depth: usize,
) {
    for prop in desc.properties() {
        // Getter invocation: locate the backing slot.
        let Some(idx) = desc.field_index(prop.name()) else {
            log::debug!("{} --> {}", prop.name(), desc.name());
            continue;
        };
        let Some(slot) = desc.fields().get(idx) else {
            continue;
        };

        let current = match read_slot(obj, idx) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("skipping property {}.{}: {e}", desc.name(), prop.name());
                continue;
            }
        };

        let unresolved = match &current {
            Value::Proxy(p) => !session.source.is_initialized(p.token()),
            Value::LazyCollection(c) => !session.source.is_initialized(c.token()),
            _ => false,
        };

        if unresolved {
            log::debug!("{} --> {}", prop.name(), desc.name());
            if prop.has_setter() && !prop.is_transient() && !slot.is_frozen() {
                write_back(obj, idx, Value::Null);
                log::debug!("nulled {}.{} via setter", desc.name(), prop.name());
            } else {
                // Setter missing, transient, or failed: null the backing
                // slot directly, bypassing the accessor.
                let _access = AccessGuard::acquire(slot);
                if slot.is_frozen() {
                    log::warn!(
                        "unable to null {}.{}: backing slot is frozen",
                        desc.name(),
                        prop.name()
                    );
                    write_back(obj, idx, current);
                } else {
                    write_back(obj, idx, Value::Null);
                    log::debug!(
                        "nulled backing slot for {}.{} directly",
                        desc.name(),
                        prop.name()
                    );
                }
            }
            continue;
        }

        let next = match current {
            // A resolved reference still standing in proxy form: replace it
            // with its fetch-free stand-in so nothing lazy survives.
            Value::Proxy(proxy) => {
                session.resolve_proxy(proxy, desc.name(), prop.name(), depth + 1)
            }
            Value::LazyCollection(col) => {
                session.rewrite_lazy_collection(col, desc.name(), prop.name(), depth + 1)
            }
            mut v @ (Value::Array(_) | Value::Sequence(_) | Value::Set(_) | Value::Mapping(_)) => {
                session.visit(&mut v, depth + 1);
                v
            }
            mut v @ Value::Object(_) => {
                if session.owns(&v.type_label()) {
                    session.visit(&mut v, depth + 1);
                }
                v
            }
            leaf => leaf,
        };

        write_back(obj, idx, next);
    }
}
