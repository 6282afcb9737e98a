//! Field-access traversal strategy.
//!
//! Used when the serializer reads state directly from slots (binary
//! serialization). Every declared slot, own type and ancestors alike, is
//! processed: placeholders are rewritten per the core contract, plain
//! containers always recurse, plain composites recurse only when the
//! domain filter owns them. A failure on one slot never stops the
//! remaining slots.

use std::rc::Rc;

use crate::error::SeverError;
use crate::graph::{ObjectRef, Value};
use crate::registry::{AccessGuard, TypeDescriptor};

use super::{read_slot, write_back, Session};

pub(crate) fn walk(
    session: &mut Session<'_>,
    obj: &ObjectRef,
    desc: &Rc<TypeDescriptor>,
    depth: usize,
) {
    for (idx, slot) in desc.fields().iter().enumerate() {
        // Scoped elevation: released on every exit path of this iteration.
        let _access = AccessGuard::acquire(slot);

        let current = match read_slot(obj, idx) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("skipping slot {}.{}: {e}", desc.name(), slot.name());
                continue;
            }
        };

        // Writability is checked before a placeholder is consumed, so a
        // frozen slot keeps its original value.
        if current.is_lazy_backed() && slot.is_frozen() {
            let e = SeverError::Access(format!(
                "frozen slot {}.{} needs a rewrite",
                desc.name(),
                slot.name()
            ));
            log::warn!("{e}");
            write_back(obj, idx, current);
            continue;
        }

        let next = match current {
            Value::Proxy(proxy) => {
                session.resolve_proxy(proxy, desc.name(), slot.name(), depth + 1)
            }
            Value::LazyCollection(col) => {
                session.rewrite_lazy_collection(col, desc.name(), slot.name(), depth + 1)
            }
            mut v @ (Value::Array(_) | Value::Sequence(_) | Value::Set(_) | Value::Mapping(_)) => {
                session.visit(&mut v, depth + 1);
                v
            }
            mut v @ Value::Object(_) => {
                // The walk is bounded to objects the caller actually owns.
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
