//! # Sever
//!
//! A detachment engine for lazily-loaded object graphs: it rewrites a
//! graph in place so that every reachable slot is a plain value, a plain
//! container snapshot, or null, and therefore safe to hand to a
//! serializer that must never trigger on-demand loading.
//!
//! ## Overview
//!
//! Persistence layers routinely hand back graphs that are not what they
//! appear to be: single-valued references are stand-in proxies, and
//! collections are lazy-backed shells that fetch on first touch. That is
//! fine while the originating session is open, and a latent crash the
//! moment a serializer walks the graph afterwards. Sever walks the graph
//! first and takes the fetch machinery out of it:
//!
//! *   **Uninitialized placeholders** are replaced with null; there is
//!     nothing real to visit.
//! *   **Initialized lazy collections** are replaced with plain container
//!     snapshots of their already-fetched contents, severing the
//!     connection to the fetch mechanism while preserving the data.
//! *   **Unresolved references** are replaced with a fetch-free
//!     substitute when the persistence layer can produce one, and with
//!     null when it cannot.
//! *   **Everything else** is left exactly where it was: the engine
//!     mutates slots in place and never takes ownership of the graph.
//!
//! ## Architecture
//!
//! ### The Graph Model
//!
//! Instead of reflective type tests, the graph is a closed set of node
//! variants ([`Value`]): leaves, four container shapes, two lazy
//! placeholder shapes, and composites. Classification is a single `match`
//! ([`graph::Shape`]). Composites share per-type slot metadata
//! ([`registry::TypeDescriptor`]) computed once at registration (own
//! slots plus all ancestors'), so visiting an object is index arithmetic,
//! not name lookup.
//!
//! ### The Engine
//!
//! The detachment session is single-threaded, depth-first, and cycle-safe:
//! node identity (allocation address, never equality) is marked before
//! children are explored, so diamonds and cycles are walked exactly once.
//! A depth ceiling (default 50) abandons runaway branches with a warning
//! instead of overflowing. No failure is fatal: unreadable slots are
//! skipped, failed substitutes are nulled, and the call always returns
//! with a best-effort partially-detached graph.
//!
//! ### Strategies
//!
//! Two interchangeable traversal strategies share the recursion core:
//! field access (direct slots, for binary serialization) and property
//! access (accessor pairs honoring transience markers, for marshalling).
//! See [`AccessMode`].
//!
//! ### The Collaborator
//!
//! The engine performs no I/O. Everything that touches the persistence
//! layer goes through [`lazy::LazySource`], whose three operations
//! (`is_initialized`, `materialize`, `try_substitute`) are required to be
//! fetch-free by contract.
//!
//! ## Usage
//!
//! ```rust
//! use sever::{
//!     AccessMode, Composite, ContainerKind, LazyCollection, LazySource, LazyToken,
//!     Materialized, Result, Sever, SeverError, TypeRegistry, TypeSpec, Value,
//! };
//!
//! // A persistence layer that never fetched anything.
//! struct ColdStore;
//!
//! impl LazySource for ColdStore {
//!     fn is_initialized(&self, _token: LazyToken) -> bool {
//!         false
//!     }
//!     fn materialize(&self, token: LazyToken) -> Result<Materialized> {
//!         Err(SeverError::Materialize(format!("collection {token} was never fetched")))
//!     }
//!     fn try_substitute(&self, _token: LazyToken) -> Result<Option<Value>> {
//!         Ok(None)
//!     }
//! }
//!
//! let registry = TypeRegistry::new();
//! let order = registry.define(TypeSpec::new("shop.Order").field("id").field("lines"))?;
//!
//! let mut root = Value::object(Composite::new(
//!     order,
//!     vec![
//!         Value::Int(7),
//!         Value::LazyCollection(LazyCollection::new(LazyToken::new(1), ContainerKind::Sequence)),
//!     ],
//! )?);
//!
//! Sever::detach(&mut root, &ColdStore, AccessMode::Field);
//!
//! // The never-fetched collection is now a plain null; the graph is safe
//! // to serialize.
//! let Value::Object(order) = &root else { unreachable!() };
//! assert_eq!(order.borrow().field("lines"), Some(&Value::Null));
//! # Ok::<(), sever::SeverError>(())
//! ```
//!
//! ## Observability
//!
//! The engine reports only through the [`log`] facade: one summary line
//! per call (distinct objects, elapsed milliseconds; elevated to `info`
//! past one second), plus per-slot diagnostics naming the offending type
//! and slot. It deliberately returns nothing; callers that need a hard
//! zero-placeholder guarantee re-check with
//! [`inspector::SeverInspector::audit`].
//!
//! ### Safety and Error Handling
//!
//! * **No panics:** no `unwrap()` or `panic!()` in the library (enforced
//!   by clippy lints); a panicking collaborator is caught at the entry
//!   point and logged.
//! * **No unsafe:** `#![deny(unsafe_code)]`.
//! * **Single-threaded by construction:** graph nodes are `Rc`/`RefCell`;
//!   concurrent detachment over shared nodes is a compile error, not a
//!   data race.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod api;
pub mod error;
pub mod graph;
pub mod inspector;
pub mod lazy;
pub mod registry;

// --- INTERNAL IMPLEMENTATION MODULES ---
mod engine;
mod serialize;

// --- RE-EXPORTS ---

pub use api::{AccessMode, DetachConfig, DomainFilter, Sever};
pub use error::{Result, SeverError};
pub use graph::{Composite, ObjectRef, Shape, Value};
pub use inspector::{GraphAudit, SeverInspector};
pub use lazy::{ContainerKind, LazyCollection, LazyReference, LazySource, LazyToken, Materialized};
pub use registry::{TypeRegistry, TypeSpec, Visibility};

/// Constants used throughout the library.
pub mod constants {
    /// The default recursion ceiling for one detachment pass.
    pub const DEFAULT_DEPTH_LIMIT: usize = 50;

    /// Elapsed-time threshold, in milliseconds, past which the summary log
    /// line is elevated from debug to info.
    pub const SLOW_DETACH_MILLIS: u128 = 1000;
}
