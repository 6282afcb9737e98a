//! Lazy placeholders and the persistence-layer collaborator contract.
//!
//! A lazy placeholder is a stand-in the persistence layer leaves in the
//! graph for data it never fetched: [`LazyReference`] for a single related
//! object, [`LazyCollection`] for a container. Placeholders carry an opaque
//! [`LazyToken`] the originating layer understands; the engine never
//! interprets a token, it only hands it back through [`LazySource`].
//!
//! Everything a `LazySource` does must be fetch-free by contract: the
//! engine runs after the originating session is closed, and a hidden reload
//! attempt is exactly the failure mode detachment exists to prevent.

use std::fmt;

use crate::error::Result;
use crate::graph::Value;

/// An opaque handle the persistence layer uses to recognize its own
/// placeholders.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LazyToken(u64);

impl LazyToken {
    /// Creates a token. The raw value is meaningful only to the
    /// [`LazySource`] that issued it.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LazyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyToken({})", self.0)
    }
}

impl fmt::Display for LazyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The container kind a lazy collection will materialize into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Ordered sequence; snapshots into [`Value::Sequence`].
    Sequence,
    /// Set; snapshots into [`Value::Set`] preserving iteration order.
    Set,
    /// Mapping; snapshots into [`Value::Mapping`] preserving pairs.
    Mapping,
}

impl ContainerKind {
    /// Stable lowercase label for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ContainerKind::Sequence => "sequence",
            ContainerKind::Set => "set",
            ContainerKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An unresolved single-valued reference: a placeholder for one related
/// object. Created by the persistence layer before detachment runs,
/// consumed by the engine (substituted or nulled), never recreated.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyReference {
    token: LazyToken,
    entity: String,
}

impl LazyReference {
    /// Creates a placeholder for a reference to `entity`.
    ///
    /// The entity name is carried for diagnostics only; resolution goes
    /// through the token.
    pub fn new(token: LazyToken, entity: impl Into<String>) -> Self {
        Self {
            token,
            entity: entity.into(),
        }
    }

    /// The opaque resolution handle.
    pub fn token(&self) -> LazyToken {
        self.token
    }

    /// The target entity's type name.
    pub fn entity(&self) -> &str {
        &self.entity
    }
}

/// A placeholder for a lazily-fetched container.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyCollection {
    token: LazyToken,
    kind: ContainerKind,
}

impl LazyCollection {
    /// Creates a placeholder for a lazy container of the given kind.
    pub fn new(token: LazyToken, kind: ContainerKind) -> Self {
        Self { token, kind }
    }

    /// The opaque resolution handle.
    pub fn token(&self) -> LazyToken {
        self.token
    }

    /// The container kind this placeholder snapshots into.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }
}

/// The already-fetched contents of an initialized lazy collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Materialized {
    /// Elements of a sequence or set.
    Elements(Vec<Value>),
    /// Key→value pairs of a mapping.
    Pairs(Vec<(Value, Value)>),
}

/// The contract the originating persistence layer must expose to the
/// engine.
///
/// Implementations must not perform any fetch, blocking call, or I/O:
/// `materialize` returns data that is already in memory, and
/// `try_substitute` builds a stand-in from state the placeholder already
/// carries (identity, cached columns) or returns `Ok(None)`.
pub trait LazySource {
    /// Whether the placeholder behind `token` was fetched before the
    /// originating session closed.
    fn is_initialized(&self, token: LazyToken) -> bool;

    /// The in-memory contents of an initialized lazy collection.
    ///
    /// Report failures with [`crate::SeverError::Materialize`]; the engine
    /// logs them and nulls the owning slot.
    fn materialize(&self, token: LazyToken) -> Result<Materialized>;

    /// A fetch-free, serializable stand-in for an unresolved reference, if
    /// this placeholder implementation can produce one.
    ///
    /// Report failures with [`crate::SeverError::Substitute`]; the engine
    /// logs them and nulls the owning slot.
    fn try_substitute(&self, token: LazyToken) -> Result<Option<Value>>;
}
