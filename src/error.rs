//! Centralized error handling for Sever.
//!
//! The engine itself never propagates an error to the caller of
//! [`crate::Sever::detach`]: traversal failures are logged at the site where
//! they occur and the walk continues. The error type exists for the places
//! where a `Result` is the honest signature anyway:
//!
//! 1. **Graph construction**: registering types and instantiating
//!    composites can fail (duplicate type, unknown parent, wrong field
//!    count), and those failures are returned, not logged away.
//! 2. **The collaborator boundary**: [`crate::lazy::LazySource`]
//!    implementations report materialization and substitute-extraction
//!    failures through this type, and the engine converts them into
//!    per-slot diagnostics.
//!
//! All variants are `Clone`, so collaborator errors can be stored or
//! re-reported without borrowing trouble.

use std::fmt;

/// A specialized `Result` type for Sever operations.
pub type Result<T> = std::result::Result<T, SeverError>;

/// The master error enum covering all failure domains in Sever.
///
/// Traversal-time variants (`Access`, `Substitute`, `Materialize`) are
/// caught inside the engine and surface only as log lines; construction-time
/// variants (`Registry`) are returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeverError {
    /// A slot could not be read or written: the backing object was already
    /// borrowed, or the slot is frozen and a rewrite was required.
    Access(String),

    /// A lazy single-valued reference could not yield a fetch-free
    /// substitute. Reported by [`crate::lazy::LazySource::try_substitute`]
    /// implementations.
    Substitute(String),

    /// An initialized lazy collection could not be materialized, or its
    /// materialized shape did not match its declared container kind.
    Materialize(String),

    /// Type registration or composite construction failure: duplicate type
    /// name, unknown ancestor, field arity mismatch, unknown field.
    Registry(String),

    /// Logic error in the engine itself. Should not occur; please report
    /// with a reproduction case.
    Internal(String),
}

impl fmt::Display for SeverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access(s) => write!(f, "access failure: {s}"),
            Self::Substitute(s) => write!(f, "substitute extraction failure: {s}"),
            Self::Materialize(s) => write!(f, "materialization failure: {s}"),
            Self::Registry(s) => write!(f, "registry error: {s}"),
            Self::Internal(s) => write!(f, "internal logic error: {s}"),
        }
    }
}

impl std::error::Error for SeverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_by_domain() {
        let e = SeverError::Access("frozen slot billing.Invoice.total".into());
        assert!(e.to_string().starts_with("access failure:"));
        let e = SeverError::Registry("duplicate type shop.Order".into());
        assert!(e.to_string().contains("duplicate type"));
    }
}
