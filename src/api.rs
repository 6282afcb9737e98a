//! The main entry point for detaching a graph.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use crate::constants::{DEFAULT_DEPTH_LIMIT, SLOW_DETACH_MILLIS};
use crate::engine::Session;
use crate::graph::Value;
use crate::lazy::LazySource;

/// How composite state is read and rewritten during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Direct slot access, for serializers that read state directly.
    Field,
    /// Accessor-pair access, for marshallers that honor accessor-level
    /// transience markers.
    Property,
}

/// The caller-supplied "owned domain type" predicate.
///
/// Composites whose type name the filter does not own are left in place
/// without recursion; containers and placeholders are always processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DomainFilter {
    /// Every composite is considered domain-owned.
    #[default]
    Any,
    /// Only composites whose namespaced type name starts with one of these
    /// prefixes are recursed into.
    Prefixes(Vec<String>),
}

impl DomainFilter {
    /// Whether a composite of this type belongs to the caller's domain.
    pub fn owns(&self, type_name: &str) -> bool {
        match self {
            DomainFilter::Any => true,
            DomainFilter::Prefixes(prefixes) => {
                prefixes.iter().any(|p| type_name.starts_with(p.as_str()))
            }
        }
    }
}

/// Configuration for one detachment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachConfig {
    /// The traversal strategy.
    pub mode: AccessMode,
    /// Hard recursion ceiling; branches deeper than this are abandoned
    /// with a warning, the rest of the walk continues.
    pub depth_limit: usize,
    /// The domain-ownership predicate bounding composite recursion.
    pub domain: DomainFilter,
}

impl DetachConfig {
    /// A config with the given mode and all other settings at default.
    pub fn new(mode: AccessMode) -> Self {
        Self {
            mode,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            domain: DomainFilter::Any,
        }
    }
}

impl Default for DetachConfig {
    fn default() -> Self {
        Self::new(AccessMode::Field)
    }
}

/// The detachment entry point.
#[derive(Debug)]
pub struct Sever;

impl Sever {
    /// Rewrites the graph reachable from `root` so that no remaining slot
    /// can trigger a fetch: lazy placeholders become plain snapshots,
    /// substitutes, or null.
    ///
    /// Mutates in place and never returns an error: every failure is
    /// caught, logged, and the call returns having made a best-effort
    /// partial detachment. Callers that need a zero-placeholder guarantee
    /// re-check with [`crate::inspector::SeverInspector::audit`].
    pub fn detach(root: &mut Value, source: &dyn LazySource, mode: AccessMode) {
        Self::detach_with_config(root, source, &DetachConfig::new(mode));
    }

    /// [`Sever::detach`] with an explicit configuration.
    pub fn detach_with_config(root: &mut Value, source: &dyn LazySource, config: &DetachConfig) {
        let start = Instant::now();
        let mut session = Session::new(source, config);

        // The engine itself reports failures in place of raising them; the
        // unwind guard covers a misbehaving collaborator.
        let outcome = catch_unwind(AssertUnwindSafe(|| session.run(root)));

        let elapsed = start.elapsed().as_millis();
        match outcome {
            Ok(visited) => {
                if elapsed > SLOW_DETACH_MILLIS {
                    log::info!("detached [{visited}] objects in [{elapsed}]ms");
                } else {
                    log::debug!("detached [{visited}] objects in [{elapsed}]ms");
                }
            }
            Err(panic) => {
                let msg = panic
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                log::error!(
                    "detachment aborted after {elapsed}ms ({msg}); graph may be partially detached"
                );
            }
        }
    }
}
