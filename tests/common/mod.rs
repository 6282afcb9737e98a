#![allow(dead_code)]

//! Shared test fixtures: an in-memory persistence stub and a capturing
//! logger for asserting on the engine's diagnostics.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use sever::{
    ContainerKind, LazyCollection, LazyReference, LazySource, LazyToken, Materialized, Result,
    SeverError, Value,
};

// --- PERSISTENCE STUB ---

/// A persistence layer over in-memory tables: tokens registered with
/// contents are initialized, everything else was never fetched.
#[derive(Debug, Default)]
pub struct StubSource {
    initialized: HashSet<u64>,
    collections: HashMap<u64, Materialized>,
    substitutes: HashMap<u64, Value>,
    broken: HashSet<u64>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an initialized sequence/set collection.
    pub fn with_elements(mut self, token: u64, items: Vec<Value>) -> Self {
        self.initialized.insert(token);
        self.collections.insert(token, Materialized::Elements(items));
        self
    }

    /// Registers an initialized mapping.
    pub fn with_pairs(mut self, token: u64, pairs: Vec<(Value, Value)>) -> Self {
        self.initialized.insert(token);
        self.collections.insert(token, Materialized::Pairs(pairs));
        self
    }

    /// Registers a fetch-free substitute for a reference token.
    pub fn with_substitute(mut self, token: u64, value: Value) -> Self {
        self.substitutes.insert(token, value);
        self
    }

    /// Marks a token initialized without contents.
    pub fn mark_initialized(mut self, token: u64) -> Self {
        self.initialized.insert(token);
        self
    }

    /// Makes every collaborator call for this token fail.
    pub fn broken(mut self, token: u64) -> Self {
        self.broken.insert(token);
        self
    }
}

impl LazySource for StubSource {
    fn is_initialized(&self, token: LazyToken) -> bool {
        self.initialized.contains(&token.as_u64())
    }

    fn materialize(&self, token: LazyToken) -> Result<Materialized> {
        if self.broken.contains(&token.as_u64()) {
            return Err(SeverError::Materialize(format!(
                "collection {token} backing store is gone"
            )));
        }
        self.collections
            .get(&token.as_u64())
            .cloned()
            .ok_or_else(|| SeverError::Materialize(format!("collection {token} has no contents")))
    }

    fn try_substitute(&self, token: LazyToken) -> Result<Option<Value>> {
        if self.broken.contains(&token.as_u64()) {
            return Err(SeverError::Substitute(format!(
                "reference {token} cannot build a stand-in"
            )));
        }
        Ok(self.substitutes.get(&token.as_u64()).cloned())
    }
}

// --- VALUE SHORTHANDS ---

pub fn lazy(token: u64, kind: ContainerKind) -> Value {
    Value::LazyCollection(LazyCollection::new(LazyToken::new(token), kind))
}

pub fn proxy(token: u64, entity: &str) -> Value {
    Value::Proxy(LazyReference::new(LazyToken::new(token), entity))
}

// --- CAPTURING LOGGER ---

struct CaptureLogger;

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();
static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Installs the capturing logger once per test binary.
pub fn install_capture_logger() {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Every captured record whose message contains `needle`.
pub fn logged_lines_containing(needle: &str) -> Vec<(Level, String)> {
    RECORDS
        .lock()
        .map(|records| {
            records
                .iter()
                .filter(|(_, message)| message.contains(needle))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}
