//! Thread registry
//!
//! Process-wide mapping from engine identity to thread metadata. All reads
//! and mutations happen under one mutex, held only for the map operation
//! itself and never across a capture. Entries are removed by the engine's
//! teardown hook, installed on first registration.
//!
//! Registration is asymmetric, inherited from the original behavior rather
//! than deliberate design: the first call for a handle only establishes the
//! display name; the second and later calls overwrite the name and refresh
//! the last-seen timestamp. Records never heartbeated are excluded from
//! staleness reporting.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use periscope_engine::{EngineContext, EngineId};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Metadata for one registered thread.
struct ThreadRecord {
    /// Display name, overwritten on every registration
    name: String,

    /// Weak handle to the owning engine; the registry never keeps one alive
    engine: Weak<EngineContext>,

    /// Unset until the second registration call for this handle
    last_seen: Option<Instant>,
}

/// Process-wide registry of live engine contexts.
pub struct ThreadRegistry {
    records: Mutex<FxHashMap<EngineId, ThreadRecord>>,
}

static GLOBAL: Lazy<Arc<ThreadRegistry>> = Lazy::new(|| Arc::new(ThreadRegistry::new()));

impl ThreadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(FxHashMap::default()),
        }
    }

    /// The process-wide registry instance.
    pub fn global() -> &'static Arc<ThreadRegistry> {
        &GLOBAL
    }

    /// Register or heartbeat the given engine under `name`.
    ///
    /// First call for a handle inserts a record with no last-seen timestamp
    /// and arranges removal at engine teardown; each later call overwrites
    /// the name and refreshes the timestamp.
    pub fn register(self: &Arc<Self>, engine: &Arc<EngineContext>, name: &str) {
        let inserted = {
            let mut records = self.records.lock();
            match records.entry(engine.id()) {
                Entry::Occupied(mut occupied) => {
                    let record = occupied.get_mut();
                    record.name = name.to_owned();
                    record.last_seen = Some(Instant::now());
                    false
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(ThreadRecord {
                        name: name.to_owned(),
                        engine: Arc::downgrade(engine),
                        last_seen: None,
                    });
                    true
                }
            }
        };

        if inserted {
            tracing::debug!(engine = ?engine.id(), name, "thread registered");
            let registry = Arc::downgrade(self);
            engine.on_teardown(move |id| {
                if let Some(registry) = registry.upgrade() {
                    registry.remove(id);
                }
            });
        } else {
            tracing::trace!(engine = ?engine.id(), name, "thread heartbeat");
        }
    }

    /// Erase the record for `id`. Idempotent; invoked by teardown hooks.
    pub fn remove(&self, id: EngineId) {
        if self.records.lock().remove(&id).is_some() {
            tracing::debug!(engine = ?id, "thread removed from registry");
        }
    }

    /// All current records except `exclude`, with names copied out so the
    /// lock need not be held during capture.
    pub fn snapshot_except(&self, exclude: EngineId) -> Vec<(Weak<EngineContext>, String)> {
        let records = self.records.lock();
        records
            .iter()
            .filter(|(id, _)| **id != exclude)
            .map(|(_, record)| (record.engine.clone(), record.name.clone()))
            .collect()
    }

    /// Milliseconds since last heartbeat, keyed by display name.
    ///
    /// Records that were never heartbeated are omitted entirely.
    pub fn staleness(&self, now: Instant) -> HashMap<String, u64> {
        let records = self.records.lock();
        records
            .values()
            .filter_map(|record| {
                let seen = record.last_seen?;
                Some((record.name.clone(), now.duration_since(seen).as_millis() as u64))
            })
            .collect()
    }

    /// Number of registered threads.
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}
