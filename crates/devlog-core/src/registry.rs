//! Bounded store of exception chains addressable by a short identifier.
//!
//! The identifier is derived from the call-frame shape of the chain head, so
//! the same failure logged repeatedly from the same code path maps to the
//! same key and overwrites its previous entry instead of growing the store.
//!
//! # Eviction
//!
//! Once more than [`MAX_ENTRIES`] identifiers are resident, the identifier
//! that was *first* inserted earliest is evicted. Overwriting an existing
//! identifier replaces its chain but keeps its original position in the
//! eviction order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::exception::ExceptionInfo;
use crate::logging::{targets, trace};

/// Default capacity of a registry.
pub const MAX_ENTRIES: usize = 1000;

/// Deterministic identifier for an exception chain head.
///
/// Combines the hash of every frame, starting from 1, the same way for every
/// process, and renders the 32-bit result as an unsigned decimal.
#[must_use]
pub fn exception_id(exception: &ExceptionInfo) -> String {
    exception
        .frames
        .iter()
        .fold(1u32, |h, frame| h.wrapping_mul(31).wrapping_add(frame.shape_hash()))
        .to_string()
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, Arc<ExceptionInfo>>,
    order: VecDeque<String>,
}

/// Thread-safe, bounded exception registry.
///
/// Intended to be created once and shared (`Arc`) between the formatter that
/// registers chains and whatever serves lookups.
#[derive(Debug)]
pub struct ExceptionRegistry {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl Default for ExceptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExceptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES)
    }

    /// A registry holding at most `capacity` identifiers (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Store `exception` and return its identifier.
    pub fn register(&self, exception: Arc<ExceptionInfo>) -> String {
        let id = exception_id(&exception);
        let mut evicted = Vec::new();
        {
            let mut entries = self.lock();
            if entries.by_id.insert(id.clone(), exception).is_none() {
                entries.order.push_back(id.clone());
            }
            while entries.by_id.len() > self.capacity {
                let Some(oldest) = entries.order.pop_front() else {
                    break;
                };
                entries.by_id.remove(&oldest);
                evicted.push(oldest);
            }
        }
        for oldest in evicted {
            trace!(target: targets::REGISTRY, "evicted exception {oldest}");
        }
        id
    }

    /// The chain registered under `id`, unless it was evicted.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<Arc<ExceptionInfo>> {
        self.lock().by_id.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.by_id.clear();
        entries.order.clear();
    }
}
