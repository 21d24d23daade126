//! Opaque `u64` handles for host objects referenced from native code.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::call::raise;
use crate::error::{InternalError, InternalResult};

/// Thread-safe map from handle to object.
///
/// Handles come from a counter starting at 1, so `0` is never issued and a handle is never
/// reused while the process lives. Native callbacks may insert, look up and remove entries
/// from any thread.
#[derive(Debug)]
pub struct HandleMap<T> {
    entries: Mutex<HashMap<u64, T>>,
    next_handle: AtomicU64,
}

impl<T> HandleMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u64, T>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, obj: T) -> u64 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.entries().insert(handle, obj);
        handle
    }

    pub fn try_remove(&self, handle: u64) -> InternalResult<T> {
        self.entries().remove(&handle).ok_or(InternalError::MissingHandle(handle))
    }

    /// Removes an entry. A missing handle is a lifecycle bug and raises.
    pub fn remove(&self, handle: u64) -> T {
        self.try_remove(handle).unwrap_or_else(|e| raise(e))
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.entries().contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> HandleMap<T> {
    pub fn try_get(&self, handle: u64) -> InternalResult<T> {
        self.entries().get(&handle).cloned().ok_or(InternalError::MissingHandle(handle))
    }

    /// Looks up an entry. A missing handle is a lifecycle bug and raises.
    pub fn get(&self, handle: u64) -> T {
        self.try_get(handle).unwrap_or_else(|e| raise(e))
    }
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "handle_map_tests.rs"]
mod handle_map_tests;
