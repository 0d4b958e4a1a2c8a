//! Reference-counted sample buffer shared between the mock stream and its consumers.
//!
//! The producer takes the write lock once per frame; consumers are expected to take
//! the read lock for inspection or the write lock to drain. Nothing here enforces a
//! capacity: the bound is applied by whoever appends.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Sample;

/// Cloneable handle to a lock-protected, ordered sample queue.
///
/// Clones share the same storage, so handing one to a consumer never copies samples.
pub struct SharedBuffer<T = Sample> {
    samples: Arc<RwLock<VecDeque<T>>>,
}

impl<T> SharedBuffer<T> {
    pub fn new() -> Self {
        Self {
            samples: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Exclusive access for appending, evicting or draining.
    pub fn write(&self) -> RwLockWriteGuard<'_, VecDeque<T>> {
        self.samples.write()
    }

    /// Exclusive access only if nobody else holds the lock right now.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, VecDeque<T>>> {
        self.samples.try_write()
    }

    /// Shared access for readers that do not consume.
    pub fn read(&self) -> RwLockReadGuard<'_, VecDeque<T>> {
        self.samples.read()
    }

    pub fn push_back(&self, sample: T) {
        self.samples.write().push_back(sample);
    }

    pub fn pop_front(&self) -> Option<T> {
        self.samples.write().pop_front()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    /// Remove and return everything currently buffered, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.samples.write().drain(..).collect()
    }

    pub fn clear(&self) {
        self.samples.write().clear();
    }

    /// Number of live handles to this buffer (producer and consumers).
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.samples)
    }
}

impl<T: Clone> SharedBuffer<T> {
    /// Copy of the buffered samples, oldest first, under the read lock.
    pub fn snapshot(&self) -> Vec<T> {
        self.samples.read().iter().cloned().collect()
    }
}

impl<T> Clone for SharedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            samples: Arc::clone(&self.samples),
        }
    }
}

impl<T> Default for SharedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SharedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .field("handles", &self.handle_count())
            .finish()
    }
}
