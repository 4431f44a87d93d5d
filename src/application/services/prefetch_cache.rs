//! Bounded FIFO of prefetched images.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::domain::entities::ImageItem;

/// Default number of images kept ready.
pub const DEFAULT_CACHE_SIZE: usize = 50;

/// Bounded queue of ready-to-send images.
///
/// Push and pop are atomic with respect to each other. The queue never holds
/// more than `capacity` items; pushes into a full queue are refused.
#[derive(Debug)]
pub struct PrefetchCache {
    items: Mutex<VecDeque<ImageItem>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PrefetchCache {
    /// Creates a cache holding at most `capacity` images.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if no image is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Returns how many images would top the cache up.
    #[must_use]
    pub fn needed(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Appends an image. Returns `false` and drops it if the cache is full.
    pub fn push(&self, item: ImageItem) -> bool {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            trace!(url = %item, "Prefetch cache full, dropping image");
            return false;
        }
        items.push_back(item);
        true
    }

    /// Removes and returns the oldest image. Never blocks on the network.
    pub fn try_pop(&self) -> Option<ImageItem> {
        let item = self.items.lock().pop_front();
        if item.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        item
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for PrefetchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Snapshot of prefetch cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Images currently cached.
    pub size: usize,
    /// Maximum images cached.
    pub capacity: usize,
    /// Pops that found an image.
    pub hits: u64,
    /// Pops that found the cache empty.
    pub misses: u64,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Prefetch: {}/{} images ({} hits, {} misses)",
            self.size, self.capacity, self.hits, self.misses
        )
    }
}
