//! Idle tracking and age-based eviction for pooled resources

use crate::resource::Recyclable;

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// An idle resource together with the moment it last entered the pool.
#[derive(Debug)]
pub(crate) struct PoolEntry<R> {
    pub resource: R,
    pub last_used_at: Instant,
}

impl<R> PoolEntry<R> {
    pub fn new(resource: R, now: Instant) -> Self {
        Self {
            resource,
            last_used_at: now,
        }
    }

    pub fn is_idle_longer_than(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_used_at) > idle_timeout
    }
}

/// Outcome of one eviction sweep
///
/// # Examples
///
/// ```
/// use esox_bufferpool::{BytePool, PoolConfiguration};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let pool = BytePool::new(PoolConfiguration::default()).unwrap();
///     let block = pool.acquire().await;
///     pool.release(block).await;
///
///     // Nothing has been idle for five minutes yet.
///     let report = pool.sweep().await;
///     assert_eq!(report.evicted, 0);
///     assert_eq!(report.remaining, 1);
/// });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed from the free list
    pub evicted: usize,

    /// Bytes of capacity released by the removed entries
    pub freed_bytes: usize,

    /// Entries still idle after the sweep
    pub remaining: usize,

    /// Whether the OS reclaim hint was issued
    pub reclaimed: bool,
}

/// Idle resources ordered oldest first.
///
/// Entries go in at the back and leave from the front, so `last_used_at`
/// never decreases from front to back. The sweep relies on that to stop at
/// the first fresh entry.
pub(crate) struct FreeList<R> {
    entries: VecDeque<PoolEntry<R>>,
}

impl<R: Recyclable> FreeList<R> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a resource as the freshest idle entry.
    pub fn push_back(&mut self, resource: R, now: Instant) {
        self.entries.push_back(PoolEntry::new(resource, now));
    }

    /// Take the oldest idle entry.
    pub fn pop_front(&mut self) -> Option<PoolEntry<R>> {
        self.entries.pop_front()
    }

    /// Put back an entry that was just popped and could not be delivered.
    pub fn restore_front(&mut self, entry: PoolEntry<R>) {
        self.entries.push_front(entry);
    }

    /// Drop entries from the front while they have been idle longer than
    /// `idle_timeout`. Returns the evicted count and the bytes they held.
    pub fn evict_idle(&mut self, now: Instant, idle_timeout: Duration) -> (usize, usize) {
        let mut evicted = 0;
        let mut freed_bytes = 0;

        while let Some(front) = self.entries.front() {
            if !front.is_idle_longer_than(now, idle_timeout) {
                break;
            }
            if let Some(entry) = self.entries.pop_front() {
                freed_bytes += entry.resource.footprint();
                evicted += 1;
            }
        }

        (evicted, freed_bytes)
    }
}
