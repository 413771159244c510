//! Resource kinds the pool can recycle

use crossbeam::queue::ArrayQueue;
use std::fmt;

/// A fixed-capacity resource that a [`RecyclingPool`](crate::RecyclingPool) can hand out and take back.
///
/// Capacity is decided once in [`allocate`](Recyclable::allocate) and never changes afterwards.
pub trait Recyclable: Send + Sized + 'static {
    /// Create a fresh resource with the given capacity.
    fn allocate(block_size: usize) -> Self;

    /// Prepare a returned resource for its next handout.
    ///
    /// Returns how many residual items were discarded.
    fn recycle(&mut self) -> usize;

    /// Capacity counted towards the freed total when this resource is evicted.
    ///
    /// This is the `block_size` the resource was created with.
    fn footprint(&self) -> usize;
}

/// Raw byte blocks.
///
/// Returned blocks are **not** zeroed: an acquired block holds whatever the
/// previous user left in it, so overwrite before reading.
impl Recyclable for Vec<u8> {
    fn allocate(block_size: usize) -> Self {
        vec![0u8; block_size]
    }

    fn recycle(&mut self) -> usize {
        0
    }

    fn footprint(&self) -> usize {
        self.capacity()
    }
}

/// A bounded FIFO queue of byte blocks.
///
/// Pushing into a full queue hands the block back instead of waiting. When a
/// queue is released to its pool any blocks still queued are discarded, so an
/// acquired queue is always empty.
///
/// # Examples
///
/// ```
/// use esox_bufferpool::{BlockQueue, Recyclable};
///
/// let queue = BlockQueue::allocate(2);
/// assert!(queue.push(vec![1]).is_ok());
/// assert!(queue.push(vec![2]).is_ok());
/// assert_eq!(queue.push(vec![3]), Err(vec![3]));
/// assert_eq!(queue.pop(), Some(vec![1]));
/// ```
pub struct BlockQueue {
    inner: ArrayQueue<Vec<u8>>,
}

impl BlockQueue {
    /// Create a queue holding at most `capacity` blocks (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Enqueue a block, or give it back if the queue is full.
    pub fn push(&self, block: Vec<u8>) -> Result<(), Vec<u8>> {
        self.inner.push(block)
    }

    /// Dequeue the oldest block.
    pub fn pop(&self) -> Option<Vec<u8>> {
        self.inner.pop()
    }

    /// Number of queued blocks.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    /// Maximum number of queued blocks.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Discard every queued block, returning how many were dropped.
    pub fn drain(&self) -> usize {
        let mut dropped = 0;
        while self.inner.pop().is_some() {
            dropped += 1;
        }
        dropped
    }
}

impl fmt::Debug for BlockQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Recyclable for BlockQueue {
    fn allocate(block_size: usize) -> Self {
        Self::with_capacity(block_size)
    }

    fn recycle(&mut self) -> usize {
        self.drain()
    }

    fn footprint(&self) -> usize {
        self.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_block_has_fixed_length() {
        let block = <Vec<u8> as Recyclable>::allocate(4096);
        assert_eq!(block.len(), 4096);
        assert!(block.footprint() >= 4096);
    }

    #[test]
    fn test_raw_block_recycle_keeps_content() {
        let mut block = <Vec<u8> as Recyclable>::allocate(4);
        block.copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(block.recycle(), 0);
        assert_eq!(block, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_queue_is_fifo_and_bounded() {
        let queue = BlockQueue::allocate(3);
        for i in 0..3u8 {
            queue.push(vec![i]).unwrap();
        }
        assert!(queue.is_full());
        assert_eq!(queue.push(vec![9]), Err(vec![9]));
        assert_eq!(queue.pop(), Some(vec![0]));
        assert_eq!(queue.pop(), Some(vec![1]));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_recycle_drains_residue() {
        let mut queue = BlockQueue::allocate(8);
        queue.push(vec![1; 16]).unwrap();
        queue.push(vec![2; 16]).unwrap();
        queue.push(vec![3; 16]).unwrap();

        assert_eq!(queue.recycle(), 3);
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 8);
    }

    #[test]
    fn test_queue_footprint_is_its_block_size() {
        let queue = BlockQueue::allocate(4096);
        queue.push(vec![0u8; 64]).unwrap();
        assert_eq!(queue.footprint(), 4096);
    }

    #[test]
    fn test_zero_capacity_queue_is_clamped() {
        let queue = BlockQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
    }
}
