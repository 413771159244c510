//! Process-wide pools, one per resource kind
//!
//! Each global pool runs on its own worker thread and lives until the process
//! exits. The first call decides the configuration; later configurations are
//! ignored. Prefer passing an explicitly constructed [`RecyclingPool`] around
//! where that is practical.

use crate::config::PoolConfiguration;
use crate::pool::{BytePool, QueuePool, RecyclingPool};
use crate::resource::Recyclable;

use std::sync::OnceLock;
use tracing::debug;

static BYTE_POOL: OnceLock<BytePool> = OnceLock::new();
static QUEUE_POOL: OnceLock<QueuePool> = OnceLock::new();

/// Get the global byte block pool, starting it with defaults if needed.
///
/// # Panics
///
/// Panics if the worker thread cannot be started.
pub fn byte_pool() -> &'static BytePool {
    byte_pool_with(PoolConfiguration::new().with_name("byte-pool"))
}

/// Get the global byte block pool, starting it with `config` if this is the first call.
///
/// # Examples
///
/// ```
/// use esox_bufferpool::{byte_pool, byte_pool_with, PoolConfiguration};
///
/// let pool = byte_pool_with(PoolConfiguration::new().with_block_size(2048));
/// assert!(std::ptr::eq(pool, byte_pool()));
///
/// let block = pool.acquire_blocking();
/// assert_eq!(block.len(), pool.block_size());
/// pool.release_blocking(block);
/// ```
///
/// # Panics
///
/// Panics if the worker thread cannot be started.
pub fn byte_pool_with(config: PoolConfiguration) -> &'static BytePool {
    BYTE_POOL.get_or_init(|| start_global(config))
}

/// Get the global block queue pool, starting it with defaults if needed.
///
/// # Panics
///
/// Panics if the worker thread cannot be started.
pub fn queue_pool() -> &'static QueuePool {
    queue_pool_with(PoolConfiguration::new().with_name("queue-pool"))
}

/// Get the global block queue pool, starting it with `config` if this is the first call.
///
/// # Panics
///
/// Panics if the worker thread cannot be started.
pub fn queue_pool_with(config: PoolConfiguration) -> &'static QueuePool {
    QUEUE_POOL.get_or_init(|| start_global(config))
}

fn start_global<R: Recyclable>(config: PoolConfiguration) -> RecyclingPool<R> {
    debug!(pool = %config.name, block_size = config.block_size, "starting global pool");
    RecyclingPool::spawn_dedicated(config)
        .unwrap_or_else(|err| panic!("failed to start global buffer pool: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_pool_is_a_singleton_and_first_config_wins() {
        let first = queue_pool_with(PoolConfiguration::new().with_block_size(32).with_name("queues"));
        let second = queue_pool_with(PoolConfiguration::new().with_block_size(64));
        let third = queue_pool();

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, third));
        assert_eq!(third.block_size(), 32);
        assert_eq!(third.name(), "queues");
    }

    #[test]
    fn test_byte_pool_is_usable_from_threads() {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    let pool = byte_pool();
                    let block = pool.acquire_blocking();
                    assert_eq!(block.len(), pool.block_size());
                    pool.release_blocking(block);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
    }
}
