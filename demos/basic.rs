//! Basic usage examples for the buffer pools

use esox_bufferpool::{byte_pool, queue_pool, BytePool, PoolConfiguration};

fn main() {
    println!("=== EsoxSolutions.BufferPool - Basic Examples ===\n");

    // Example 1: Global byte pool from plain threads
    global_byte_pool();

    // Example 2: Dedicated pool with configuration
    configured_pool();

    // Example 3: Queue pool drains residue
    queue_recycling();
}

fn global_byte_pool() {
    println!("1. Global Byte Pool:");
    let pool = byte_pool();

    let workers: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut block = pool.acquire_blocking();
                // Contents are left over from the previous user; overwrite first.
                block.fill(i as u8);
                println!("   Thread {} got {} bytes", i, block.len());
                pool.release_blocking(block);
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    println!();
}

fn configured_pool() {
    println!("2. Configured Pool:");

    let config = PoolConfiguration::new()
        .with_name("frames")
        .with_block_size(64 * 1024);

    let pool = BytePool::spawn_dedicated(config).unwrap();

    let first = pool.acquire_blocking();
    let second = pool.acquire_blocking();
    println!("   Block sizes: {} and {}", first.len(), second.len());
    pool.release_blocking(first);
    pool.release_blocking(second);

    pool.set_buffer_size(128 * 1024);
    println!("   New blocks will be {} bytes\n", pool.block_size());
}

fn queue_recycling() {
    println!("3. Queue Recycling:");
    let pool = queue_pool();

    let queue = pool.acquire_blocking();
    for i in 0..3u8 {
        let _ = queue.push(vec![i; 16]);
    }
    println!("   Queued {} blocks before release", queue.len());
    pool.release_blocking(queue);

    let queue = pool.acquire_blocking();
    println!("   Reacquired queue holds {} blocks", queue.len());
    pool.release_blocking(queue);
}
