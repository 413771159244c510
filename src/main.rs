// EsoxSolutions.BufferPool - Rust
// Non-blocking recycling pool for fixed-size buffers

// This is just a binary wrapper - the actual library is in lib.rs
// Run examples with: cargo run --example basic

use esox_bufferpool::{byte_pool, queue_pool};

fn main() {
    println!("=== EsoxSolutions.BufferPool v{} ===", env!("CARGO_PKG_VERSION"));
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    // Quick demo
    println!("Quick Demo:");
    let pool = byte_pool();

    let mut block = pool.acquire_blocking();
    block[..5].copy_from_slice(b"hello");
    println!("  Got block of {} bytes", block.len());
    pool.release_blocking(block);

    let queues = queue_pool();
    let queue = queues.acquire_blocking();
    if queue.push(b"frame".to_vec()).is_err() {
        println!("  Queue unexpectedly full");
    }
    println!("  Got queue with room for {} blocks, {} queued", queue.capacity(), queue.len());
    queues.release_blocking(queue);

    let reused = queues.acquire_blocking();
    println!("  Reused queue is empty: {}", reused.is_empty());
}
