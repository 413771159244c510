//! Async usage examples

use esox_bufferpool::{BytePool, PoolConfiguration};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("esox_bufferpool=debug")
        .with_target(false)
        .init();

    println!("=== EsoxSolutions.BufferPool - Async Examples ===\n");

    let pool = BytePool::new(PoolConfiguration::new().with_name("async-demo")).unwrap();

    // Example 1: Acquire and release
    acquire_release(&pool).await;

    // Example 2: RAII guard
    guarded(&pool).await;

    // Example 3: Concurrent access
    concurrent_access(&pool).await;
}

async fn acquire_release(pool: &BytePool) {
    println!("1. Acquire and Release:");

    let mut block = pool.acquire().await;
    block[..4].copy_from_slice(b"ping");
    println!("   Got block of {} bytes", block.len());
    pool.release(block).await;

    println!("   Idle after return: {}\n", pool.idle_count().await);
}

async fn guarded(pool: &BytePool) {
    println!("2. RAII Guard:");

    {
        let block = pool.acquire_guard().await;
        println!("   Guard holds {} bytes", block.len());
        // Returned automatically here
    }

    println!("   Idle after guard dropped: {}\n", pool.idle_count().await);
}

async fn concurrent_access(pool: &BytePool) {
    println!("3. Concurrent Access:");

    let mut handles = vec![];

    for i in 0..10 {
        let pool = pool.clone();
        let handle = tokio::spawn(async move {
            let block = pool.acquire().await;
            println!("   Task {} got block", i);
            sleep(Duration::from_millis(50)).await;
            pool.release(block).await;
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let metrics = pool.metrics().await;
    println!(
        "   Allocated: {}, acquired: {}, idle: {}",
        metrics.total_allocated, metrics.total_acquired, metrics.idle_resources
    );
}
