//! Advanced features: eviction, OS reclaim, metrics export

use esox_bufferpool::{BytePool, MetricsExporter, PoolConfiguration, QueuePool};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("esox_bufferpool=trace")
        .with_target(false)
        .init();

    println!("=== EsoxSolutions.BufferPool - Advanced Features ===\n");

    // Example 1: Idle eviction and OS reclaim
    eviction_and_reclaim().await;

    // Example 2: Queue pool
    queue_pool().await;

    // Example 3: Prometheus metrics
    prometheus_export().await;
}

async fn eviction_and_reclaim() {
    println!("1. Eviction and Reclaim:");

    let reclaims = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reclaims);

    let config = PoolConfiguration::new()
        .with_name("short-lived")
        .with_block_size(1024 * 1024)
        .with_idle_timeout(Duration::from_millis(200))
        .with_sweep_interval(Duration::from_millis(100))
        .with_reclaim_threshold(2 * 1024 * 1024)
        .with_reclaimer(move || {
            counter.fetch_add(1, Ordering::Relaxed);
            esox_bufferpool::reclaim::release_to_os();
        });

    let pool = BytePool::new(config).unwrap();

    let blocks: Vec<_> = acquire_many(&pool, 4).await;
    for block in blocks {
        pool.release(block).await;
    }
    println!("   Idle before eviction: {}", pool.idle_count().await);

    tokio::time::sleep(Duration::from_millis(500)).await;

    let metrics = pool.metrics().await;
    println!("   Idle after eviction: {}", metrics.idle_resources);
    println!("   Evicted bytes: {}", metrics.evicted_bytes);
    println!("   Reclaim hints: {}\n", reclaims.load(Ordering::Relaxed));
}

async fn acquire_many(pool: &BytePool, count: usize) -> Vec<Vec<u8>> {
    let mut blocks = Vec::with_capacity(count);
    for _ in 0..count {
        blocks.push(pool.acquire().await);
    }
    blocks
}

async fn queue_pool() {
    println!("2. Queue Pool:");

    let pool = QueuePool::new(PoolConfiguration::new().with_name("queues").with_block_size(4)).unwrap();

    let queue = pool.acquire().await;
    for i in 0..6u8 {
        match queue.push(vec![i; 8]) {
            Ok(()) => println!("   Queued block {}", i),
            Err(_) => println!("   Queue full, block {} rejected", i),
        }
    }
    pool.release(queue).await;

    let queue = pool.acquire().await;
    println!("   Reacquired queue is empty: {}", queue.is_empty());
    println!("   Residual blocks drained: {}\n", pool.metrics().await.residual_items_drained);
}

async fn prometheus_export() {
    println!("3. Prometheus Metrics:");

    let pool = BytePool::new(PoolConfiguration::new().with_name("io")).unwrap();

    for _ in 0..3 {
        let block = pool.acquire().await;
        pool.release(block).await;
    }

    let mut tags = HashMap::new();
    tags.insert("service".to_string(), "gateway".to_string());

    let metrics = pool.metrics().await;
    let output = MetricsExporter::export_prometheus(&metrics, pool.name(), Some(&tags));
    for line in output.lines().filter(|l| !l.starts_with('#')) {
        println!("   {}", line);
    }
}
