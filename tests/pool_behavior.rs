use esox_bufferpool::{
    BytePool, MetricsExporter, PoolConfiguration, PoolError, QueuePool, Recyclable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_block_lifecycle_with_default_timings() {
    let pool = BytePool::new(PoolConfiguration::new().with_block_size(4096)).unwrap();

    let block = pool.acquire().await;
    assert_eq!(block.len(), 4096);
    pool.release(block).await;
    assert_eq!(pool.idle_count().await, 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    pool.sweep().await;
    assert_eq!(pool.idle_count().await, 1);

    tokio::time::advance(Duration::from_secs(300)).await;
    pool.sweep().await;
    assert_eq!(pool.idle_count().await, 0);

    // An emptied pool still serves requests immediately.
    let block = pool.acquire().await;
    assert_eq!(block.len(), 4096);
    assert_eq!(pool.metrics().await.total_allocated, 2);
}

#[tokio::test(start_paused = true)]
async fn test_reacquired_queue_reports_empty() {
    let pool = QueuePool::new(PoolConfiguration::new().with_block_size(16)).unwrap();

    let queue = pool.acquire().await;
    for i in 0..3u8 {
        queue.push(vec![i; 8]).unwrap();
    }
    assert_eq!(queue.len(), 3);
    pool.release(queue).await;

    let queue = pool.acquire().await;
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), 16);
    assert_eq!(pool.metrics().await.total_allocated, 1);
}

#[tokio::test(start_paused = true)]
async fn test_raw_blocks_keep_previous_content() {
    let pool = BytePool::new(PoolConfiguration::new().with_block_size(8)).unwrap();

    let mut block = pool.acquire().await;
    block.copy_from_slice(b"leftover");
    pool.release(block).await;

    let block = pool.acquire().await;
    assert_eq!(&block[..], b"leftover");
}

#[tokio::test(start_paused = true)]
async fn test_free_list_is_served_oldest_first() {
    let pool = BytePool::new(PoolConfiguration::new().with_block_size(1)).unwrap();

    let mut a = pool.acquire().await;
    let mut b = pool.acquire().await;
    a[0] = b'a';
    b[0] = b'b';
    pool.release(a).await;
    pool.release(b).await;

    assert_eq!(pool.acquire().await[0], b'a');
    assert_eq!(pool.acquire().await[0], b'b');
}

#[tokio::test(start_paused = true)]
async fn test_custom_kind_is_recycled() {
    struct Scratch {
        words: Vec<u64>,
        resets: usize,
    }

    impl Recyclable for Scratch {
        fn allocate(block_size: usize) -> Self {
            Self { words: Vec::with_capacity(block_size), resets: 0 }
        }

        fn recycle(&mut self) -> usize {
            let residue = self.words.len();
            self.words.clear();
            self.resets += 1;
            residue
        }

        fn footprint(&self) -> usize {
            self.words.capacity() * std::mem::size_of::<u64>()
        }
    }

    let pool = esox_bufferpool::RecyclingPool::<Scratch>::new(
        PoolConfiguration::new().with_block_size(32),
    )
    .unwrap();

    let mut scratch = pool.acquire().await;
    scratch.words.extend([1, 2, 3, 4]);
    pool.release(scratch).await;

    let scratch = pool.acquire().await;
    assert!(scratch.words.is_empty());
    assert_eq!(scratch.resets, 1);
    assert_eq!(pool.metrics().await.residual_items_drained, 4);
}

#[tokio::test(start_paused = true)]
async fn test_metrics_export_reflects_activity() {
    let reclaims = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reclaims);
    let config = PoolConfiguration::new()
        .with_name("export")
        .with_block_size(512)
        .with_reclaim_threshold(0)
        .with_sweep_interval(Duration::from_secs(3600))
        .with_reclaimer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    let pool = BytePool::new(config).unwrap();

    let block = pool.acquire().await;
    pool.release(block).await;
    pool.idle_count().await;
    tokio::time::advance(Duration::from_secs(301)).await;
    let report = pool.sweep().await;
    assert!(report.reclaimed);
    assert_eq!(reclaims.load(Ordering::SeqCst), 1);

    let metrics = pool.metrics().await;
    let exported = metrics.export();
    assert_eq!(exported["total_evicted"], "1");
    assert_eq!(exported["evicted_bytes"], "512");
    assert_eq!(exported["reclaim_hints"], "1");

    let text = MetricsExporter::export_prometheus(&metrics, pool.name(), None);
    assert!(text.contains("bufferpool_resources_evicted_total{pool=\"export\"} 1"));
}

#[tokio::test]
async fn test_invalid_configuration_is_reported() {
    let result = QueuePool::new(PoolConfiguration::new().with_sweep_interval(Duration::ZERO));
    assert!(matches!(result, Err(PoolError::InvalidConfiguration(_))));
}
