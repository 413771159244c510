//! Metrics collection and export for buffer pools

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a pool
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
///     let metrics = pool.metrics().await;
///     assert_eq!(metrics.total_acquired, 1);
///     assert_eq!(metrics.total_released, 1);
///     assert_eq!(metrics.idle_resources, 1);
/// });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Resources currently idle in the free list
    pub idle_resources: usize,

    /// Resources handed out and not yet returned
    pub outstanding_resources: usize,

    /// Total resources created by the pool
    pub total_allocated: usize,

    /// Total resources handed out
    pub total_acquired: usize,

    /// Total resources returned
    pub total_released: usize,

    /// Residual items discarded while recycling returned resources
    pub residual_items_drained: usize,

    /// Total resources evicted for being idle too long
    pub total_evicted: usize,

    /// Total bytes released by eviction
    pub evicted_bytes: usize,

    /// Number of sweeps run
    pub sweeps: usize,

    /// Number of times the OS reclaim hint was issued
    pub reclaim_hints: usize,

    /// Capacity used for newly created resources
    pub block_size: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("idle_resources".to_string(), self.idle_resources.to_string());
        metrics.insert("outstanding_resources".to_string(), self.outstanding_resources.to_string());
        metrics.insert("total_allocated".to_string(), self.total_allocated.to_string());
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("residual_items_drained".to_string(), self.residual_items_drained.to_string());
        metrics.insert("total_evicted".to_string(), self.total_evicted.to_string());
        metrics.insert("evicted_bytes".to_string(), self.evicted_bytes.to_string());
        metrics.insert("sweeps".to_string(), self.sweeps.to_string());
        metrics.insert("reclaim_hints".to_string(), self.reclaim_hints.to_string());
        metrics.insert("block_size".to_string(), self.block_size.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_bufferpool::{MetricsExporter, PoolMetrics};
    /// use std::collections::HashMap;
    ///
    /// let metrics = PoolMetrics { idle_resources: 2, ..Default::default() };
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = MetricsExporter::export_prometheus(&metrics, "io_buffers", Some(&tags));
    /// assert!(output.contains("bufferpool_resources_idle{pool=\"io_buffers\",service=\"api\"} 2"));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let labels = Self::format_labels(pool_name, tags);
        let series: [(&str, &str, &str, usize); 11] = [
            ("bufferpool_resources_idle", "gauge", "Resources idle in the free list", metrics.idle_resources),
            ("bufferpool_resources_outstanding", "gauge", "Resources handed out and not returned", metrics.outstanding_resources),
            ("bufferpool_block_size_bytes", "gauge", "Capacity of newly created resources", metrics.block_size),
            ("bufferpool_resources_allocated_total", "counter", "Resources created", metrics.total_allocated),
            ("bufferpool_resources_acquired_total", "counter", "Resources handed out", metrics.total_acquired),
            ("bufferpool_resources_released_total", "counter", "Resources returned", metrics.total_released),
            ("bufferpool_residual_items_drained_total", "counter", "Residual items discarded on return", metrics.residual_items_drained),
            ("bufferpool_resources_evicted_total", "counter", "Resources evicted as idle", metrics.total_evicted),
            ("bufferpool_evicted_bytes_total", "counter", "Bytes released by eviction", metrics.evicted_bytes),
            ("bufferpool_sweeps_total", "counter", "Eviction sweeps run", metrics.sweeps),
            ("bufferpool_reclaim_hints_total", "counter", "OS memory reclaim hints issued", metrics.reclaim_hints),
        ];

        let mut output = String::new();
        for (name, kind, help, value) in series {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} {}\n", name, kind));
            output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
        }
        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal counters, written by the arbitration loop only
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub total_allocated: AtomicUsize,
    pub total_acquired: AtomicUsize,
    pub total_released: AtomicUsize,
    pub residual_items_drained: AtomicUsize,
    pub total_evicted: AtomicUsize,
    pub evicted_bytes: AtomicUsize,
    pub sweeps: AtomicUsize,
    pub reclaim_hints: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, idle: usize, block_size: usize) -> PoolMetrics {
        let acquired = self.total_acquired.load(Ordering::Relaxed);
        let released = self.total_released.load(Ordering::Relaxed);

        PoolMetrics {
            idle_resources: idle,
            outstanding_resources: acquired.saturating_sub(released),
            total_allocated: self.total_allocated.load(Ordering::Relaxed),
            total_acquired: acquired,
            total_released: released,
            residual_items_drained: self.residual_items_drained.load(Ordering::Relaxed),
            total_evicted: self.total_evicted.load(Ordering::Relaxed),
            evicted_bytes: self.evicted_bytes.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            reclaim_hints: self.reclaim_hints.load(Ordering::Relaxed),
            block_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_is_acquired_minus_released() {
        let tracker = MetricsTracker::new();
        tracker.total_acquired.fetch_add(5, Ordering::Relaxed);
        tracker.total_released.fetch_add(3, Ordering::Relaxed);

        let metrics = tracker.get_metrics(3, 4096);
        assert_eq!(metrics.outstanding_resources, 2);
        assert_eq!(metrics.idle_resources, 3);
        assert_eq!(metrics.block_size, 4096);
    }

    #[test]
    fn test_export_contains_every_counter() {
        let exported = PoolMetrics::default().export();
        assert_eq!(exported.len(), 11);
        assert_eq!(exported.get("sweeps"), Some(&"0".to_string()));
    }

    #[test]
    fn test_prometheus_labels_are_sorted() {
        let mut tags = HashMap::new();
        tags.insert("zone".to_string(), "b".to_string());
        tags.insert("app".to_string(), "a".to_string());

        let output = MetricsExporter::export_prometheus(&PoolMetrics::default(), "p", Some(&tags));
        assert!(output.contains("bufferpool_sweeps_total{pool=\"p\",app=\"a\",zone=\"b\"} 0"));
        assert!(output.contains("# TYPE bufferpool_resources_idle gauge"));
    }
}
