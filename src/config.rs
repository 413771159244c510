//! Pool configuration options

use crate::errors::{PoolError, PoolResult};
use crate::reclaim;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default size of a freshly allocated block (4 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

/// Idle entries older than this are evicted by the sweep.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Period of the sweep ticker.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bytes freed in a single sweep above which the OS is asked to take memory back (256 MiB).
pub const DEFAULT_RECLAIM_THRESHOLD_BYTES: usize = 268_435_456;

/// Depth of the request mailbox in front of the arbitration loop.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

/// Hook invoked when the pool wants freed pages handed back to the OS.
pub type Reclaimer = Arc<dyn Fn() + Send + Sync>;

/// Configuration for buffer pool behavior
///
/// # Examples
///
/// ```
/// use esox_bufferpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_block_size(16 * 1024)
///     .with_idle_timeout(Duration::from_secs(120))
///     .with_sweep_interval(Duration::from_secs(30));
///
/// assert_eq!(config.block_size, 16 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct PoolConfiguration {
    /// Capacity of every resource created from now on
    pub block_size: usize,

    /// How long an entry may sit idle before the sweep evicts it
    pub idle_timeout: Duration,

    /// How often the sweep ticker fires
    pub sweep_interval: Duration,

    /// Freed bytes in one sweep that trigger the OS reclaim hint
    pub reclaim_threshold_bytes: usize,

    /// Bounded depth of the request mailbox
    pub mailbox_capacity: usize,

    /// Name used in logs and metric labels
    pub name: String,

    /// OS reclaim hook
    pub reclaimer: Reclaimer,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            reclaim_threshold_bytes: DEFAULT_RECLAIM_THRESHOLD_BYTES,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            name: "bufferpool".to_string(),
            reclaimer: Arc::new(reclaim::release_to_os),
        }
    }
}

impl fmt::Debug for PoolConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfiguration")
            .field("block_size", &self.block_size)
            .field("idle_timeout", &self.idle_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .field("reclaim_threshold_bytes", &self.reclaim_threshold_bytes)
            .field("mailbox_capacity", &self.mailbox_capacity)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capacity of newly created resources
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_bufferpool::PoolConfiguration;
    ///
    /// let config = PoolConfiguration::new().with_block_size(512);
    /// assert_eq!(config.block_size, 512);
    /// ```
    pub fn with_block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Set the idle timeout after which entries are evicted
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the sweep period
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the freed-bytes threshold for the OS reclaim hint
    pub fn with_reclaim_threshold(mut self, bytes: usize) -> Self {
        self.reclaim_threshold_bytes = bytes;
        self
    }

    /// Set the mailbox depth
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Set the pool name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the OS reclaim hook
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_bufferpool::PoolConfiguration;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let hits = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&hits);
    /// let config = PoolConfiguration::new()
    ///     .with_reclaimer(move || { counter.fetch_add(1, Ordering::Relaxed); });
    ///
    /// (config.reclaimer)();
    /// assert_eq!(hits.load(Ordering::Relaxed), 1);
    /// ```
    pub fn with_reclaimer<F>(mut self, reclaimer: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.reclaimer = Arc::new(reclaimer);
        self
    }

    /// Check the configuration before a pool is started with it
    pub fn validate(&self) -> PoolResult<()> {
        if self.block_size == 0 {
            return Err(PoolError::InvalidConfiguration(
                "block_size must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(PoolError::InvalidConfiguration(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        if self.mailbox_capacity == 0 {
            return Err(PoolError::InvalidConfiguration(
                "mailbox_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
