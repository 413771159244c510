//! Core recycling pool: the arbitration loop and its handles

use crate::config::{PoolConfiguration, Reclaimer};
use crate::errors::{PoolError, PoolResult};
use crate::eviction::{FreeList, PoolEntry, SweepReport};
use crate::metrics::{MetricsTracker, PoolMetrics};
use crate::resource::{BlockQueue, Recyclable};

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Pool of raw fixed-length byte blocks.
pub type BytePool = RecyclingPool<Vec<u8>>;

/// Pool of bounded block queues.
pub type QueuePool = RecyclingPool<BlockQueue>;

enum Command<R> {
    Acquire(oneshot::Sender<R>),
    Release(R),
    Sweep(oneshot::Sender<SweepReport>),
    Metrics(oneshot::Sender<PoolMetrics>),
}

/// State readable from any handle without going through the loop
struct PoolShared {
    name: String,
    block_size: AtomicUsize,
    metrics: MetricsTracker,
}

impl PoolShared {
    fn block_size(&self) -> usize {
        self.block_size.load(Ordering::Relaxed)
    }
}

/// Handle to a non-blocking recycling pool.
///
/// A single background task owns the free list and serves acquire, release
/// and sweep requests one at a time; a second task only signals the sweep.
/// Handles are cheap to clone and the loop runs until the last one is dropped.
///
/// `acquire` never waits for a resource to be returned: when nothing is
/// idle a fresh resource is created on the spot.
///
/// # Examples
///
/// ```
/// use esox_bufferpool::{BytePool, PoolConfiguration};
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let pool = BytePool::new(PoolConfiguration::new().with_block_size(1024)).unwrap();
///
///     let mut block = pool.acquire().await;
///     assert_eq!(block.len(), 1024);
///     block[0] = 42;
///
///     pool.release(block).await;
///     assert_eq!(pool.idle_count().await, 1);
/// });
/// ```
pub struct RecyclingPool<R: Recyclable> {
    mailbox: mpsc::Sender<Command<R>>,
    shared: Arc<PoolShared>,
}

impl<R: Recyclable> Clone for RecyclingPool<R> {
    fn clone(&self) -> Self {
        Self {
            mailbox: self.mailbox.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Recyclable> RecyclingPool<R> {
    /// Start a pool on the current tokio runtime
    pub fn new(config: PoolConfiguration) -> PoolResult<Self> {
        config.validate()?;
        let handle = Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        let (pool, worker, sweep_signal) = Self::wire(config);
        let interval = worker.sweep_interval;
        handle.spawn(run_ticker(interval, sweep_signal));
        handle.spawn(worker.run());

        Ok(pool)
    }

    /// Start a pool on its own OS thread with a private single-threaded runtime
    ///
    /// Works with or without an ambient runtime, so the pool can serve both
    /// async tasks and plain threads through the `*_blocking` methods.
    pub fn spawn_dedicated(config: PoolConfiguration) -> PoolResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| PoolError::RuntimeStartup(e.to_string()))?;

        let (pool, worker, sweep_signal) = Self::wire(config);
        let interval = worker.sweep_interval;

        std::thread::Builder::new()
            .name(format!("{}-worker", pool.shared.name))
            .spawn(move || {
                runtime.block_on(async move {
                    tokio::spawn(run_ticker(interval, sweep_signal));
                    worker.run().await;
                });
            })
            .map_err(|e| PoolError::RuntimeStartup(e.to_string()))?;

        Ok(pool)
    }

    fn wire(config: PoolConfiguration) -> (Self, Worker<R>, mpsc::Sender<()>) {
        let (mailbox, commands) = mpsc::channel(config.mailbox_capacity);
        let (sweep_signal, sweeps) = mpsc::channel(1);

        let shared = Arc::new(PoolShared {
            name: config.name.clone(),
            block_size: AtomicUsize::new(config.block_size),
            metrics: MetricsTracker::new(),
        });

        let worker = Worker {
            free: FreeList::new(),
            commands,
            sweeps,
            shared: Arc::clone(&shared),
            idle_timeout: config.idle_timeout,
            sweep_interval: config.sweep_interval,
            reclaim_threshold_bytes: config.reclaim_threshold_bytes,
            reclaimer: config.reclaimer,
        };

        (Self { mailbox, shared }, worker, sweep_signal)
    }

    /// Get a resource, reusing the oldest idle one or creating a fresh one
    ///
    /// Raw byte blocks may still hold data from their previous user.
    pub async fn acquire(&self) -> R {
        let (reply, response) = oneshot::channel();
        if self.mailbox.send(Command::Acquire(reply)).await.is_ok() {
            if let Ok(resource) = response.await {
                return resource;
            }
        }
        self.allocate_detached()
    }

    /// Get a resource from a thread that is not running async code
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context.
    pub fn acquire_blocking(&self) -> R {
        let (reply, response) = oneshot::channel();
        if self.mailbox.blocking_send(Command::Acquire(reply)).is_ok() {
            if let Ok(resource) = response.blocking_recv() {
                return resource;
            }
        }
        self.allocate_detached()
    }

    /// Get a resource wrapped in a guard that releases it when dropped
    pub async fn acquire_guard(&self) -> PooledBuffer<R> {
        let resource = self.acquire().await;
        PooledBuffer::new(resource, self.mailbox.clone())
    }

    /// Hand a resource back for reuse
    ///
    /// Queue resources are emptied before they become idle again.
    pub async fn release(&self, resource: R) {
        if self.mailbox.send(Command::Release(resource)).await.is_err() {
            warn!(pool = %self.shared.name, "pool stopped, dropping released resource");
        }
    }

    /// Hand a resource back from a thread that is not running async code
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context.
    pub fn release_blocking(&self, resource: R) {
        if self.mailbox.blocking_send(Command::Release(resource)).is_err() {
            warn!(pool = %self.shared.name, "pool stopped, dropping released resource");
        }
    }

    /// Change the capacity of resources created from now on
    ///
    /// Idle and outstanding resources keep their size. A size of zero is ignored.
    pub fn set_buffer_size(&self, block_size: usize) {
        if block_size == 0 {
            warn!(pool = %self.shared.name, "ignoring zero buffer size");
            return;
        }
        self.shared.block_size.store(block_size, Ordering::Relaxed);
        debug!(pool = %self.shared.name, block_size, "buffer size changed");
    }

    /// Capacity used for newly created resources
    pub fn block_size(&self) -> usize {
        self.shared.block_size()
    }

    /// Name used in logs and metric labels
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Run an eviction sweep now, in addition to the periodic ones
    pub async fn sweep(&self) -> SweepReport {
        let (reply, response) = oneshot::channel();
        if self.mailbox.send(Command::Sweep(reply)).await.is_err() {
            return SweepReport::default();
        }
        response.await.unwrap_or_default()
    }

    /// Number of idle resources, observed after every earlier request from this handle
    pub async fn idle_count(&self) -> usize {
        self.metrics().await.idle_resources
    }

    /// Get pool metrics
    pub async fn metrics(&self) -> PoolMetrics {
        let (reply, response) = oneshot::channel();
        if self.mailbox.send(Command::Metrics(reply)).await.is_ok() {
            if let Ok(metrics) = response.await {
                return metrics;
            }
        }
        self.shared.metrics.get_metrics(0, self.block_size())
    }

    fn allocate_detached(&self) -> R {
        warn!(pool = %self.shared.name, "pool stopped, allocating outside the pool");
        R::allocate(self.block_size())
    }
}

/// The single owner of the free list
struct Worker<R: Recyclable> {
    free: FreeList<R>,
    commands: mpsc::Receiver<Command<R>>,
    sweeps: mpsc::Receiver<()>,
    shared: Arc<PoolShared>,
    idle_timeout: Duration,
    sweep_interval: Duration,
    reclaim_threshold_bytes: usize,
    reclaimer: Reclaimer,
}

impl<R: Recyclable> Worker<R> {
    async fn run(mut self) {
        debug!(
            pool = %self.shared.name,
            block_size = self.shared.block_size(),
            "recycling pool started"
        );

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },

                Some(()) = self.sweeps.recv() => {
                    self.sweep();
                }
            }
        }

        (self.reclaimer)();
        self.shared.metrics.reclaim_hints.fetch_add(1, Ordering::Relaxed);
        debug!(pool = %self.shared.name, idle = self.free.len(), "recycling pool stopped");
    }

    fn handle(&mut self, command: Command<R>) {
        match command {
            Command::Acquire(reply) => self.hand_out(reply),
            Command::Release(resource) => self.take_back(resource),
            Command::Sweep(reply) => {
                let _ = reply.send(self.sweep());
            }
            Command::Metrics(reply) => {
                let metrics = self
                    .shared
                    .metrics
                    .get_metrics(self.free.len(), self.shared.block_size());
                let _ = reply.send(metrics);
            }
        }
    }

    fn hand_out(&mut self, reply: oneshot::Sender<R>) {
        if self.free.is_empty() {
            let resource = R::allocate(self.shared.block_size());
            self.shared.metrics.total_allocated.fetch_add(1, Ordering::Relaxed);
            self.free.push_back(resource, Instant::now());
        }

        let Some(PoolEntry { resource, last_used_at }) = self.free.pop_front() else {
            return;
        };

        match reply.send(resource) {
            Ok(()) => {
                self.shared.metrics.total_acquired.fetch_add(1, Ordering::Relaxed);
            }
            // The caller gave up waiting; keep the entry where it was.
            Err(resource) => self.free.restore_front(PoolEntry { resource, last_used_at }),
        }
    }

    fn take_back(&mut self, mut resource: R) {
        let drained = resource.recycle();
        if drained > 0 {
            trace!(pool = %self.shared.name, drained, "discarded residual items");
            self.shared
                .metrics
                .residual_items_drained
                .fetch_add(drained, Ordering::Relaxed);
        }

        self.free.push_back(resource, Instant::now());
        self.shared.metrics.total_released.fetch_add(1, Ordering::Relaxed);
    }

    fn sweep(&mut self) -> SweepReport {
        let (evicted, freed_bytes) = self.free.evict_idle(Instant::now(), self.idle_timeout);

        let metrics = &self.shared.metrics;
        metrics.sweeps.fetch_add(1, Ordering::Relaxed);
        metrics.total_evicted.fetch_add(evicted, Ordering::Relaxed);
        metrics.evicted_bytes.fetch_add(freed_bytes, Ordering::Relaxed);

        let reclaimed = freed_bytes > self.reclaim_threshold_bytes;
        if reclaimed {
            info!(pool = %self.shared.name, freed_bytes, "returning freed memory to the OS");
            (self.reclaimer)();
            metrics.reclaim_hints.fetch_add(1, Ordering::Relaxed);
        }

        trace!(
            pool = %self.shared.name,
            evicted,
            freed_bytes,
            remaining = self.free.len(),
            "sweep finished"
        );

        SweepReport {
            evicted,
            freed_bytes,
            remaining: self.free.len(),
            reclaimed,
        }
    }
}

/// Signals the worker once per interval until the worker goes away
async fn run_ticker(period: Duration, signal: mpsc::Sender<()>) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if signal.send(()).await.is_err() {
            break;
        }
    }
}

/// A pooled resource that automatically returns to the pool when dropped
pub struct PooledBuffer<R: Recyclable> {
    value: Option<R>,
    mailbox: mpsc::Sender<Command<R>>,
}

impl<R: Recyclable> PooledBuffer<R> {
    fn new(value: R, mailbox: mpsc::Sender<Command<R>>) -> Self {
        Self {
            value: Some(value),
            mailbox,
        }
    }

    /// Take the resource out without returning it to the pool
    pub fn into_inner(mut self) -> R {
        self.value.take().expect("Value already taken")
    }
}

impl<R: Recyclable> Deref for PooledBuffer<R> {
    type Target = R;

    fn deref(&self) -> &Self::Target {
        self.value.as_ref().expect("Value already taken")
    }
}

impl<R: Recyclable> DerefMut for PooledBuffer<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.value.as_mut().expect("Value already taken")
    }
}

impl<R: Recyclable> Drop for PooledBuffer<R> {
    fn drop(&mut self) {
        let Some(value) = self.value.take() else {
            return;
        };

        match self.mailbox.try_send(Command::Release(value)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(command)) => {
                // Mailbox is busy: finish the hand-off on the runtime if there is one.
                match Handle::try_current() {
                    Ok(handle) => {
                        let mailbox = self.mailbox.clone();
                        handle.spawn(async move {
                            if mailbox.send(command).await.is_err() {
                                warn!("pool stopped, dropping guarded resource");
                            }
                        });
                    }
                    Err(_) => warn!("pool mailbox full outside a runtime, dropping guarded resource"),
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("pool stopped, dropping guarded resource");
            }
        }
    }
}
