//! # EsoxSolutions.BufferPool (Rust)
//!
//! Non-blocking recycling pool for fixed-size memory buffers, meant to cut
//! allocation churn for short-lived byte buffers in high-throughput I/O code.
//!
//! ## Features
//!
//! - Acquire never waits: an idle buffer is reused, otherwise a fresh one is created
//! - One owner task serializes acquire, release and eviction; no locks around the free list
//! - Idle buffers are evicted after five minutes by a sweep that runs every minute
//! - Large sweeps ask the allocator to return freed pages to the OS
//! - Two resource kinds: raw byte blocks and bounded queues of byte blocks
//! - RAII guards that return buffers on drop
//! - Process-wide pools per resource kind, or explicitly constructed handles
//! - Metrics with Prometheus text export
//!
//! Raw byte blocks are not zeroed between uses. Treat an acquired block as
//! holding arbitrary data and overwrite it before reading.
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_bufferpool::{BytePool, PoolConfiguration};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = BytePool::new(PoolConfiguration::default()).unwrap();
//!     {
//!         let block = pool.acquire_guard().await;
//!         println!("Got {} bytes", block.len());
//!         // Block automatically returned when `block` goes out of scope
//!     }
//! }
//! ```

mod config;
mod errors;
mod eviction;
mod global;
mod metrics;
mod pool;
pub mod reclaim;
mod resource;

pub use config::{
    PoolConfiguration, Reclaimer, DEFAULT_BLOCK_SIZE, DEFAULT_IDLE_TIMEOUT,
    DEFAULT_MAILBOX_CAPACITY, DEFAULT_RECLAIM_THRESHOLD_BYTES, DEFAULT_SWEEP_INTERVAL,
};
pub use errors::{PoolError, PoolResult};
pub use eviction::SweepReport;
pub use global::{byte_pool, byte_pool_with, queue_pool, queue_pool_with};
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{BytePool, PooledBuffer, QueuePool, RecyclingPool};
pub use resource::{BlockQueue, Recyclable};
