//! Error types for the buffer pool
//!
//! Acquire, release and resize never fail; only starting a pool can.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No tokio runtime available - use spawn_dedicated outside of a runtime")]
    NoRuntime,

    #[error("Failed to start pool worker: {0}")]
    RuntimeStartup(String),
}

pub type PoolResult<T> = Result<T, PoolError>;
