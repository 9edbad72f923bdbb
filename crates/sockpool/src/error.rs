//! Error types for the pool.
//!
//! This module defines the central `Error` enum, which captures every
//! failure a pool operation can report. All failure paths return a value;
//! nothing in this crate terminates the calling process.
//!
//! ## Error Cases
//! - `InvalidWorkerCount`: The pool was configured with zero workers.
//! - `Io`: A non-transient channel failure, carrying the underlying
//!   system error.
//! - `Timeout`: A readiness wait exhausted its budget.
//! - `Shutdown`: A submission arrived after shutdown was signalled.
//!
//! A peer closing the channel mid-transfer is *not* an error: it is
//! reported as a byte count through [`Transfer::Short`](crate::Transfer).

use core::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for pool construction and task submission.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The pool was configured with zero workers.
    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,

    /// Non-transient channel failure. Transient interruptions are retried
    /// internally and never surface here.
    #[error("channel i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The channel did not become ready within the supplied budget.
    #[error("channel not ready within {budget:?}")]
    Timeout {
        /// The readiness budget that was exhausted.
        budget: Duration,
    },

    /// The pool is shutting down and refuses new submissions.
    #[error("pool is shutting down")]
    Shutdown,
}
