//! The per-worker control loop.

use crate::error::Error;
use crate::io::{Transfer, read_exact_timed};
use crate::record::TaskRecord;
use crate::registry::TaskRegistry;
use core::time::Duration;
use std::sync::Arc;
use tokio::{net::UnixStream, sync::Mutex};
use tokio_util::sync::CancellationToken;

/// Terminal state of a worker, observed through
/// [`Pool::wait_all`](crate::Pool::wait_all).
///
/// This is the only signal that crosses back from a worker to the
/// controller; individual task outcomes are never reported.
#[derive(Debug)]
pub enum WorkerExit {
    /// The controller closed the channel and the worker drained out.
    Closed,

    /// No record arrived within the idle budget and the worker retired.
    Idle,

    /// The shutdown token was cancelled.
    Shutdown,

    /// The worker's record read failed.
    Failed(Error),

    /// The worker panicked while executing a task.
    Crashed,
}

/// Receives and executes records until the channel closes or dries up,
/// or shutdown is signalled.
///
/// Workers compete for records on the single shared endpoint: the
/// endpoint lock is held for exactly one full record read, so whichever
/// idle worker acquires it next consumes the next record whole and busy
/// workers never contend. Task execution is inline; a slow task starves
/// only this worker's share of dispatch capacity.
pub(crate) async fn worker_loop(
    worker_id: usize,
    endpoint: Arc<Mutex<UnixStream>>,
    registry: Arc<TaskRegistry>,
    idle_budget: Duration,
    shutdown: CancellationToken,
) -> WorkerExit {
    tracing::trace!("Worker {worker_id} started");

    let mut frame = [0u8; TaskRecord::WIRE_SIZE];
    loop {
        let received = tokio::select! {
            () = shutdown.cancelled() => {
                tracing::debug!("Worker {worker_id} received shutdown signal");
                return WorkerExit::Shutdown;
            }
            received = next_record(&endpoint, &mut frame, idle_budget) => received,
        };

        let record = match received {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("Worker {worker_id} observed channel closure");
                return WorkerExit::Closed;
            }
            Err(Error::Timeout { .. }) => {
                tracing::debug!("Worker {worker_id} retiring after idle budget");
                return WorkerExit::Idle;
            }
            Err(e) => {
                tracing::error!("Worker {worker_id} failed reading from the channel: {e}");
                return WorkerExit::Failed(e);
            }
        };

        match registry.get(record.op) {
            Some(op) => {
                tracing::trace!("Worker {worker_id} running '{}'", op.name);
                (op.task)(record.arg).await;
            }
            None => {
                // Fixed-size framing keeps the stream aligned even when a
                // record is nonsense, so skipping it is safe.
                tracing::warn!("Worker {worker_id} ignoring unknown opcode {}", record.op);
            }
        }
    }
}

/// Consumes exactly one record from the shared endpoint.
///
/// Returns `Ok(None)` when the channel closed before a full record
/// arrived; a non-empty torn fragment is logged and treated the same.
async fn next_record(
    endpoint: &Mutex<UnixStream>,
    frame: &mut [u8; TaskRecord::WIRE_SIZE],
    idle_budget: Duration,
) -> crate::Result<Option<TaskRecord>> {
    let guard = endpoint.lock().await;
    match read_exact_timed(&guard, frame, idle_budget).await? {
        Transfer::Complete => Ok(Some(TaskRecord::decode(frame))),
        Transfer::Short(0) => Ok(None),
        Transfer::Short(n) => {
            tracing::warn!("Channel closed mid-record after {n} bytes");
            Ok(None)
        }
    }
}
