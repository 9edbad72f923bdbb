//! Pool lifecycle and task submission.
//!
//! The [`Pool`] owns the channel pair, spawns the workers, and exposes
//! submit/wait/destroy to the controlling task. All workers consume from
//! the *same* read endpoint: reads on a byte-stream channel are consumed
//! exactly once from the shared buffer, so competing idle workers
//! naturally partition incoming records with no dispatcher and no
//! explicit coordination. Load distribution across idle workers falls
//! out of the channel semantics.

mod worker;

pub use worker::WorkerExit;

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::io::{Transfer, write_exact_timed};
use crate::record::TaskRecord;
use crate::registry::{OpCode, TaskRegistry};
use std::io;
use std::sync::Arc;
use tokio::{net::UnixStream, sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// A fixed-size pool of workers fed over one shared duplex channel.
///
/// The controlling task is the sole writer; every worker is a competing
/// reader of the single shared endpoint. Records enter the channel in
/// submission order, but which worker consumes which record, and in what
/// order tasks complete, is non-deterministic.
///
/// The pool does not own its workers' lifetimes past creation: it can
/// reap them with [`Pool::wait_all`] and ask them to stop with
/// [`Pool::shutdown`], but it cannot cancel a task that is already
/// executing.
pub struct Pool {
    submit_endpoint: Mutex<UnixStream>,
    worker_endpoint: Arc<Mutex<UnixStream>>,
    registry: Arc<TaskRegistry>,
    config: PoolConfig,
    workers: Vec<JoinHandle<WorkerExit>>,
    shutdown: CancellationToken,
}

impl Pool {
    /// Creates the channel pair and spawns `config.workers` workers.
    ///
    /// The channel is created exactly once per pool and never recreated;
    /// both endpoints are non-blocking under the runtime's reactor. Each
    /// worker holds the shared read endpoint, the frozen registry, and
    /// the shutdown token.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidWorkerCount`] if `config.workers` is zero.
    ///   Nothing is created on this path.
    /// - [`Error::Io`] if channel creation fails. No worker is spawned.
    pub fn create(config: PoolConfig, registry: TaskRegistry) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }

        let (submit_endpoint, worker_endpoint) = UnixStream::pair()?;

        let worker_count = config.workers;
        let mut pool = Self {
            submit_endpoint: Mutex::new(submit_endpoint),
            worker_endpoint: Arc::new(Mutex::new(worker_endpoint)),
            registry: Arc::new(registry),
            workers: Vec::with_capacity(worker_count),
            shutdown: CancellationToken::new(),
            config,
        };
        pool.spawn_workers(worker_count);

        tracing::debug!("Pool created with {} workers", pool.workers.len());
        Ok(pool)
    }

    fn spawn_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker_id = self.workers.len();
            let handle = tokio::spawn(worker::worker_loop(
                worker_id,
                Arc::clone(&self.worker_endpoint),
                Arc::clone(&self.registry),
                self.config.read_budget(),
                self.shutdown.clone(),
            ));
            self.workers.push(handle);
        }
    }

    /// Submits one task record for execution by exactly one worker.
    ///
    /// Returns as soon as the record is fully buffered in the channel.
    /// There is no acknowledgment, and no way to withdraw a record once
    /// written. If the channel's buffer is full and no worker drains it
    /// within the configured budget, the submission fails with
    /// [`Error::Timeout`]; whether to retry is the caller's decision.
    ///
    /// Concurrent submissions are serialized on the endpoint so records
    /// are always written whole.
    ///
    /// # Errors
    ///
    /// - [`Error::Shutdown`] once [`Pool::shutdown`] has been called.
    /// - [`Error::Timeout`] when the channel stayed full past the budget.
    /// - [`Error::Io`] on a non-transient channel failure, including the
    ///   read side having closed entirely.
    pub async fn submit(&self, op: OpCode, arg: u64) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(Error::Shutdown);
        }

        let frame = TaskRecord::new(op, arg).encode();
        let endpoint = self.submit_endpoint.lock().await;
        match write_exact_timed(&endpoint, &frame, self.config.submit_budget).await? {
            Transfer::Complete => Ok(()),
            Transfer::Short(sent) => Err(Error::Io(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("record truncated after {sent} bytes"),
            ))),
        }
    }

    /// Number of workers that have not yet exited.
    ///
    /// Derived from the join state of each worker, so it reflects every
    /// exit path: closure, idle retirement, shutdown, failure, and panic.
    pub fn live_workers(&self) -> usize {
        self.workers.iter().filter(|h| !h.is_finished()).count()
    }

    /// Blocks until every worker has exited and returns their exit
    /// states, in unspecified order.
    ///
    /// There is no timeout variant and the call is not cancellable: if a
    /// worker never exits (a task that never completes), this never
    /// returns. A worker that panicked is reaped as
    /// [`WorkerExit::Crashed`]; no task-level detail survives.
    pub async fn wait_all(&mut self) -> Vec<WorkerExit> {
        let mut exits = Vec::with_capacity(self.workers.len());
        while let Some(handle) = self.workers.pop() {
            match handle.await {
                Ok(exit) => exits.push(exit),
                Err(err) => {
                    tracing::error!("Worker task join failed: {err}");
                    exits.push(WorkerExit::Crashed);
                }
            }
        }
        exits
    }

    /// Signals every worker to exit at its next loop turn.
    ///
    /// A worker mid-task finishes that task first; records still
    /// buffered in the channel are abandoned. Subsequent submissions
    /// fail with [`Error::Shutdown`].
    pub fn shutdown(&self) {
        tracing::debug!("Cancelling worker loops");
        self.shutdown.cancel();
    }

    /// Closes the controller's endpoint and releases the pool without
    /// terminating workers.
    ///
    /// A worker blocked waiting for a record observes the closure and
    /// exits on its own. A worker executing a long task keeps running
    /// detached until the task finishes; nothing reaps it afterwards.
    /// Callers that need the exit states must call [`Pool::wait_all`]
    /// before destroying the pool.
    pub fn destroy(self) {
        tracing::debug!("Destroying pool; {} workers still live", self.live_workers());
        drop(self);
    }

    /// The configuration the pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
