#![doc = include_str!("../README.md")]

mod cli;
mod telemetry;

use clap::Parser;
use cli::CliArgs;
use sockpool::{Error, OpCode, Pool, PoolConfig, TaskRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = PoolConfig::try_from(&args)?;

    telemetry::init();

    let executed = Arc::new(AtomicU64::new(0));
    let mut registry = TaskRegistry::new();
    let hello = {
        let executed = Arc::clone(&executed);
        registry.register("hello", move |task_no| {
            let executed = Arc::clone(&executed);
            async move {
                executed.fetch_add(1, Ordering::Relaxed);
                tracing::info!("hello world from task {task_no}");
            }
        })
    };

    let mut pool = Pool::create(config, registry)?;
    tracing::info!(
        "Pool started: {} workers, {:?} submit budget",
        pool.live_workers(),
        pool.config().submit_budget
    );

    tokio::select! {
        accepted = submit_all(&pool, hello, args.tasks) => {
            tracing::info!("Submitted {accepted} of {} tasks", args.tasks);
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Interrupted; asking workers to stop");
            pool.shutdown();
        }
    }

    let exits = pool.wait_all().await;
    tracing::info!(
        "All workers exited ({} reaped); {} tasks executed",
        exits.len(),
        executed.load(Ordering::Relaxed)
    );
    for exit in &exits {
        tracing::debug!("Worker exit: {exit:?}");
    }

    pool.destroy();
    Ok(())
}

/// Pushes `tasks` records into the pool, skipping submissions that time
/// out against a saturated channel.
async fn submit_all(pool: &Pool, op: OpCode, tasks: u64) -> u64 {
    let mut accepted = 0;
    for task_no in 0..tasks {
        match pool.submit(op, task_no).await {
            Ok(()) => accepted += 1,
            Err(e @ Error::Timeout { .. }) => {
                tracing::warn!("Task {task_no} not accepted: {e}");
            }
            Err(e) => {
                tracing::error!("Submission failed: {e}");
                break;
            }
        }
    }
    accepted
}
