//! Command-line and environment configuration for the driver.

use clap::Parser;
use core::time::Duration;
use sockpool::PoolConfig;

/// Spawns a fixed pool of workers and feeds it a batch of greeting
/// tasks over the shared channel.
#[derive(Debug, Parser)]
#[command(name = "sockpool", version, about)]
pub struct CliArgs {
    /// Number of pool workers.
    #[arg(long, env = "SOCKPOOL_WORKERS", default_value_t = num_cpus::get())]
    pub workers: usize,

    /// Number of tasks to submit.
    #[arg(long, env = "SOCKPOOL_TASKS", default_value_t = 1000)]
    pub tasks: u64,

    /// Budget for a single submission, in milliseconds.
    #[arg(long, env = "SOCKPOOL_SUBMIT_BUDGET_MS", default_value_t = 500)]
    pub submit_budget_ms: u64,
}

impl TryFrom<&CliArgs> for PoolConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CliArgs) -> Result<Self, Self::Error> {
        anyhow::ensure!(args.workers > 0, "--workers must be at least 1");
        anyhow::ensure!(
            args.submit_budget_ms > 0,
            "--submit-budget-ms must be at least 1"
        );
        Ok(PoolConfig::new(args.workers)
            .with_submit_budget(Duration::from_millis(args.submit_budget_ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_fails_validation() {
        let args = CliArgs {
            workers: 0,
            tasks: 10,
            submit_budget_ms: 500,
        };
        assert!(PoolConfig::try_from(&args).is_err());
    }

    #[test]
    fn budget_is_carried_into_the_pool_config() {
        let args = CliArgs {
            workers: 2,
            tasks: 10,
            submit_budget_ms: 250,
        };
        let config = PoolConfig::try_from(&args).expect("valid args");
        assert_eq!(config.workers, 2);
        assert_eq!(config.submit_budget, Duration::from_millis(250));
    }
}
