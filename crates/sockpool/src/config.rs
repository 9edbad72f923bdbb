//! Pool sizing and timing configuration.

use core::time::Duration;

/// Submit budget applied when none is configured.
pub const DEFAULT_SUBMIT_BUDGET: Duration = Duration::from_millis(500);

/// Sizing and timing knobs for a [`Pool`](crate::Pool).
///
/// The worker count is fixed for the lifetime of the pool. The submit
/// budget bounds how long [`submit`](crate::Pool::submit) waits for
/// channel capacity; workers wait twice this budget for their next
/// record before retiring.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers spawned at creation. Must be at least one.
    pub workers: usize,

    /// Readiness budget for a single submission.
    pub submit_budget: Duration,
}

impl PoolConfig {
    /// Configuration with `workers` workers and [`DEFAULT_SUBMIT_BUDGET`].
    pub const fn new(workers: usize) -> Self {
        Self {
            workers,
            submit_budget: DEFAULT_SUBMIT_BUDGET,
        }
    }

    /// Replaces the submit budget.
    #[must_use]
    pub const fn with_submit_budget(mut self, budget: Duration) -> Self {
        self.submit_budget = budget;
        self
    }

    /// Budget a worker spends waiting for its next record before it
    /// treats the channel as dry.
    pub(crate) fn read_budget(&self) -> Duration {
        self.submit_budget * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_wait_twice_the_submit_budget() {
        let config = PoolConfig::new(4).with_submit_budget(Duration::from_millis(40));
        assert_eq!(config.read_budget(), Duration::from_millis(80));
    }

    #[test]
    fn default_budget_is_half_a_second() {
        assert_eq!(PoolConfig::new(1).submit_budget, Duration::from_millis(500));
    }
}
