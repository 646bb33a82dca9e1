//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the settings a [`Scheduler`](crate::Scheduler) is built from.
//!
//! ## Sentinel values
//! - `concurrency = 0` → unbounded (every queued job is started at once)
//! - `timeout = 0s` → no timeout

use std::time::Duration;

/// Configuration for a scheduler.
///
/// ## Field semantics
/// - `concurrency`: Maximum number of jobs running at once (`0` = unbounded)
/// - `timeout`: Per-job timeout measured from admission (`0s` = none)
/// - `autostart`: Start admission whenever jobs are pushed, prepended or spliced in
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of concurrently running jobs.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = at most `n` jobs have work outstanding
    pub concurrency: usize,

    /// Per-job timeout.
    ///
    /// - `Duration::ZERO` = no timeout (job runs until it completes)
    /// - `> 0` = a timer is armed when the job is admitted
    pub timeout: Duration,

    /// Whether store mutations immediately trigger admission.
    pub autostart: bool,
}

impl SchedulerConfig {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` concurrent jobs
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.concurrency == 0 {
            None
        } else {
            Some(self.concurrency)
        }
    }

    /// Returns the per-job timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timer armed per job
    #[inline]
    pub fn job_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// True if `running` jobs already fill the configured capacity.
    #[inline]
    pub fn at_capacity(&self, running: usize) -> bool {
        self.concurrency_limit().is_some_and(|limit| running >= limit)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `concurrency = 0` (unbounded)
    /// - `timeout = 0s` (no timeout)
    /// - `autostart = false`
    fn default() -> Self {
        Self {
            concurrency: 0,
            timeout: Duration::ZERO,
            autostart: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sentinels_mean_unbounded() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.job_timeout(), None);
        assert!(!cfg.at_capacity(usize::MAX));
    }

    #[test]
    fn capacity_is_inclusive() {
        let cfg = SchedulerConfig {
            concurrency: 2,
            timeout: Duration::from_millis(10),
            autostart: false,
        };
        assert!(!cfg.at_capacity(1));
        assert!(cfg.at_capacity(2));
        assert_eq!(cfg.job_timeout(), Some(Duration::from_millis(10)));
    }
}
