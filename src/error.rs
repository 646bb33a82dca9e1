//! Error types reported by jobs and by the scheduler.
//!
//! A single enum, [`JobError`], covers every failure a batch can observe:
//!
//! - a job reported failure through its completion handle or returned future;
//! - a job exceeded its timeout and a timeout subscriber chose to report it;
//! - a job panicked while being started or polled;
//! - the owner aborted the batch with [`Scheduler::end`](crate::Scheduler::end).
//!
//! The type is `Clone` because the same error is delivered to every `Error`
//! subscriber and may also be carried by the following `End` event.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by job execution.
///
/// Job errors never abort the scheduler by themselves; they are published as
/// [`Event::Error`](crate::Event::Error). Use
/// [`Scheduler::start_with`](crate::Scheduler::start_with) or
/// [`Scheduler::run`](crate::Scheduler::run) to turn the first error into the
/// end of the batch.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Job reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Job exceeded its timeout duration.
    ///
    /// Never produced by the scheduler itself: a timed-out job without a
    /// timeout subscriber is abandoned silently. Timeout subscribers use this
    /// variant to report the expiry as a failure.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Job panicked while starting or while its future was polled.
    #[error("job panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },

    /// Batch was aborted by its owner.
    #[error("aborted: {reason}")]
    Aborted {
        /// Why the batch was aborted.
        reason: String,
    },
}

impl JobError {
    /// Shorthand for [`JobError::Fail`].
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    ///
    /// let err = JobError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        JobError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`JobError::Aborted`].
    pub fn aborted(reason: impl Into<String>) -> Self {
        JobError::Aborted {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobvisor::JobError;
    /// use std::time::Duration;
    ///
    /// let err = JobError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "job_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Timeout { .. } => "job_timeout",
            JobError::Panicked { .. } => "job_panicked",
            JobError::Aborted { .. } => "batch_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            JobError::Panicked { info } => format!("panic: {info}"),
            JobError::Aborted { reason } => format!("aborted: {reason}"),
        }
    }

    /// Builds a [`JobError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        JobError::Panicked { info }
    }
}

impl From<String> for JobError {
    fn from(error: String) -> Self {
        JobError::Fail { error }
    }
}

impl From<&str> for JobError {
    fn from(error: &str) -> Self {
        JobError::Fail {
            error: error.to_string(),
        }
    }
}
