//! # LogWriter: event logger
//!
//! A minimal subscriber that writes every [`Event`] through `tracing`.
//! Register it with [`Scheduler::observe`](crate::Scheduler::observe).
//!
//! ## Example output
//! ```text
//! INFO jobvisor: [success] job="fetch:/" index=0
//! WARN jobvisor: [error] job="fetch:/admin" index=3 err=execution failed: 403
//! INFO jobvisor: [timeout] job="fetch:/slow" index=4
//! INFO jobvisor: [end] err=None
//! ```

use crate::events::Event;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<T: 'static> Subscribe<T> for LogWriter {
    fn on_event(&self, e: &Event<T>) {
        match e {
            Event::Success { job, index, .. } => {
                tracing::info!(target: "jobvisor", "[success] job={:?} index={}", job.name(), index);
            }
            Event::Error { error, job, index } => {
                tracing::warn!(
                    target: "jobvisor",
                    "[error] job={:?} index={} err={}",
                    job.name(),
                    index,
                    error
                );
            }
            Event::Timeout { job, index, .. } => {
                tracing::info!(target: "jobvisor", "[timeout] job={:?} index={}", job.name(), index);
            }
            Event::End { error } => {
                tracing::info!(target: "jobvisor", "[end] err={:?}", error.as_ref().map(|e| e.as_message()));
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
