//! # Lifecycle events emitted by the scheduler.
//!
//! The [`EventKind`] enum classifies the four notifications a scheduler publishes:
//! - **Error**: a job reported a failure
//! - **Success**: a job completed and its values were recorded
//! - **Timeout**: a job exceeded the configured timeout (only delivered when someone listens)
//! - **End**: the batch drained or was aborted
//!
//! The [`Event`] enum carries the strongly-typed payload of each kind.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Event, EventKind, JobError};
//!
//! let ev: Event<u32> = Event::End { error: Some(JobError::fail("boom")) };
//! assert_eq!(ev.kind(), EventKind::End);
//! assert_eq!(ev.kind().as_str(), "end");
//! ```

use std::fmt;

use crate::{core::Completion, error::JobError, jobs::JobRef};

/// Classification of scheduler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A job failed.
    Error,
    /// A job succeeded.
    Success,
    /// A job exceeded its timeout.
    Timeout,
    /// The batch ended (drained, or aborted via `end`).
    End,
}

impl EventKind {
    /// Returns a short stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Error => "error",
            EventKind::Success => "success",
            EventKind::Timeout => "timeout",
            EventKind::End => "end",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduler event with its payload.
///
/// `index` is the result slot assigned to the job at admission time.
pub enum Event<T> {
    /// Sets:
    /// - `error`: the reported failure
    /// - `job`: the job that failed
    /// - `index`: its result slot (left as `None`)
    Error {
        error: JobError,
        job: JobRef<T>,
        index: usize,
    },

    /// Sets:
    /// - `value`: first reported value (`None` when the job completed without values)
    /// - `job`: the job that succeeded
    /// - `index`: its result slot
    Success {
        value: Option<T>,
        job: JobRef<T>,
        index: usize,
    },

    /// Sets:
    /// - `next`: the job's completion handle; the subscriber **must** eventually
    ///   complete it, otherwise the job occupies its slot forever
    /// - `job`: the job that timed out
    /// - `index`: its result slot
    Timeout {
        next: Completion<T>,
        job: JobRef<T>,
        index: usize,
    },

    /// Sets:
    /// - `error`: the error the batch ended with, `None` for a clean drain
    End { error: Option<JobError> },
}

impl<T: 'static> Event<T> {
    /// Returns the classification of this event.
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Error { .. } => EventKind::Error,
            Event::Success { .. } => EventKind::Success,
            Event::Timeout { .. } => EventKind::Timeout,
            Event::End { .. } => EventKind::End,
        }
    }

    /// Returns the job this event refers to (`None` for `End`).
    pub fn job(&self) -> Option<&JobRef<T>> {
        match self {
            Event::Error { job, .. } | Event::Success { job, .. } | Event::Timeout { job, .. } => {
                Some(job)
            }
            Event::End { .. } => None,
        }
    }

    /// Returns the error carried by this event, if any.
    pub fn error(&self) -> Option<&JobError> {
        match self {
            Event::Error { error, .. } => Some(error),
            Event::End { error } => error.as_ref(),
            _ => None,
        }
    }
}

impl<T: 'static> fmt::Debug for Event<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Event");
        d.field("kind", &self.kind());
        match self {
            Event::Error { error, job, index } => {
                d.field("job", &job.name()).field("index", index).field("error", error);
            }
            Event::Success { job, index, .. } | Event::Timeout { job, index, .. } => {
                d.field("job", &job.name()).field("index", index);
            }
            Event::End { error } => {
                d.field("error", error);
            }
        }
        d.finish()
    }
}
