//! # Run a single admitted job.
//!
//! Starts one [`Job`](crate::Job) and wires every completion source into its
//! [`Completion`]:
//!
//! - **Callback**: the job completes the handle it was given.
//! - **Future**: a returned future is spawned on Tokio; its output completes the handle.
//! - **Timeout**: a timer task races the configured duration against its token.
//! - **Panic**: a panic while starting or polling the job fails the handle.
//!
//! ## Event flow
//! ```text
//! job.spawn(next) ─┬─ None        → job completes `next` itself
//!                  ├─ Some(fut)   → tokio::spawn { Ok(v) → next.ok(v) | Err(e) → next.fail(e) }
//!                  └─ panic       → next.fail(Panicked)
//!
//! timer ─► sleep(timeout) ─► next.expire()     (unless the timer token is cancelled first)
//! ```
//!
//! ## Rules
//! - The state lock is never held while the job is invoked, so a job may
//!   complete synchronously (re-entering admission) or call into the scheduler.
//! - A spawned future is dropped when the job's token is cancelled (abandoned
//!   after timeout, or its session ended).

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::{core::completion::Completion, error::JobError, jobs::JobRef};

/// An admitted job, ready to be started outside the state lock.
pub(crate) struct Launch<T> {
    job: JobRef<T>,
    next: Completion<T>,
}

impl<T> Launch<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(job: JobRef<T>, next: Completion<T>) -> Self {
        Self { job, next }
    }

    /// Starts the job and attaches the future channel if one is returned.
    pub(crate) fn run(self) {
        let Launch { job, next } = self;

        match catch_unwind(AssertUnwindSafe(|| job.spawn(next.clone()))) {
            Ok(Some(fut)) => {
                let token = next.token();
                tokio::spawn(async move {
                    tokio::select! {
                        res = AssertUnwindSafe(fut).catch_unwind() => match res {
                            Ok(Ok(value)) => { next.ok(value); }
                            Ok(Err(error)) => { next.fail(error); }
                            Err(panic) => { next.fail(JobError::from_panic(panic)); }
                        },
                        _ = token.cancelled() => {
                            tracing::trace!(job = next.job().name(), index = next.index(), "job future dropped");
                        }
                    }
                });
            }
            Ok(None) => {}
            Err(panic) => {
                next.fail(JobError::from_panic(panic));
            }
        }
    }
}

/// Spawns the timeout timer of one job.
///
/// Cancelling `token` (completion, `end`, session advance) disarms the timer.
pub(crate) fn arm_timeout<T>(next: Completion<T>, token: CancellationToken, timeout: Duration)
where
    T: Clone + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(timeout) => next.expire(),
        }
    });
}
