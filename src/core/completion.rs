//! # Completion handle: the single sink of a job's outcome.
//!
//! Every admitted job gets one [`Completion`]. The job's callback, its returned
//! future and its timeout timer all feed the same handle; a one-shot latch
//! decides which producer wins.
//!
//! ## Rules
//! - **First writer wins**: the latch is set under the state lock; later calls
//!   return `false` and change nothing.
//! - **Session tagged**: a completion created under session `s` is discarded once
//!   the scheduler moved past `s` (after `end` or a drain).
//! - **Timeout aware**: a job that timed out never records a result, even if the
//!   timeout subscriber later completes it without an error.
//!
//! ## Transition
//! ```text
//! complete(outcome)
//!   ├─ lock: stale session? latched? ─► discard
//!   ├─ lock: running -= 1, disarm timer, record result (success, not timed out)
//!   ├─ publish Error / Success            (lock released)
//!   └─ lock: same session?
//!        ├─ drained     ─► finish session, publish End
//!        └─ is_running  ─► admission
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio_util::sync::CancellationToken;

use crate::{
    core::state::Shared,
    error::JobError,
    events::{Event, EventKind},
    jobs::JobRef,
};

/// Per-job bookkeeping shared by all clones of a [`Completion`].
struct Slot<T> {
    job: JobRef<T>,
    session: u64,
    index: usize,
    timer: Option<u64>,
    latch: AtomicBool,
    timed_out: AtomicBool,
    token: CancellationToken,
}

/// Handle through which a job reports its outcome.
///
/// Cheap to clone; all clones share the same one-shot latch.
pub struct Completion<T> {
    shared: Weak<Shared<T>>,
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: 'static> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("job", &self.slot.job.name())
            .field("session", &self.slot.session)
            .field("index", &self.slot.index)
            .field("completed", &self.is_completed())
            .field("timed_out", &self.timed_out())
            .finish()
    }
}

impl<T: 'static> Completion<T> {
    pub(crate) fn new(
        shared: Weak<Shared<T>>,
        job: JobRef<T>,
        session: u64,
        index: usize,
        timer: Option<u64>,
        token: CancellationToken,
    ) -> Self {
        Self {
            shared,
            slot: Arc::new(Slot {
                job,
                session,
                index,
                timer,
                latch: AtomicBool::new(false),
                timed_out: AtomicBool::new(false),
                token,
            }),
        }
    }

    /// Cancellation token of this job.
    ///
    /// Cancelled when the job is abandoned after a timeout, or when the session
    /// it was admitted under ends.
    pub fn token(&self) -> CancellationToken {
        self.slot.token.clone()
    }

    /// The job this handle completes.
    pub fn job(&self) -> &JobRef<T> {
        &self.slot.job
    }

    /// Result slot assigned at admission.
    pub fn index(&self) -> usize {
        self.slot.index
    }

    /// Session the job was admitted under.
    pub fn session(&self) -> u64 {
        self.slot.session
    }

    /// True once an outcome was accepted.
    pub fn is_completed(&self) -> bool {
        self.slot.latch.load(Ordering::Acquire)
    }

    /// True if the job's timer expired before it completed.
    pub fn timed_out(&self) -> bool {
        self.slot.timed_out.load(Ordering::Acquire)
    }
}

impl<T> Completion<T>
where
    T: Clone + Send + 'static,
{
    /// Completes the job with a single value.
    pub fn ok(&self, value: T) -> bool {
        self.complete(Ok(vec![value]))
    }

    /// Completes the job with a sequence of values.
    pub fn ok_many(&self, values: Vec<T>) -> bool {
        self.complete(Ok(values))
    }

    /// Completes the job without an error and without values.
    pub fn finish(&self) -> bool {
        self.complete(Ok(Vec::new()))
    }

    /// Completes the job with a failure.
    pub fn fail(&self, error: impl Into<JobError>) -> bool {
        self.complete(Err(error.into()))
    }

    /// Reports the job's outcome.
    ///
    /// Returns `true` if this call was the one honored; `false` if the job was
    /// already completed, its session is over, or the scheduler was dropped.
    pub fn complete(&self, outcome: Result<Vec<T>, JobError>) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let slot = &self.slot;

        let event = {
            let mut st = shared.lock();
            if st.session != slot.session {
                tracing::trace!(job = slot.job.name(), session = slot.session, "stale completion discarded");
                return false;
            }
            if slot.latch.swap(true, Ordering::AcqRel) {
                tracing::trace!(job = slot.job.name(), index = slot.index, "duplicate completion discarded");
                return false;
            }

            st.running_count = st.running_count.saturating_sub(1);
            if let Some(id) = slot.timer {
                st.disarm_timer(id);
            }

            match outcome {
                Err(error) => Some(Event::Error {
                    error,
                    job: Arc::clone(&slot.job),
                    index: slot.index,
                }),
                Ok(values) if !slot.timed_out.load(Ordering::Acquire) => {
                    let value = values.first().cloned();
                    if let Some(result) = st.results.get_mut(slot.index) {
                        *result = Some(values);
                    }
                    Some(Event::Success {
                        value,
                        job: Arc::clone(&slot.job),
                        index: slot.index,
                    })
                }
                Ok(_) => None,
            }
        };

        tracing::trace!(job = slot.job.name(), index = slot.index, "job completed");
        if let Some(event) = event {
            shared.publish(event);
        }

        let follow = shared.lock().follow(slot.session);
        shared.settle(follow);
        true
    }

    /// Timer expiry for this job.
    ///
    /// With a `Timeout` subscriber the handle is handed over and the subscriber
    /// decides how the job completes. Without one the job is abandoned: it
    /// completes with no error and no result in the same critical section that
    /// marks the timeout, so a racing real completion finds the latch taken.
    pub(crate) fn expire(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let slot = &self.slot;

        let abandoned = {
            let mut st = shared.lock();
            if st.session != slot.session || slot.latch.load(Ordering::Acquire) {
                return;
            }
            slot.timed_out.store(true, Ordering::Release);
            if let Some(id) = slot.timer {
                st.timers.remove(&id);
            }
            if shared.has_subscribers(EventKind::Timeout) {
                None
            } else {
                slot.latch.store(true, Ordering::Release);
                st.running_count = st.running_count.saturating_sub(1);
                Some(st.follow(slot.session))
            }
        };

        match abandoned {
            None => {
                tracing::debug!(job = slot.job.name(), index = slot.index, "job timed out, delegated");
                shared.publish(Event::Timeout {
                    next: self.clone(),
                    job: Arc::clone(&slot.job),
                    index: slot.index,
                });
            }
            Some(follow) => {
                tracing::debug!(job = slot.job.name(), index = slot.index, "job timed out, abandoned");
                slot.token.cancel();
                shared.settle(follow);
            }
        }
    }
}
