//! # Shared scheduler state.
//!
//! Everything the state machine mutates lives in [`State`], behind the single
//! mutex of [`Shared`]. Each transition takes the lock, mutates, releases it and
//! only then runs jobs or delivers events.
//!
//! ```text
//! Shared
//!  ├─ state: Mutex<State>      (store, results, counters, session, timers)
//!  └─ subs:  SubscriberSet     (own lock; never taken while delivering)
//! ```
//!
//! Lock order: `state` may be held while *querying* `subs`; `subs` is never held
//! while taking `state`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::{
    core::config::SchedulerConfig,
    error::JobError,
    events::{Event, EventKind},
    jobs::JobStore,
    subscribers::SubscriberSet,
};

/// Per-job result slots: `None` until the job admitted at that index succeeds.
pub type Results<T> = Vec<Option<Vec<T>>>;

/// Step left to the caller once a job gave back its running slot.
pub(crate) enum Follow {
    /// The batch drained; publish `End`.
    Done,
    /// Capacity freed while admission is active.
    Admit,
    Nothing,
}

/// Mutable scheduler state.
pub(crate) struct State<T> {
    pub(crate) cfg: SchedulerConfig,
    pub(crate) store: JobStore<T>,
    pub(crate) results: Results<T>,
    pub(crate) running_count: usize,
    pub(crate) session: u64,
    pub(crate) is_running: bool,
    /// An admission loop is on some stack; nested requests defer to it.
    pub(crate) pumping: bool,
    /// Armed timeouts keyed by timer id.
    pub(crate) timers: HashMap<u64, CancellationToken>,
    next_timer: u64,
    /// Parent of every job and timer token of the current session.
    pub(crate) session_token: CancellationToken,
}

impl<T: 'static> State<T> {
    pub(crate) fn new(cfg: SchedulerConfig, results: Results<T>) -> Self {
        Self {
            cfg,
            store: JobStore::new(),
            results,
            running_count: 0,
            session: 0,
            is_running: false,
            pumping: false,
            timers: HashMap::new(),
            next_timer: 0,
            session_token: CancellationToken::new(),
        }
    }

    /// Registers a new timer token and returns its id.
    pub(crate) fn arm_timer(&mut self, token: CancellationToken) -> u64 {
        let id = self.next_timer;
        self.next_timer = self.next_timer.wrapping_add(1);
        self.timers.insert(id, token);
        id
    }

    /// Cancels and forgets a timer; no-op if it already fired or was cleared.
    pub(crate) fn disarm_timer(&mut self, id: u64) {
        if let Some(token) = self.timers.remove(&id) {
            token.cancel();
        }
    }

    /// Cancels every outstanding timer.
    pub(crate) fn clear_timers(&mut self) {
        for (_, token) in self.timers.drain() {
            token.cancel();
        }
    }

    /// True when the drain condition holds: nothing running, nothing queued.
    pub(crate) fn is_drained(&self) -> bool {
        self.running_count == 0 && self.store.is_empty()
    }

    /// Admission should keep pulling after a launch.
    pub(crate) fn wants_more(&self) -> bool {
        self.is_running && !self.store.is_empty()
    }

    /// Decides what follows the completion of a job admitted under `session`.
    ///
    /// A drained batch is finished here, in the caller's critical section.
    pub(crate) fn follow(&mut self, session: u64) -> Follow {
        if self.session != session {
            Follow::Nothing
        } else if self.is_drained() {
            self.finish_session();
            Follow::Done
        } else if self.is_running {
            Follow::Admit
        } else {
            Follow::Nothing
        }
    }

    /// State half of the done transition.
    ///
    /// Advances the session (every completion and timer tagged with the old one
    /// becomes inert), stops admission and cancels the old session's token.
    /// The caller publishes `End` after releasing the lock.
    pub(crate) fn finish_session(&mut self) {
        self.session = self.session.wrapping_add(1);
        self.is_running = false;
        let old = std::mem::replace(&mut self.session_token, CancellationToken::new());
        old.cancel();
    }
}

/// State and subscribers shared by every scheduler handle, completion and timer.
pub(crate) struct Shared<T> {
    pub(crate) state: Mutex<State<T>>,
    pub(crate) subs: SubscriberSet<T>,
}

impl<T: 'static> Shared<T> {
    pub(crate) fn new(state: State<T>, subs: SubscriberSet<T>) -> Self {
        Self {
            state: Mutex::new(state),
            subs,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers `event` to subscribers.
    ///
    /// An `Error` nobody listens to is logged so failures never vanish silently.
    pub(crate) fn publish(&self, event: Event<T>) {
        let delivered = self.subs.emit(&event);
        if delivered == 0 {
            if let Event::Error { error, job, index } = &event {
                tracing::warn!(
                    job = job.name(),
                    index,
                    label = error.as_label(),
                    "job failed with no error subscriber: {error}"
                );
            }
        }
    }

    /// Publishes the `End` event of a done transition.
    pub(crate) fn publish_end(&self, error: Option<JobError>) {
        tracing::debug!(error = ?error, "batch ended");
        self.publish(Event::End { error });
    }

    pub(crate) fn has_subscribers(&self, kind: EventKind) -> bool {
        self.subs.has_subscribers(kind)
    }
}
