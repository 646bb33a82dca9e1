//! # Scheduler: bounded-concurrency job runner with lifecycle events.
//!
//! The [`Scheduler`] owns the pending-job store, the result slots and the
//! subscriber set. It admits jobs up to the concurrency limit, races each job
//! against its timeout and publishes `Error`, `Success`, `Timeout` and `End`.
//!
//! ## Key responsibilities
//! - keep at most `concurrency` jobs running, pulling the rest in store order
//! - record each successful job's values at the index assigned on admission
//! - honor exactly one completion per job (callback, future or timeout)
//! - invalidate in-flight work on `end` via session epochs
//!
//! ## High-level architecture
//! ```text
//! push/prepend/splice ──► JobStore ──(autostart)──┐
//!                                                 ▼
//! start() / start_with(cb) / run() ─────────► admission ──► runner ──► job
//!                                                 ▲                     │
//!                                                 │   Completion ◄──────┘ (callback / future / timer)
//!                                                 └──────── complete() ──► publish Error / Success
//!                                                                        └─► drained? publish End
//! ```
//!
//! ## Lifecycle
//! - `start()` resumes admission (sets `is_running`).
//! - `stop()` pauses admission; running jobs still complete.
//! - `end(err)` hard-resets: timers cancelled, store cleared, running count zeroed,
//!   session advanced, `End { error: err }` published.
//! - A drained batch (nothing queued, nothing running) advances the session and
//!   publishes `End { error: None }`.
//!
//! ## Example
//! ```rust
//! use jobvisor::{JobError, JobFn, Scheduler, SchedulerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), JobError> {
//!     let cfg = SchedulerConfig { concurrency: 2, ..SchedulerConfig::default() };
//!     let scheduler = Scheduler::<u32>::new(cfg);
//!
//!     for i in 0..4 {
//!         scheduler.push(JobFn::arc(format!("job-{i}"), move |_ctx: CancellationToken| async move {
//!             Ok::<u32, JobError>(i)
//!         }));
//!     }
//!
//!     let results = scheduler.run().await?;
//!     assert_eq!(results, vec![Some(vec![0]), Some(vec![1]), Some(vec![2]), Some(vec![3])]);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::ops::RangeBounds;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::{
    core::{
        builder::SchedulerBuilder,
        config::SchedulerConfig,
        state::{Results, Shared, State},
    },
    error::JobError,
    events::{Event, EventKind},
    jobs::JobRef,
    subscribers::{Subscribe, SubscriberSet, SubscriptionId},
};

/// Handle to a scheduler.
///
/// Cheap to clone: all clones drive the same state. Must be used from within a
/// Tokio runtime (job futures and timers are spawned on it).
pub struct Scheduler<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: 'static> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.shared.lock();
        f.debug_struct("Scheduler")
            .field("config", &st.cfg)
            .field("running", &st.running_count)
            .field("queued", &st.store.len())
            .field("session", &st.session)
            .field("is_running", &st.is_running)
            .field("results", &st.results.len())
            .finish()
    }
}

impl<T> Scheduler<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a scheduler with the given configuration and no subscribers.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for pre-seeded results and initial subscribers.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder<T> {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: SchedulerConfig,
        results: Results<T>,
        subs: SubscriberSet<T>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(State::new(cfg, results), subs)),
        }
    }

    // ---- Admission and lifecycle ----

    /// Begins or resumes admission.
    ///
    /// With an empty store and nothing running this ends the batch immediately
    /// (`End { error: None }`).
    pub fn start(&self) {
        self.shared.pump();
    }

    /// Starts admission and calls `cb(error, results)` exactly once when the
    /// batch ends.
    ///
    /// Until then, the first `Error` event aborts the batch: it triggers
    /// [`end`](Self::end) with that error, so `cb` receives it.
    pub fn start_with<F>(&self, cb: F)
    where
        F: FnOnce(Option<JobError>, Results<T>) + Send + 'static,
    {
        self.end_or_error(cb);
        self.start();
    }

    /// Runs the batch to its end.
    ///
    /// Async form of [`start_with`](Self::start_with): resolves to the results
    /// on a clean drain, or to the first error (remaining jobs are dropped).
    pub async fn run(&self) -> Result<Results<T>, JobError> {
        let (tx, rx) = oneshot::channel();
        self.start_with(move |error, results| {
            let _ = tx.send(match error {
                Some(error) => Err(error),
                None => Ok(results),
            });
        });
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(JobError::aborted("scheduler dropped before the batch ended")),
        }
    }

    /// Pauses admission. Running jobs continue; [`start`](Self::start) resumes.
    pub fn stop(&self) {
        self.shared.lock().is_running = false;
        tracing::debug!("admission paused");
    }

    /// Hard reset.
    ///
    /// Cancels all timers, drops every queued job, zeroes the running count,
    /// advances the session and publishes `End { error }`. Completions of jobs
    /// that were in flight are discarded.
    pub fn end(&self, error: Option<JobError>) {
        {
            let mut st = self.shared.lock();
            let dropped = st.store.len();
            let abandoned = st.running_count;
            st.clear_timers();
            st.store.clear();
            st.running_count = 0;
            st.finish_session();
            tracing::debug!(dropped, abandoned, session = st.session, "batch reset");
        }
        self.shared.publish_end(error);
    }

    /// Registers the error-or-end bridge behind [`start_with`](Self::start_with).
    fn end_or_error<F>(&self, cb: F)
    where
        F: FnOnce(Option<JobError>, Results<T>) + Send + 'static,
    {
        let weak = Arc::downgrade(&self.shared);
        let on_error = self.shared.subs.subscribe(
            EventKind::Error,
            Arc::new(move |ev: &Event<T>| {
                if let (Some(shared), Some(error)) = (weak.upgrade(), ev.error()) {
                    Scheduler { shared }.end(Some(error.clone()));
                }
            }),
        );

        let weak = Arc::downgrade(&self.shared);
        let cb = Mutex::new(Some(cb));
        let own_id: Arc<OnceLock<SubscriptionId>> = Arc::new(OnceLock::new());
        let id_slot = Arc::clone(&own_id);
        let on_end = self.shared.subs.subscribe(
            EventKind::End,
            Arc::new(move |ev: &Event<T>| {
                let Some(cb) = cb.lock().unwrap_or_else(PoisonError::into_inner).take() else {
                    return;
                };
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.subs.unsubscribe(on_error);
                if let Some(id) = id_slot.get() {
                    shared.subs.unsubscribe(*id);
                }
                let results = shared.lock().results.clone();
                cb(ev.error().cloned(), results);
            }),
        );
        let _ = own_id.set(on_end);
    }

    // ---- Subscriptions ----

    /// Subscribes a handler to one event kind.
    ///
    /// Subscribing to [`EventKind::Timeout`] changes timeout semantics: the
    /// handler receives the job's completion handle and must complete it.
    pub fn on(&self, kind: EventKind, sub: impl Subscribe<T>) -> SubscriptionId {
        self.subscribe(kind, Arc::new(sub))
    }

    /// Subscribes a shared handler to one event kind.
    pub fn subscribe(&self, kind: EventKind, sub: Arc<dyn Subscribe<T>>) -> SubscriptionId {
        self.shared.subs.subscribe(kind, sub)
    }

    /// Subscribes a shared handler to `Error`, `Success` and `End`.
    ///
    /// `Timeout` is left out on purpose: subscribing to it takes over job
    /// completion after expiry.
    pub fn observe(&self, sub: Arc<dyn Subscribe<T>>) -> Vec<SubscriptionId> {
        [EventKind::Error, EventKind::Success, EventKind::End]
            .into_iter()
            .map(|kind| self.shared.subs.subscribe(kind, Arc::clone(&sub)))
            .collect()
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.shared.subs.unsubscribe(id)
    }

    // ---- Store mutations (trigger admission when autostart is on) ----

    /// Appends a job. Returns the number of queued jobs.
    pub fn push(&self, job: JobRef<T>) -> usize {
        self.mutate(|st| st.store.push(job))
    }

    /// Appends jobs in order. Returns the number of queued jobs.
    pub fn extend(&self, jobs: impl IntoIterator<Item = JobRef<T>>) -> usize {
        self.mutate(|st| st.store.extend(jobs))
    }

    /// Inserts jobs at the front, keeping their order. Returns the number of queued jobs.
    pub fn prepend(&self, jobs: impl IntoIterator<Item = JobRef<T>>) -> usize {
        self.mutate(|st| st.store.prepend(jobs))
    }

    /// Removes up to `remove` queued jobs at `index` and inserts `jobs` there.
    /// Returns the removed jobs.
    pub fn splice(
        &self,
        index: usize,
        remove: usize,
        jobs: impl IntoIterator<Item = JobRef<T>>,
    ) -> Vec<JobRef<T>> {
        self.mutate(|st| st.store.splice(index, remove, jobs))
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut State<T>) -> R) -> R {
        let (out, autostart) = {
            let mut st = self.shared.lock();
            let out = f(&mut *st);
            (out, st.cfg.autostart)
        };
        if autostart {
            self.start();
        }
        out
    }

    // ---- Store accessors (queued jobs only, no autostart) ----

    /// Removes and returns the last queued job.
    pub fn pop(&self) -> Option<JobRef<T>> {
        self.shared.lock().store.pop()
    }

    /// Removes and returns the first queued job.
    pub fn shift(&self) -> Option<JobRef<T>> {
        self.shared.lock().store.shift()
    }

    /// Position of `job` among queued jobs (by identity).
    pub fn index_of(&self, job: &JobRef<T>) -> Option<usize> {
        self.shared.lock().store.index_of(job)
    }

    /// Last position of `job` among queued jobs (by identity).
    pub fn last_index_of(&self, job: &JobRef<T>) -> Option<usize> {
        self.shared.lock().store.last_index_of(job)
    }

    /// Reverses the order of queued jobs.
    pub fn reverse(&self) -> &Self {
        self.shared.lock().store.reverse();
        self
    }

    /// Keeps only the queued jobs inside `range`.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> &Self {
        self.shared.lock().store.slice(range);
        self
    }

    // ---- Introspection and configuration ----

    /// Running plus queued jobs.
    pub fn len(&self) -> usize {
        let st = self.shared.lock();
        st.running_count + st.store.len()
    }

    /// True if nothing is running or queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued (not yet started) jobs.
    pub fn queued(&self) -> usize {
        self.shared.lock().store.len()
    }

    /// Number of jobs currently running.
    pub fn running_count(&self) -> usize {
        self.shared.lock().running_count
    }

    /// Snapshot of the result slots.
    pub fn results(&self) -> Results<T> {
        self.shared.lock().results.clone()
    }

    /// Current session epoch.
    pub fn session(&self) -> u64 {
        self.shared.lock().session
    }

    /// True while admission is active.
    pub fn is_running(&self) -> bool {
        self.shared.lock().is_running
    }

    /// Snapshot of the configuration.
    pub fn config(&self) -> SchedulerConfig {
        self.shared.lock().cfg.clone()
    }

    /// Changes the concurrency limit (`0` = unbounded).
    ///
    /// Takes effect at the next admission; running jobs are not interrupted.
    pub fn set_concurrency(&self, concurrency: usize) {
        self.shared.lock().cfg.concurrency = concurrency;
    }

    /// Changes the per-job timeout for jobs admitted from now on.
    pub fn set_timeout(&self, timeout: Duration) {
        self.shared.lock().cfg.timeout = timeout;
    }

    /// Turns autostart on or off.
    pub fn set_autostart(&self, autostart: bool) {
        self.shared.lock().cfg.autostart = autostart;
    }
}
