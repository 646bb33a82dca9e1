//! # jobvisor
//!
//! **jobvisor** is a bounded-concurrency job scheduler for Tokio.
//!
//! Callers enqueue asynchronous jobs; the scheduler runs at most N of them at
//! once, tracks each job's completion (success, error or timeout), collects
//! results at stable indices and publishes lifecycle events. It is meant to be
//! embedded in larger programs (crawlers, batch pipelines) that need controlled
//! parallelism without writing their own admission logic.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    JobFn     │   │  CallbackFn  │   │   impl Job   │
//!     │ (future job) │   │(callback job)│   │   (custom)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ push / prepend / splice              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - JobStore (pending jobs, FIFO)                                  │
//! │  - admission (running < concurrency)                              │
//! │  - results (one slot per admitted job)                            │
//! │  - session epoch (invalidates in-flight work on end)              │
//! │  - SubscriberSet (Error / Success / Timeout / End)                │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  job + timer │   │  job + timer │   │  job + timer │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Completion       │ Completion       │ Completion     (first outcome wins)
//!      ▼                  ▼                  ▼
//!   Error / Success ──► subscribers (sync, registration order) ──► admission again
//! ```
//!
//! ### Lifecycle
//! ```text
//! start()
//! loop {
//!   ├─► at capacity?                      ─► wait for a completion
//!   ├─► store empty and nothing running?  ─► session += 1, publish End
//!   ├─► shift job, slot = results.len(), running += 1, arm timeout
//!   └─► job.spawn(next)
//! }
//!
//! next.complete(outcome)     (callback, future output, or timeout)
//!   ├─ stale session / already completed ─► ignored
//!   ├─ running -= 1, disarm timer
//!   ├─ Err ─► publish Error
//!   ├─ Ok (not timed out) ─► results[slot] = values, publish Success
//!   └─ same session? drained ─► End | is_running ─► admission
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                       |
//! |-------------------|--------------------------------------------------------------|------------------------------------------|
//! | **Scheduling**    | Admission, store mutations, start/stop/end.                  | [`Scheduler`], [`SchedulerConfig`]       |
//! | **Jobs**          | Future-style and callback-style jobs, custom jobs.           | [`Job`], [`JobFn`], [`CallbackFn`]       |
//! | **Completion**    | One-shot, session-tagged completion handle.                  | [`Completion`]                           |
//! | **Events**        | Typed lifecycle events with synchronous delivery.            | [`Event`], [`EventKind`], [`Subscribe`]  |
//! | **Errors**        | Job failures, timeouts, panics, aborts.                      | [`JobError`]                             |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that logs through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use jobvisor::{Event, EventKind, JobError, JobFn, Scheduler, SchedulerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), JobError> {
//!     let cfg = SchedulerConfig {
//!         concurrency: 2,
//!         timeout: Duration::from_secs(5),
//!         ..SchedulerConfig::default()
//!     };
//!     let scheduler = Scheduler::<String>::new(cfg);
//!
//!     scheduler.on(EventKind::Success, |ev: &Event<String>| {
//!         if let Event::Success { value, index, .. } = ev {
//!             println!("job #{index} returned {value:?}");
//!         }
//!     });
//!
//!     for path in ["/", "/about", "/contact"] {
//!         scheduler.push(JobFn::arc(path, move |_ctx: CancellationToken| async move {
//!             Ok::<_, JobError>(format!("GET {path}"))
//!         }));
//!     }
//!
//!     let results = scheduler.run().await?;
//!     assert_eq!(results.len(), 3);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod jobs;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Completion, Results, Scheduler, SchedulerBuilder, SchedulerConfig};
pub use error::JobError;
pub use events::{Event, EventKind};
pub use jobs::{BoxJobFuture, CallbackFn, Job, JobFn, JobRef, JobStore};
pub use subscribers::{Subscribe, SubscriberSet, SubscriptionId};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
