//! # Job abstraction.
//!
//! This module defines the [`Job`] trait, the unit of work a scheduler runs.
//! The common handle type is [`JobRef`], an `Arc<dyn Job<T>>` shared between the
//! store, the runner and the events that mention the job.
//!
//! A job may report completion through two channels, both feeding the same
//! [`Completion`]:
//! - by calling the completion handle it receives (callback style);
//! - by returning a future whose output is fed into the handle (future style).
//!
//! Only the first completion is honored, whichever channel it arrives through.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{core::Completion, error::JobError};

/// Boxed future returned by future-style jobs.
pub type BoxJobFuture<T> = BoxFuture<'static, Result<T, JobError>>;

/// Shared handle to a job.
pub type JobRef<T> = Arc<dyn Job<T>>;

/// # Asynchronous unit of work.
///
/// `spawn` is called exactly once, synchronously, when the job is admitted.
/// The implementation either keeps `next` and completes it later, or returns a
/// future the scheduler drives on the Tokio runtime.
///
/// # Example
/// ```
/// use jobvisor::{BoxJobFuture, Completion, Job};
///
/// struct Ping;
///
/// impl Job<&'static str> for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     fn spawn(&self, next: Completion<&'static str>) -> Option<BoxJobFuture<&'static str>> {
///         next.ok("pong");
///         None
///     }
/// }
/// ```
pub trait Job<T>: Send + Sync + 'static {
    /// Returns a human-readable job name (for logs).
    fn name(&self) -> &str;

    /// Starts the job.
    ///
    /// Returning `Some(future)` hands the completion to the scheduler: `Ok(v)`
    /// completes `next` with `[v]`, `Err(e)` fails it with `e`.
    fn spawn(&self, next: Completion<T>) -> Option<BoxJobFuture<T>>;
}
