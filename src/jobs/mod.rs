//! # Job abstractions and the pending-job store.
//!
//! This module provides the job-related types:
//! - [`Job`] - trait for a unit of work started with a completion handle
//! - [`JobFn`] / [`CallbackFn`] - closure-backed jobs (future and callback style)
//! - [`JobRef`] - shared reference to a job (`Arc<dyn Job<T>>`)
//! - [`JobStore`] - ordered sequence of not-yet-started jobs

mod job;
mod job_fn;
mod store;

pub use job::{BoxJobFuture, Job, JobRef};
pub use job_fn::{CallbackFn, JobFn};
pub use store::JobStore;
