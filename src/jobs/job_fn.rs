//! # Function-backed jobs (`JobFn`, `CallbackFn`)
//!
//! [`JobFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, the future style.
//! [`CallbackFn`] wraps a closure `F: Fn(Completion<T>)`, the callback style.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use jobvisor::{CallbackFn, Completion, JobError, JobFn, JobRef};
//!
//! let fetch: JobRef<u32> = JobFn::arc("fetch", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Err(JobError::aborted("cancelled"));
//!     }
//!     Ok::<u32, JobError>(200)
//! });
//! assert_eq!(fetch.name(), "fetch");
//!
//! let ping: JobRef<u32> = CallbackFn::arc("ping", |next: Completion<u32>| {
//!     next.ok(1);
//! });
//! assert_eq!(ping.name(), "ping");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::Completion;
use crate::error::JobError;
use crate::jobs::job::{BoxJobFuture, Job};

/// Future-style job.
///
/// The closure receives the job's cancellation token, which is cancelled when
/// the job is abandoned after a timeout or when its session ends.
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new future-style job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`](crate::JobRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Debug for JobFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobFn").field("name", &self.name).finish()
    }
}

impl<F, Fut, T> Job<T> for JobFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, next: Completion<T>) -> Option<BoxJobFuture<T>> {
        Some(Box::pin((self.f)(next.token())))
    }
}

/// Callback-style job.
///
/// The closure receives the [`Completion`] and must complete it exactly once,
/// either before returning or later from another task.
pub struct CallbackFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CallbackFn<F> {
    /// Creates a new callback-style job.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Debug for CallbackFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackFn").field("name", &self.name).finish()
    }
}

impl<F, T> Job<T> for CallbackFn<F>
where
    F: Fn(Completion<T>) + Send + Sync + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, next: Completion<T>) -> Option<BoxJobFuture<T>> {
        (self.f)(next);
        None
    }
}
