#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobvisor::{
    CallbackFn, Completion, Event, EventKind, JobError, JobFn, JobRef, Scheduler, SchedulerConfig,
};
use tokio_util::sync::CancellationToken;

pub fn config(concurrency: usize, timeout_ms: u64) -> SchedulerConfig {
    SchedulerConfig {
        concurrency,
        timeout: Duration::from_millis(timeout_ms),
        ..SchedulerConfig::default()
    }
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Future job resolving to `value` after `ms`.
pub fn delayed(value: u32, ms: u64) -> JobRef<u32> {
    JobFn::arc(format!("delayed-{value}"), move |_ctx: CancellationToken| async move {
        advance(ms).await;
        Ok::<u32, JobError>(value)
    })
}

/// Future job rejecting with `msg` after `ms`.
pub fn failing(msg: &'static str, ms: u64) -> JobRef<u32> {
    JobFn::arc(format!("failing-{msg}"), move |_ctx: CancellationToken| async move {
        advance(ms).await;
        Err::<u32, JobError>(JobError::fail(msg))
    })
}

/// Future job that never resolves.
pub fn never() -> JobRef<u32> {
    JobFn::arc("never", |_ctx: CancellationToken| async {
        std::future::pending::<()>().await;
        Ok::<u32, JobError>(0)
    })
}

/// Callback job completing with `value` after `ms`, from a detached task.
///
/// The detached task ignores cancellation; `accepted` records whether its
/// completion was honored.
pub fn detached(value: u32, ms: u64, accepted: Arc<Mutex<Vec<bool>>>) -> JobRef<u32> {
    CallbackFn::arc(format!("detached-{value}"), move |next: Completion<u32>| {
        let accepted = Arc::clone(&accepted);
        tokio::spawn(async move {
            advance(ms).await;
            let ok = next.ok(value);
            accepted.lock().unwrap().push(ok);
        });
    })
}

/// Counts events of `kind`.
pub fn count<T: Clone + Send + 'static>(s: &Scheduler<T>, kind: EventKind) -> Arc<AtomicUsize> {
    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    s.on(kind, move |_: &Event<T>| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    counter
}

/// Collects the error carried by every `End` event.
pub fn ends<T: Clone + Send + 'static>(s: &Scheduler<T>) -> Arc<Mutex<Vec<Option<JobError>>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    s.on(EventKind::End, move |ev: &Event<T>| {
        sink.lock().unwrap().push(ev.error().cloned());
    });
    seen
}

pub fn hits(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
