//! # Example: crawl
//!
//! Simulated crawler: fetches a handful of pages three at a time, gives each
//! page 300ms, and reports slow pages instead of failing the batch.
//!
//! Demonstrates how to:
//! - Define future-style jobs with [`JobFn`] and callback-style jobs with [`CallbackFn`].
//! - Bound parallelism with [`SchedulerConfig::concurrency`].
//! - Take over timeouts with an [`EventKind::Timeout`] subscriber.
//! - Log every lifecycle event with [`LogWriter`].
//! - Collect results with [`Scheduler::run`].
//!
//! ## Flow
//! ```text
//! push(fetch /, /docs, /blog, /slow, /about, robots)
//!   └─► run()
//!        ├─► admit 3 jobs
//!        ├─► Success  ─► admit next
//!        ├─► Timeout  ─► handler finishes the job (no result)
//!        └─► End      ─► results
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example crawl --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use jobvisor::{
    CallbackFn, Completion, Event, EventKind, JobError, JobFn, JobRef, LogWriter, Scheduler,
    SchedulerConfig,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pretends to download `path`, taking `latency_ms`.
fn fetch(path: &'static str, latency_ms: u64) -> JobRef<String> {
    JobFn::arc(format!("fetch:{path}"), move |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Err(JobError::aborted("cancelled")),
            _ = tokio::time::sleep(Duration::from_millis(latency_ms)) => {
                if path.ends_with("admin") {
                    return Err(JobError::fail("403 forbidden"));
                }
                Ok(format!("<html>{path}</html>"))
            }
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. Three pages in flight, 300ms per page
    let cfg = SchedulerConfig {
        concurrency: 3,
        timeout: Duration::from_millis(300),
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::<String>::new(cfg);

    // 2. Log errors, successes and the end of the batch
    scheduler.observe(Arc::new(LogWriter::new()));

    // 3. Slow pages are skipped rather than failing the crawl
    scheduler.on(EventKind::Timeout, |ev: &Event<String>| {
        if let Event::Timeout { next, job, .. } = ev {
            println!("[crawl] giving up on {}", job.name());
            next.token().cancel();
            next.finish();
        }
    });

    // 4. Queue the pages; robots.txt is checked first
    scheduler.extend([
        fetch("/", 120),
        fetch("/docs", 200),
        fetch("/blog", 80),
        fetch("/slow", 2_000),
        fetch("/about", 50),
    ]);
    scheduler.prepend([CallbackFn::arc(
        "robots.txt",
        |next: Completion<String>| {
            next.ok_many(vec!["User-agent: *".into(), "Allow: /".into()]);
        },
    ) as JobRef<String>]);

    // 5. Run the batch to its end
    let results = scheduler.run().await?;
    for (index, pages) in results.iter().enumerate() {
        match pages {
            Some(values) => println!("[crawl] #{index}: {}", values.join(" | ")),
            None => println!("[crawl] #{index}: skipped"),
        }
    }
    Ok(())
}
