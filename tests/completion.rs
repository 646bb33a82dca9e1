mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobvisor::{CallbackFn, Completion, Event, EventKind, JobError, JobFn, JobRef, Scheduler};
use tokio_util::sync::CancellationToken;

use common::{advance, config, count, delayed, detached, ends, failing, hits, never};

/// Callback job that parks its completion handle for the test to drive.
fn parked(name: &'static str, slot: Arc<Mutex<Option<Completion<u32>>>>) -> JobRef<u32> {
    CallbackFn::arc(name, move |next: Completion<u32>| {
        *slot.lock().unwrap() = Some(next);
    })
}

fn take(slot: &Arc<Mutex<Option<Completion<u32>>>>) -> Completion<u32> {
    slot.lock().unwrap().take().expect("job was started")
}

#[tokio::test]
async fn only_the_first_completion_counts() {
    let scheduler = Scheduler::new(config(1, 0));
    let successes = count(&scheduler, EventKind::Success);
    let errors = count(&scheduler, EventKind::Error);
    let ended = ends(&scheduler);
    let slot = Arc::new(Mutex::new(None));

    scheduler.push(parked("double", Arc::clone(&slot)));
    scheduler.start();
    let next = take(&slot);
    let twin = next.clone();

    assert!(next.ok(1));
    assert!(!next.ok(2));
    assert!(!twin.fail("late failure"));
    assert!(twin.is_completed());

    assert_eq!(scheduler.results(), vec![Some(vec![1])]);
    assert_eq!(hits(&successes), 1);
    assert_eq!(hits(&errors), 0);
    assert_eq!(*ended.lock().unwrap(), vec![None]);
    assert_eq!(scheduler.running_count(), 0);
}

#[tokio::test]
async fn success_event_carries_first_value_and_slot() {
    let scheduler = Scheduler::new(config(0, 0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    scheduler.on(EventKind::Success, move |ev: &Event<u32>| {
        if let Event::Success { value, job, index } = ev {
            sink.lock().unwrap().push((*value, job.name().to_string(), *index));
        }
    });

    scheduler.push(CallbackFn::arc("many", |next: Completion<u32>| {
        next.ok_many(vec![1, 2, 3]);
    }));
    scheduler.push(CallbackFn::arc("nothing", |next: Completion<u32>| {
        next.finish();
    }));
    scheduler.start();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Some(1), "many".to_string(), 0), (None, "nothing".to_string(), 1)]
    );
    assert_eq!(scheduler.results(), vec![Some(vec![1, 2, 3]), Some(vec![])]);
}

#[tokio::test(start_paused = true)]
async fn unobserved_errors_do_not_stop_the_batch() {
    let scheduler = Scheduler::new(config(1, 0));
    let ended = ends(&scheduler);

    scheduler.push(failing("first", 5));
    scheduler.push(delayed(1, 5));
    scheduler.start();
    advance(50).await;

    assert_eq!(scheduler.results(), vec![None, Some(vec![1])]);
    assert_eq!(*ended.lock().unwrap(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn error_event_reports_job_and_slot() {
    let scheduler = Scheduler::new(config(2, 0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    scheduler.on(EventKind::Error, move |ev: &Event<u32>| {
        if let Event::Error { error, index, .. } = ev {
            sink.lock().unwrap().push((error.clone(), *index));
        }
    });

    scheduler.push(delayed(0, 5));
    scheduler.push(failing("bad gateway", 5));
    scheduler.start();
    advance(20).await;

    assert_eq!(*seen.lock().unwrap(), vec![(JobError::fail("bad gateway"), 1)]);
    assert_eq!(scheduler.results(), vec![Some(vec![0]), None]);
}

#[tokio::test(start_paused = true)]
async fn timed_out_job_without_listener_is_abandoned() {
    let scheduler = Scheduler::new(config(1, 10));
    let successes = count(&scheduler, EventKind::Success);
    let errors = count(&scheduler, EventKind::Error);
    let ended = ends(&scheduler);
    let accepted = Arc::new(Mutex::new(Vec::new()));

    scheduler.push(detached(9, 50, Arc::clone(&accepted)));
    scheduler.start();

    advance(20).await;
    assert_eq!(*ended.lock().unwrap(), vec![None]);
    assert_eq!(scheduler.running_count(), 0);

    advance(50).await;
    assert_eq!(*accepted.lock().unwrap(), vec![false]);
    assert_eq!(scheduler.results(), vec![None]);
    assert_eq!(hits(&successes), 0);
    assert_eq!(hits(&errors), 0);
    assert_eq!(ended.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn never_ending_job_ends_once_after_timeout() {
    let scheduler = Scheduler::new(config(2, 10));
    let ended = ends(&scheduler);

    scheduler.push(never());
    scheduler.push(delayed(1, 5));
    let results = scheduler.run().await.expect("timeouts are not errors");

    advance(100).await;
    assert_eq!(results, vec![None, Some(vec![1])]);
    assert_eq!(*ended.lock().unwrap(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn abandoning_a_job_cancels_its_token() {
    let scheduler = Scheduler::new(config(1, 10));
    let token = Arc::new(Mutex::new(None::<CancellationToken>));
    let sink = Arc::clone(&token);

    scheduler.push(CallbackFn::arc("stuck", move |next: Completion<u32>| {
        *sink.lock().unwrap() = Some(next.token());
    }));
    scheduler.start();

    let token = token.lock().unwrap().clone().expect("job was started");
    assert!(!token.is_cancelled());
    advance(20).await;
    assert!(token.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn timeout_listener_can_fail_the_job() {
    let scheduler = Scheduler::new(config(1, 10));
    scheduler.on(EventKind::Timeout, |ev: &Event<u32>| {
        if let Event::Timeout { next, .. } = ev {
            assert!(next.timed_out());
            next.fail(JobError::Timeout {
                timeout: Duration::from_millis(10),
            });
        }
    });

    scheduler.push(never());
    scheduler.push(delayed(1, 5));
    let outcome = scheduler.run().await;

    assert_eq!(
        outcome,
        Err(JobError::Timeout {
            timeout: Duration::from_millis(10)
        })
    );
    assert_eq!(scheduler.queued(), 0);
    assert_eq!(scheduler.results(), vec![None]);
}

#[tokio::test(start_paused = true)]
async fn timeout_listener_finishing_records_nothing() {
    let scheduler = Scheduler::new(config(1, 10));
    let successes = count(&scheduler, EventKind::Success);
    let timeouts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&timeouts);
    scheduler.on(EventKind::Timeout, move |ev: &Event<u32>| {
        if let Event::Timeout { next, job, index } = ev {
            sink.lock().unwrap().push((job.name().to_string(), *index));
            next.ok(42);
        }
    });

    scheduler.push(never());
    let results = scheduler.run().await.expect("batch drains");

    assert_eq!(results, vec![None]);
    assert_eq!(hits(&successes), 0);
    assert_eq!(*timeouts.lock().unwrap(), vec![("never".to_string(), 0)]);
}

#[tokio::test(start_paused = true)]
async fn job_finishing_in_time_never_times_out() {
    let scheduler = Scheduler::new(config(1, 50));
    let timeouts = count(&scheduler, EventKind::Timeout);

    scheduler.push(delayed(3, 10));
    let results = scheduler.run().await.expect("batch succeeds");
    advance(200).await;

    assert_eq!(results, vec![Some(vec![3])]);
    assert_eq!(hits(&timeouts), 0);
}

#[tokio::test(start_paused = true)]
async fn panicking_future_fails_the_job() {
    let scheduler = Scheduler::new(config(1, 0));
    let job: JobRef<u32> = JobFn::arc("explodes", |_ctx: CancellationToken| async {
        advance(1).await;
        if !std::hint::black_box(false) {
            panic!("kaboom");
        }
        Ok::<u32, JobError>(0)
    });
    scheduler.push(job);

    let outcome = scheduler.run().await;
    assert_eq!(
        outcome,
        Err(JobError::Panicked {
            info: "kaboom".into()
        })
    );
}

#[tokio::test]
async fn panicking_callback_fails_the_job() {
    let scheduler = Scheduler::new(config(1, 0));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    scheduler.on(EventKind::Error, move |ev: &Event<u32>| {
        sink.lock().unwrap().push(ev.error().cloned());
    });

    scheduler.push(CallbackFn::arc("explodes", |_next: Completion<u32>| {
        panic!("sync kaboom");
    }));
    scheduler.push(CallbackFn::arc("fine", |next: Completion<u32>| {
        next.ok(1);
    }));
    scheduler.start();

    assert_eq!(
        *errors.lock().unwrap(),
        vec![Some(JobError::Panicked {
            info: "sync kaboom".into()
        })]
    );
    assert_eq!(scheduler.results(), vec![None, Some(vec![1])]);
}

#[tokio::test]
async fn completion_outliving_scheduler_is_inert() {
    let slot = Arc::new(Mutex::new(None));
    {
        let scheduler = Scheduler::new(config(1, 0));
        scheduler.push(parked("orphan", Arc::clone(&slot)));
        scheduler.start();
    }
    let next = take(&slot);
    assert!(!next.ok(1));
    assert_eq!(next.index(), 0);
    assert_eq!(next.session(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn expiry_racing_a_failure_publishes_one_outcome() {
    const JOBS: usize = 200;
    let scheduler = Scheduler::new(config(0, 1));
    let errors = count(&scheduler, EventKind::Error);
    let ended = ends(&scheduler);
    let reports = Arc::new(Mutex::new(Vec::new()));

    for i in 0..JOBS {
        let reports = Arc::clone(&reports);
        scheduler.push(CallbackFn::arc(format!("racer-{i}"), move |next: Completion<u32>| {
            let reports = Arc::clone(&reports);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                let accepted = next.fail("failed at the deadline");
                reports.lock().unwrap().push((accepted, next.timed_out()));
            });
        }));
    }
    scheduler.start();

    let settled = || ended.lock().unwrap().len() == 1 && reports.lock().unwrap().len() == JOBS;
    tokio::time::timeout(Duration::from_secs(10), async {
        while !settled() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("batch settles");

    let reports = reports.lock().unwrap();
    let accepted = reports.iter().filter(|(accepted, _)| *accepted).count();
    assert!(
        reports.iter().all(|(accepted, timed_out)| !(*accepted && *timed_out)),
        "a failure was honored for a job that had already timed out"
    );
    assert_eq!(hits(&errors), accepted);
    assert_eq!(scheduler.running_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn failure_after_abandonment_is_discarded() {
    let scheduler = Scheduler::new(config(2, 10));
    let errors = count(&scheduler, EventKind::Error);
    let slot = Arc::new(Mutex::new(None));

    scheduler.push(parked("slow", Arc::clone(&slot)));
    scheduler.push(never());
    scheduler.start();
    let next = take(&slot);

    advance(15).await;
    assert!(next.timed_out());
    assert!(next.is_completed());
    assert!(!next.fail("too late"));
    assert_eq!(hits(&errors), 0);
    assert_eq!(scheduler.running_count(), 0);
}
