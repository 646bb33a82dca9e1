//! # Admission controller.
//!
//! Brings the running count up to the concurrency limit by pulling jobs from
//! the front of the store, one at a time.
//!
//! ## Flow
//! ```text
//! pump()
//!   ├─► lock: is_running = true
//!   ├─► another pump on the stack? ─► return (it re-reads the state next step)
//!   └─► loop {
//!         ├─► lock: stopped or at capacity        ─► return
//!         ├─► store empty?
//!         │     ├─ running == 0                   ─► finish session, publish End, return
//!         │     └─ otherwise                      ─► return (a completion re-enters later)
//!         ├─► shift job, allocate result slot, running += 1, arm timer
//!         └─► launch job                          (lock released)
//!       }
//! ```
//!
//! ## Rules
//! - Jobs are pulled strictly in store order.
//! - The capacity check and the increment happen in the same critical section,
//!   so `running_count` never exceeds the limit.
//! - The drain check and the session advance happen in the same critical
//!   section, so a batch ends exactly once.
//! - At most one admission loop runs at a time. A job completing synchronously
//!   inside `launch` asks for admission again; that request returns at once and
//!   the running loop picks the freed slot up, so stack depth stays flat.

use std::sync::Arc;

use crate::core::{
    completion::Completion,
    runner::{Launch, arm_timeout},
    state::{Follow, Shared},
};

/// Outcome of one admission step.
enum Admit<T> {
    /// A job was admitted and must be launched.
    Launch(Launch<T>),
    /// Store and running set are empty; the batch is over.
    Drained,
    /// Nothing to do right now.
    Idle,
}

impl<T> Shared<T>
where
    T: Clone + Send + 'static,
{
    /// Runs admission until capacity or the store is exhausted.
    pub(crate) fn pump(self: &Arc<Self>) {
        {
            let mut st = self.lock();
            st.is_running = true;
            if st.pumping {
                return;
            }
            st.pumping = true;
        }

        loop {
            match self.admit() {
                Admit::Launch(launch) => launch.run(),
                Admit::Drained => {
                    self.publish_end(None);
                    return;
                }
                Admit::Idle => return,
            }
        }
    }

    /// Acts on the step a completion or an expiry decided under the lock.
    pub(crate) fn settle(self: &Arc<Self>, follow: Follow) {
        match follow {
            Follow::Done => self.publish_end(None),
            Follow::Admit => self.pump(),
            Follow::Nothing => {}
        }
    }

    /// One admission step, entirely under the state lock.
    ///
    /// Any outcome other than `Launch` ends the loop and releases `pumping`.
    fn admit(self: &Arc<Self>) -> Admit<T> {
        let mut st = self.lock();

        if !st.is_running || st.cfg.at_capacity(st.running_count) {
            st.pumping = false;
            return Admit::Idle;
        }

        let Some(job) = st.store.shift() else {
            st.pumping = false;
            if st.running_count == 0 {
                st.finish_session();
                return Admit::Drained;
            }
            return Admit::Idle;
        };

        let index = st.results.len();
        st.results.push(None);
        st.running_count += 1;

        let session = st.session;
        let token = st.session_token.child_token();
        let timer = st.cfg.job_timeout().map(|timeout| {
            let timer_token = token.child_token();
            (st.arm_timer(timer_token.clone()), timer_token, timeout)
        });

        let completion = Completion::new(
            Arc::downgrade(self),
            Arc::clone(&job),
            session,
            index,
            timer.as_ref().map(|(id, _, _)| *id),
            token,
        );
        if let Some((_, timer_token, timeout)) = timer {
            arm_timeout(completion.clone(), timer_token, timeout);
        }

        tracing::debug!(
            job = job.name(),
            index,
            session,
            running = st.running_count,
            queued = st.store.len(),
            "job admitted"
        );
        Admit::Launch(Launch::new(job, completion))
    }
}
