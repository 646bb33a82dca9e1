//! # Ordered store of not-yet-started jobs.
//!
//! [`JobStore`] is the explicit owned sequence the scheduler pulls from.
//! It exposes only the operations a queue of pending work needs:
//!
//! | Operation                   | Effect                                              |
//! |-----------------------------|-----------------------------------------------------|
//! | `push` / `extend`           | append at the back                                  |
//! | `prepend`                   | insert at the front, keeping argument order         |
//! | `splice`                    | remove a window and insert jobs in its place        |
//! | `pop` / `shift`             | remove from the back / front                        |
//! | `index_of` / `last_index_of`| find a job by identity (same `Arc`)                 |
//! | `reverse` / `slice`         | reorder / keep only a window                        |
//!
//! Indices and counts are clamped to the store bounds; nothing here panics.

use std::collections::VecDeque;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use crate::jobs::job::JobRef;

/// FIFO sequence of pending jobs.
pub struct JobStore<T> {
    jobs: VecDeque<JobRef<T>>,
}

impl<T: 'static> Default for JobStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> JobStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Appends one job. Returns the new length.
    pub fn push(&mut self, job: JobRef<T>) -> usize {
        self.jobs.push_back(job);
        self.jobs.len()
    }

    /// Appends jobs in iteration order. Returns the new length.
    pub fn extend(&mut self, jobs: impl IntoIterator<Item = JobRef<T>>) -> usize {
        self.jobs.extend(jobs);
        self.jobs.len()
    }

    /// Inserts jobs at the front; the first yielded job becomes the new front.
    /// Returns the new length.
    pub fn prepend(&mut self, jobs: impl IntoIterator<Item = JobRef<T>>) -> usize {
        let jobs: Vec<_> = jobs.into_iter().collect();
        for job in jobs.into_iter().rev() {
            self.jobs.push_front(job);
        }
        self.jobs.len()
    }

    /// Removes up to `remove` jobs starting at `index` and inserts `insert` there.
    ///
    /// `index` is clamped to the length; returns the removed jobs.
    pub fn splice(
        &mut self,
        index: usize,
        remove: usize,
        insert: impl IntoIterator<Item = JobRef<T>>,
    ) -> Vec<JobRef<T>> {
        let index = index.min(self.jobs.len());
        let mut tail = self.jobs.split_off(index);
        let remove = remove.min(tail.len());
        let removed: Vec<_> = tail.drain(..remove).collect();
        self.jobs.extend(insert);
        self.jobs.append(&mut tail);
        removed
    }

    /// Removes and returns the last job.
    pub fn pop(&mut self) -> Option<JobRef<T>> {
        self.jobs.pop_back()
    }

    /// Removes and returns the first job.
    pub fn shift(&mut self) -> Option<JobRef<T>> {
        self.jobs.pop_front()
    }

    /// Position of the first occurrence of `job` (compared by identity).
    pub fn index_of(&self, job: &JobRef<T>) -> Option<usize> {
        self.jobs.iter().position(|j| same_job(j, job))
    }

    /// Position of the last occurrence of `job` (compared by identity).
    pub fn last_index_of(&self, job: &JobRef<T>) -> Option<usize> {
        self.jobs.iter().rposition(|j| same_job(j, job))
    }

    /// Reverses the order of pending jobs.
    pub fn reverse(&mut self) {
        self.jobs.make_contiguous().reverse();
    }

    /// Keeps only the jobs inside `range` (clamped; an inverted range empties the store).
    pub fn slice(&mut self, range: impl RangeBounds<usize>) {
        let len = self.jobs.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(len);
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        }
        .min(len);

        self.jobs = if start < end {
            self.jobs.drain(start..end).collect()
        } else {
            VecDeque::new()
        };
    }

    /// Drops every pending job.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if no job is pending.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Iterates pending jobs front to back.
    pub fn iter(&self) -> impl Iterator<Item = &JobRef<T>> {
        self.jobs.iter()
    }
}

fn same_job<T>(a: &JobRef<T>, b: &JobRef<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
