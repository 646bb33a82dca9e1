use std::sync::Arc;

use crate::{
    core::{config::SchedulerConfig, scheduler::Scheduler, state::Results},
    events::EventKind,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Scheduler`] with pre-seeded results and subscribers.
pub struct SchedulerBuilder<T> {
    cfg: SchedulerConfig,
    results: Results<T>,
    subscribers: Vec<(EventKind, Arc<dyn Subscribe<T>>)>,
}

impl<T> SchedulerBuilder<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            results: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Seeds the result slots; admitted jobs get indices after these.
    pub fn with_results(mut self, results: Results<T>) -> Self {
        self.results = results;
        self
    }

    /// Adds a subscriber for one event kind.
    ///
    /// Subscribers are registered in the order they are added.
    pub fn with_subscriber(mut self, kind: EventKind, sub: Arc<dyn Subscribe<T>>) -> Self {
        self.subscribers.push((kind, sub));
        self
    }

    /// Builds the scheduler. Admission does not start until `start` (or a
    /// store mutation with autostart on).
    pub fn build(self) -> Scheduler<T> {
        let subs = SubscriberSet::new();
        for (kind, sub) in self.subscribers {
            subs.subscribe(kind, sub);
        }
        Scheduler::from_parts(self.cfg, self.results, subs)
    }
}
