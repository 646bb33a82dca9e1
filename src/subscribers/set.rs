//! # SubscriberSet: synchronous, ordered fan-out
//!
//! [`SubscriberSet`] keeps the handlers registered per [`EventKind`] and
//! delivers each [`Event`] to them **in registration order**, synchronously.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns after every matching handler ran.
//! - Handlers registered for the same kind see events in the order they were
//!   registered.
//! - The handler list is snapshotted before delivery: a handler may subscribe or
//!   unsubscribe (itself or others) while an event is being delivered.
//! - Panics inside handlers are caught and logged (isolation).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │  snapshot handlers for ev.kind()
//!        ├──► handler #1 ─► on_event()
//!        ├──► handler #2 ─► on_event()
//!        └──► handler #N ─► on_event()
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Handle returned by a subscription; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry<T> {
    id: SubscriptionId,
    kind: EventKind,
    sub: Arc<dyn Subscribe<T>>,
}

/// Ordered set of subscribers keyed by event kind.
pub struct SubscriberSet<T> {
    entries: Mutex<Vec<Entry<T>>>,
    next_id: AtomicU64,
}

impl<T: 'static> Default for SubscriberSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SubscriberSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `sub` for events of `kind`.
    pub fn subscribe(&self, kind: EventKind, sub: Arc<dyn Subscribe<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push(Entry { id, kind, sub });
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// True if at least one handler is registered for `kind`.
    pub fn has_subscribers(&self, kind: EventKind) -> bool {
        self.entries().iter().any(|e| e.kind == kind)
    }

    /// Delivers `event` to every handler registered for its kind.
    ///
    /// Returns the number of handlers the event was delivered to.
    pub fn emit(&self, event: &Event<T>) -> usize {
        let kind = event.kind();
        let targets: Vec<Arc<dyn Subscribe<T>>> = self
            .entries()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| Arc::clone(&e.sub))
            .collect();

        for sub in &targets {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                tracing::warn!(
                    subscriber = sub.name(),
                    event = %kind,
                    panic = ?panic,
                    "subscriber panicked"
                );
            }
        }
        targets.len()
    }

    /// True if there are no subscriptions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn end() -> Event<u32> {
        Event::End { error: None }
    }

    #[test]
    fn delivers_in_registration_order() {
        let set = SubscriberSet::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let seen = Arc::clone(&seen);
            set.subscribe(
                EventKind::End,
                Arc::new(move |_: &Event<u32>| seen.lock().unwrap().push(n)),
            );
        }

        assert_eq!(set.emit(&end()), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn filters_by_kind() {
        let set = SubscriberSet::<u32>::new();
        set.subscribe(EventKind::Error, Arc::new(|_: &Event<u32>| {}));

        assert!(set.has_subscribers(EventKind::Error));
        assert!(!set.has_subscribers(EventKind::End));
        assert_eq!(set.emit(&end()), 0);
    }

    #[test]
    fn unsubscribe_removes_once() {
        let set = SubscriberSet::<u32>::new();
        let id = set.subscribe(EventKind::End, Arc::new(|_: &Event<u32>| {}));

        assert_eq!(set.len(), 1);
        assert!(set.unsubscribe(id));
        assert!(!set.unsubscribe(id));
        assert!(set.is_empty());
    }

    #[test]
    fn panicking_subscriber_does_not_stop_delivery() {
        let set = SubscriberSet::<u32>::new();
        let hits = Arc::new(Mutex::new(0));

        set.subscribe(
            EventKind::End,
            Arc::new(|_: &Event<u32>| panic!("subscriber failure")),
        );
        let h = Arc::clone(&hits);
        set.subscribe(
            EventKind::End,
            Arc::new(move |_: &Event<u32>| *h.lock().unwrap() += 1),
        );

        assert_eq!(set.emit(&end()), 2);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn subscriber_may_unsubscribe_itself_during_delivery() {
        let set = Arc::new(SubscriberSet::<u32>::new());
        let hits = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let (s, h, sl) = (Arc::clone(&set), Arc::clone(&hits), Arc::clone(&slot));
        let id = set.subscribe(
            EventKind::End,
            Arc::new(move |_: &Event<u32>| {
                *h.lock().unwrap() += 1;
                if let Some(id) = *sl.lock().unwrap() {
                    s.unsubscribe(id);
                }
            }),
        );
        *slot.lock().unwrap() = Some(id);

        set.emit(&end());
        set.emit(&end());
        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
