//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging event handlers into a
//! scheduler. Handlers are called **synchronously**, on the thread that caused
//! the transition, in registration order.
//!
//! ## Contract
//! - Handlers should be quick: the scheduler does not continue the transition
//!   that published the event until every handler returned.
//! - Handlers may call back into the scheduler (`end`, `stop`, `push`, completing
//!   a timed-out job); no scheduler lock is held while they run.
//! - A panicking handler is isolated and logged; the remaining handlers still run.
//!
//! Any `Fn(&Event<T>) + Send + Sync + 'static` closure is a subscriber.
//!
//! ## Example
//! ```rust
//! use jobvisor::{Event, Subscribe};
//!
//! struct Audit;
//!
//! impl Subscribe<String> for Audit {
//!     fn on_event(&self, ev: &Event<String>) {
//!         let _ = ev.kind();
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use crate::events::Event;

/// Contract for event subscribers.
pub trait Subscribe<T>: Send + Sync + 'static {
    /// Handle a single event.
    fn on_event(&self, event: &Event<T>);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T, F> Subscribe<T> for F
where
    F: Fn(&Event<T>) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<T>) {
        self(event)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
