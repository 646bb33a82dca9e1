//! # Event subscribers for the scheduler.
//!
//! This module provides the [`Subscribe`] trait, the ordered [`SubscriberSet`]
//! used by every scheduler, and an optional built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   completion / timer / done ── Event ──► SubscriberSet::emit
//!                                                │  (synchronous, registration order)
//!                                    ┌───────────┼───────────┬──────────┐
//!                                    ▼           ▼           ▼          ▼
//!                               LogWriter   start_with   closures    custom
//!                                           bridge
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobvisor::{Event, Subscribe};
//!
//! struct Metrics;
//!
//! impl Subscribe<u64> for Metrics {
//!     fn on_event(&self, event: &Event<u64>) {
//!         if let Event::Error { .. } = event {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::{SubscriberSet, SubscriptionId};
pub use subscribe::Subscribe;
