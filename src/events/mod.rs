//! Scheduler events: classification and typed payloads.
//!
//! ## Contents
//! - [`EventKind`] the four notification kinds (`Error`, `Success`, `Timeout`, `End`)
//! - [`Event`] payload carried by each kind
//!
//! ## Quick reference
//! - **Publisher**: the scheduler core (runner, timeout timers, done transition).
//! - **Consumers**: subscribers registered through [`Scheduler::on`](crate::Scheduler::on),
//!   delivered synchronously in registration order by [`SubscriberSet`](crate::SubscriberSet).

mod event;

pub use event::{Event, EventKind};
