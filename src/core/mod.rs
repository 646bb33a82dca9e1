//! Scheduler core: admission, job running and lifecycle.
//!
//! This module contains the state machine behind [`Scheduler`].
//!
//! Internal modules:
//! - [`state`]: shared state behind one mutex, session epochs, timers;
//! - [`admission`]: pulls jobs while capacity remains;
//! - [`runner`]: starts one job, spawns its future and its timeout timer;
//! - [`completion`]: the one-shot completion handle and the post-completion transition;
//! - [`scheduler`]: public handle, store mutations, `start`/`stop`/`end`;
//! - [`builder`]: scheduler construction.

mod admission;
mod builder;
mod completion;
mod config;
mod runner;
mod scheduler;
mod state;

pub use builder::SchedulerBuilder;
pub use completion::Completion;
pub use config::SchedulerConfig;
pub use scheduler::Scheduler;
pub use state::Results;
