//! Shared test doubles and utilities for the storefront.

mod clock;
mod event_log;

pub use clock::FixedClock;
pub use event_log::{FailingEventLog, RecordingEventLog};
