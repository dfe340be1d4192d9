//! Time subsystem.
//!
//! Converts wall-clock sampling into whole fixed-size simulation steps.
//! Intended usage:
//! - one `StepClock` per loop driver
//! - `update()` once per frame, run `pending_steps()` fixed updates, `consume()`
//!
//! The clock reads time through a `TimeSource` so tests and replays can feed
//! deterministic timestamps with `ManualTime`.

mod source;
mod step_clock;

pub use source::{ManualTime, MonotonicTime, TimeSource};
pub use step_clock::{StepClock, DEFAULT_UPS, NANOS_PER_SECOND};
