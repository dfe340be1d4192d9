use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic nanosecond timestamp provider.
pub trait TimeSource {
    /// Nanoseconds since an arbitrary, fixed origin. Never decreases.
    fn now_nanos(&self) -> u64;
}

/// Wall-clock source backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_nanos(&self) -> u64 {
        // u64 nanoseconds cover ~584 years of uptime.
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Hand-driven time source.
///
/// Clones share the same timestamp, so a test can keep one clone and advance
/// it while the clock owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Rc<Cell<u64>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.advance_nanos(by.as_nanos() as u64);
    }

    pub fn advance_nanos(&self, nanos: u64) {
        self.now.set(self.now.get().saturating_add(nanos));
    }

    pub fn set_nanos(&self, nanos: u64) {
        debug_assert!(nanos >= self.now.get(), "ManualTime must not run backwards");
        self.now.set(nanos);
    }
}

impl TimeSource for ManualTime {
    fn now_nanos(&self) -> u64 {
        self.now.get()
    }
}
