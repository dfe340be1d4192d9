use std::time::Duration;

use crate::error::{EngineError, Result};

use super::source::{MonotonicTime, TimeSource};

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Default simulation rate (updates per second).
pub const DEFAULT_UPS: f32 = 60.0;

/// Fixed-step accumulator.
///
/// Each `update()` samples the time source, adds the elapsed time to the
/// accumulator and computes how many whole steps of `update_interval` are due.
/// The caller runs exactly that many fixed updates and then calls `consume()`,
/// which leaves `0 <= accumulated < interval`.
///
/// Pending steps are unbounded by default: a long stall (debugger, suspended
/// process) produces a long catch-up batch. `with_step_limit` caps the batch
/// and drops the excess time instead.
#[derive(Debug, Clone)]
pub struct StepClock<S: TimeSource = MonotonicTime> {
    source: S,

    previous: u64,
    current: u64,
    delta: u64,
    accumulated: u64,

    rate: f32,
    interval: u64,

    pending: u32,
    // Interval the pending steps were computed with; `consume` uses it so a
    // rate change between `update` and `consume` is never applied retroactively.
    pending_interval: u64,

    step_limit: Option<u32>,
    started: bool,
}

impl StepClock<MonotonicTime> {
    /// Creates a wall-clock driven clock targeting `ups` updates per second.
    pub fn new(ups: f32) -> Result<Self> {
        Self::with_source(MonotonicTime::new(), ups)
    }
}

impl Default for StepClock<MonotonicTime> {
    fn default() -> Self {
        let interval = interval_for(DEFAULT_UPS);
        Self::from_parts(MonotonicTime::new(), DEFAULT_UPS, interval)
    }
}

impl<S: TimeSource> StepClock<S> {
    pub fn with_source(source: S, ups: f32) -> Result<Self> {
        validate_rate(ups)?;
        Ok(Self::from_parts(source, ups, interval_for(ups)))
    }

    fn from_parts(source: S, rate: f32, interval: u64) -> Self {
        Self {
            source,
            previous: 0,
            current: 0,
            delta: 0,
            accumulated: 0,
            rate,
            interval,
            pending: 0,
            pending_interval: interval,
            step_limit: None,
            started: false,
        }
    }

    /// Caps the number of steps a single `update()` may schedule.
    ///
    /// Time beyond the cap is discarded (only the sub-step remainder is kept).
    pub fn with_step_limit(mut self, limit: u32) -> Self {
        self.step_limit = Some(limit.max(1));
        self
    }

    pub fn set_step_limit(&mut self, limit: Option<u32>) {
        self.step_limit = limit.map(|l| l.max(1));
    }

    /// Captures the baseline timestamp. Call once before the first `update()`.
    pub fn start(&mut self) {
        let now = self.source.now_nanos();
        self.previous = now;
        self.current = now;
        self.delta = 0;
        self.started = true;
    }

    /// Samples the time source and recomputes the pending step count.
    pub fn update(&mut self) {
        if !self.started {
            log::warn!("StepClock::update called before start; starting now");
            self.start();
        }

        self.current = self.source.now_nanos();
        self.delta = self.current.saturating_sub(self.previous);
        self.accumulated = self.accumulated.saturating_add(self.delta);
        self.previous = self.current;

        let mut steps = self.accumulated / self.interval;

        // Unbounded still has to fit the u32 step count.
        let limit = u64::from(self.step_limit.unwrap_or(u32::MAX));
        if steps > limit {
            log::warn!(
                "StepClock: {} steps due, running {limit} and dropping {} ({:.1} ms)",
                steps,
                steps - limit,
                (steps - limit).saturating_mul(self.interval) as f64 / 1e6
            );
            self.accumulated = limit * self.interval + self.accumulated % self.interval;
            steps = limit;
        }

        self.pending = u32::try_from(steps).unwrap_or(u32::MAX);
        self.pending_interval = self.interval;
    }

    /// Removes the time covered by the pending steps from the accumulator.
    ///
    /// Must follow the execution of exactly `pending_steps()` fixed updates.
    pub fn consume(&mut self) {
        let used = u64::from(self.pending) * self.pending_interval;
        debug_assert!(used <= self.accumulated, "consume without matching update");
        self.accumulated = self.accumulated.saturating_sub(used);
        self.pending = 0;
    }

    /// `update()` + `consume()` in one call, for callers that run their steps
    /// eagerly. Returns the number of steps to run.
    pub fn take_steps(&mut self) -> u32 {
        self.update();
        let steps = self.pending;
        self.consume();
        steps
    }

    /// Clears accumulated time and pending steps. The last sampled timestamp
    /// becomes the baseline; callers resuming after a pause should `start()`
    /// again to avoid counting the paused time.
    pub fn stop(&mut self) {
        self.previous = self.current;
        self.accumulated = 0;
        self.pending = 0;
    }

    /// Drops accumulated time without touching the baseline.
    pub fn reset(&mut self) {
        self.accumulated = 0;
        self.pending = 0;
    }

    /// Sets the target updates per second.
    ///
    /// Affects only steps computed by subsequent `update()` calls.
    pub fn set_rate(&mut self, ups: f32) -> Result<()> {
        validate_rate(ups)?;
        self.rate = ups;
        self.interval = interval_for(ups);
        Ok(())
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Fixed step interval in nanoseconds.
    #[inline]
    pub fn update_interval(&self) -> u64 {
        self.interval
    }

    /// Interval of the currently pending steps, in seconds. This is the `dt`
    /// handed to every fixed update of the batch.
    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        (self.pending_interval as f64 / NANOS_PER_SECOND as f64) as f32
    }

    #[inline]
    pub fn pending_steps(&self) -> u32 {
        self.pending
    }

    /// Unconsumed time in nanoseconds.
    #[inline]
    pub fn accumulated(&self) -> u64 {
        self.accumulated
    }

    /// Time between the last two samples.
    #[inline]
    pub fn delta(&self) -> Duration {
        Duration::from_nanos(self.delta)
    }

    /// Fraction of a step left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        (self.accumulated as f64 / self.interval as f64) as f32
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

fn validate_rate(ups: f32) -> Result<()> {
    if !ups.is_finite() || ups <= 0.0 {
        return Err(EngineError::invalid(format!(
            "update rate must be a positive finite number, got {ups}"
        )));
    }
    Ok(())
}

// Single-precision quotient with a truncating cast: 60 UPS -> 16_666_667 ns.
fn interval_for(ups: f32) -> u64 {
    ((NANOS_PER_SECOND as f32 / ups) as u64).max(1)
}
