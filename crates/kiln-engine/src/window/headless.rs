use std::time::Duration;

use crate::backend::{HeadlessBackend, RenderBackend};
use crate::error::{EngineError, Result};
use crate::time::ManualTime;

use super::Window;

/// Display-less window over a `HeadlessBackend`.
///
/// Closes after `close_after(n)` refreshes or on `close()`. With
/// `advance_on_refresh` every refresh also advances a `ManualTime`, which
/// gives the engine a deterministic frame duration.
#[derive(Default)]
pub struct HeadlessWindow {
    backend: HeadlessBackend,
    frame_limit: Option<u64>,
    frames: u64,
    close_requested: bool,
    released: bool,
    clock: Option<(ManualTime, Duration)>,
}

impl HeadlessWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close_after(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn advance_on_refresh(mut self, time: ManualTime, frame_time: Duration) -> Self {
        self.clock = Some((time, frame_time));
        self
    }

    /// Refreshes so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// The concrete backend, for inspection.
    pub fn headless(&self) -> &HeadlessBackend {
        &self.backend
    }
}

impl Window for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.close_requested
            || self.released
            || self.frame_limit.is_some_and(|limit| self.frames >= limit)
    }

    fn refresh(&mut self) -> Result<()> {
        if self.released {
            return Err(EngineError::InvalidState("refresh after release".into()));
        }

        self.backend.present();
        self.frames += 1;

        if let Some((time, frame_time)) = &self.clock {
            time.advance(*frame_time);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.close_requested = true;
    }

    fn release(&mut self) {
        if self.released {
            log::warn!("headless window released twice");
            return;
        }
        self.released = true;
        log::debug!("headless window released after {} frames", self.frames);
    }

    fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_after_frame_budget() {
        let mut window = HeadlessWindow::new().close_after(2);
        assert!(!window.should_close());
        window.refresh().unwrap();
        window.refresh().unwrap();
        assert!(window.should_close());
        assert_eq!(window.headless().frames_presented(), 2);
    }

    #[test]
    fn close_request_is_sticky() {
        let mut window = HeadlessWindow::new();
        window.close();
        assert!(window.should_close());
    }

    #[test]
    fn refresh_advances_manual_time() {
        let time = ManualTime::new();
        let mut window = HeadlessWindow::new().advance_on_refresh(time.clone(), Duration::from_millis(4));
        window.refresh().unwrap();
        window.refresh().unwrap();
        assert_eq!(crate::time::TimeSource::now_nanos(&time), 8_000_000);
    }

    #[test]
    fn released_window_refuses_refresh() {
        let mut window = HeadlessWindow::new();
        window.release();
        assert!(window.should_close());
        assert!(window.refresh().is_err());
    }
}
