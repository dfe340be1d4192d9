use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::error::EngineError;
use crate::time::{MonotonicTime, StepClock, TimeSource};
use crate::window::Window;

use super::{App, AppControl, EngineConfig};

/// Loop driver lifecycle. `Stopped` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineState {
    Created,
    Running,
    Stopped,
}

/// Counters of a run.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct LoopStats {
    /// Rendered frames.
    pub frames: u64,
    /// Executed fixed updates.
    pub updates: u64,
}

/// Clears the engine's running flag from outside the loop.
///
/// Shares the flag with the engine on the same thread; the loop observes it
/// at the top of its next iteration.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Rc<Cell<bool>>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_stopped(&self) -> bool {
        !self.running.get()
    }
}

/// Fixed-step loop driver.
///
/// Per frame: `clock.update()`, `pending_steps()` × `App::update(dt)`,
/// `clock.consume()`, `App::render` once, `window.refresh()`. The running
/// flag and `window.should_close()` are checked at the top of each frame
/// only, so a frame that started always renders and refreshes.
pub struct Engine<W: Window, A: App, S: TimeSource = MonotonicTime> {
    window: W,
    app: A,
    clock: StepClock<S>,
    running: Rc<Cell<bool>>,
    state: EngineState,
    stats: LoopStats,
}

impl<W: Window, A: App> Engine<W, A> {
    /// Creates an engine driven by the wall clock.
    pub fn new(window: W, app: A, config: EngineConfig) -> crate::Result<Self> {
        Self::with_time_source(window, app, config, MonotonicTime::new())
    }
}

impl<W: Window, A: App, S: TimeSource> Engine<W, A, S> {
    /// Creates an engine reading time from `source`.
    pub fn with_time_source(
        window: W,
        app: A,
        config: EngineConfig,
        source: S,
    ) -> crate::Result<Self> {
        let mut clock = StepClock::with_source(source, config.updates_per_second)?;
        clock.set_step_limit(config.step_limit);

        Ok(Self {
            window,
            app,
            clock,
            running: Rc::new(Cell::new(true)),
            state: EngineState::Created,
            stats: LoopStats::default(),
        })
    }

    /// Runs `init`, the frame loop and `free`, in that order.
    ///
    /// `free` runs even when `init` or the loop fail; their error is returned
    /// afterwards. An engine runs once: a second call is `InvalidState`.
    pub fn run(&mut self) -> Result<()> {
        if self.state != EngineState::Created {
            return Err(EngineError::InvalidState(format!(
                "engine cannot run from state {:?}",
                self.state
            ))
            .into());
        }
        self.state = EngineState::Running;

        let result = self.init().and_then(|()| self.run_loop());
        self.free();
        self.state = EngineState::Stopped;

        log::info!(
            "engine stopped after {} frames / {} updates",
            self.stats.frames,
            self.stats.updates
        );
        result
    }

    fn init(&mut self) -> Result<()> {
        log::info!("engine starting ({} ups)", self.clock.rate());
        self.app
            .load(self.window.backend())
            .context("application load failed")?;
        self.clock.start();
        Ok(())
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.running.get() && !self.window.should_close() {
            self.clock.update();

            let steps = self.clock.pending_steps();
            let dt = self.clock.fixed_dt();
            for _ in 0..steps {
                if self.app.update(dt)? == AppControl::Exit {
                    self.running.set(false);
                }
                self.stats.updates += 1;
            }
            self.clock.consume();

            if self.app.render(self.window.backend())? == AppControl::Exit {
                self.running.set(false);
            }
            self.stats.frames += 1;

            self.window.refresh().context("window refresh failed")?;

            log::trace!(
                "frame {}: {steps} steps, alpha {:.3}",
                self.stats.frames,
                self.clock.alpha()
            );
        }
        Ok(())
    }

    fn free(&mut self) {
        self.clock.stop();
        if let Err(err) = self.app.unload(self.window.backend()) {
            log::error!("application unload failed: {err:#}");
        }
        self.window.release();
        log::debug!("engine resources freed");
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Rc::clone(&self.running),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn clock(&self) -> &StepClock<S> {
        &self.clock
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn into_parts(self) -> (W, A) {
        (self.window, self.app)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::RenderBackend;
    use crate::core::FnApp;
    use crate::time::ManualTime;
    use crate::window::HeadlessWindow;

    fn engine_with<A: App>(
        app: A,
        frames: u64,
        frame_time: Duration,
    ) -> Engine<HeadlessWindow, A, ManualTime> {
        let time = ManualTime::new();
        let window = HeadlessWindow::new()
            .close_after(frames)
            .advance_on_refresh(time.clone(), frame_time);
        Engine::with_time_source(window, app, EngineConfig::default().with_ups(100.0), time).unwrap()
    }

    #[test]
    fn runs_once_then_rejects_rerun() {
        let app = FnApp::new(
            |_| Ok(AppControl::Continue),
            |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
        );
        let mut engine = engine_with(app, 3, Duration::from_millis(10));
        engine.run().unwrap();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert_eq!(engine.stats().frames, 3);

        let err = engine.run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::InvalidState(_))
        ));
    }

    #[test]
    fn steps_follow_elapsed_time() {
        // 25 ms frames at 100 ups: 0 steps on the first frame (no time yet),
        // then 2, 3, 2, 3 ... as the 5 ms remainder carries.
        let app = FnApp::new(
            |_| Ok(AppControl::Continue),
            |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
        );
        let mut engine = engine_with(app, 5, Duration::from_millis(25));
        engine.run().unwrap();
        assert_eq!(engine.stats().updates, 10);
    }

    #[test]
    fn exit_from_update_finishes_the_frame() {
        let mut updates = 0;
        let mut renders = 0;
        let app = FnApp::new(
            |_| {
                updates += 1;
                Ok(if updates == 1 { AppControl::Exit } else { AppControl::Continue })
            },
            |_: &mut dyn RenderBackend| {
                renders += 1;
                Ok(AppControl::Continue)
            },
        );
        let mut engine = engine_with(app, 100, Duration::from_millis(30));
        engine.run().unwrap();
        drop(engine);

        // Frame 1 has no elapsed time; frame 2 runs its full batch of 3.
        assert_eq!(updates, 3);
        assert_eq!(renders, 2);
    }

    #[test]
    fn stop_handle_prevents_the_first_frame() {
        let app = FnApp::new(
            |_| Ok(AppControl::Continue),
            |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
        );
        let mut engine = engine_with(app, 10, Duration::from_millis(10));
        let stop = engine.stop_handle();
        stop.stop();
        assert!(stop.is_stopped());

        engine.run().unwrap();
        assert_eq!(engine.stats(), LoopStats::default());
        assert!(engine.window().is_released());
    }

    #[test]
    fn hook_error_still_frees() {
        let app = FnApp::new(
            |_| Ok(AppControl::Continue),
            |_: &mut dyn RenderBackend| anyhow::bail!("render exploded"),
        );
        let mut engine = engine_with(app, 10, Duration::from_millis(10));
        let err = engine.run().unwrap_err();
        assert!(err.to_string().contains("render exploded"));
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(engine.window().is_released());
        assert_eq!(engine.clock().accumulated(), 0);
    }

    #[test]
    fn invalid_rate_is_rejected_at_construction() {
        let app = FnApp::new(
            |_| Ok(AppControl::Continue),
            |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
        );
        let result = Engine::new(HeadlessWindow::new(), app, EngineConfig::default().with_ups(0.0));
        assert!(matches!(result, Err(EngineError::InvalidParameter(_))));
    }
}
