//! Core engine-facing contracts and the loop driver.
//!
//! `App` is the interface between the engine loop and user code. `Engine`
//! owns the window, the app and the step clock and runs
//! `init → loop → free` exactly once.

mod app;
mod config;
mod engine;

pub use app::{App, AppControl, FnApp};
pub use config::EngineConfig;
pub use engine::{Engine, EngineState, LoopStats, StopHandle};
