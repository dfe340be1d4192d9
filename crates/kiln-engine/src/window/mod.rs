//! Window collaborators of the loop driver.
//!
//! A `Window` owns the render backend the app draws with, presents the
//! recorded frame on `refresh()` and reports when it wants to close.
//!
//! - `DesktopWindow`: winit window + wgpu surface, events pumped per frame
//! - `HeadlessWindow`: no display; closes after a frame budget or on request

mod desktop;
mod headless;

use crate::backend::RenderBackend;
use crate::error::Result;

pub use desktop::{DesktopWindow, WindowConfig};
pub use headless::HeadlessWindow;

pub trait Window {
    /// Checked by the engine at the top of every frame.
    fn should_close(&self) -> bool;

    /// Presents the recorded frame, then processes pending window events.
    fn refresh(&mut self) -> Result<()>;

    /// Requests closing; takes effect at the next `should_close()` check.
    fn close(&mut self);

    /// Tears the window down. Called once by the engine after the loop.
    fn release(&mut self);

    /// Graphics device of this window.
    fn backend(&mut self) -> &mut dyn RenderBackend;
}
