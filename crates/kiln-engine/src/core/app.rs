use anyhow::Result;

use crate::backend::RenderBackend;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    /// Stop after the current frame; observed at the next loop check.
    Exit,
}

/// Application contract driven by `Engine`.
pub trait App {
    /// Called once before the first frame. Load programs, textures and
    /// meshes here.
    fn load(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        let _ = backend;
        Ok(())
    }

    /// Advances the simulation by one fixed step of `dt` seconds.
    fn update(&mut self, dt: f32) -> Result<AppControl>;

    /// Records one frame. Called exactly once per loop iteration.
    fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<AppControl>;

    /// Called once after the loop ends, also when it ended with an error.
    /// Release everything `load` created here.
    fn unload(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        let _ = backend;
        Ok(())
    }
}

/// `App` built from an update closure and a render closure.
pub struct FnApp<U, R> {
    update: U,
    render: R,
}

impl<U, R> FnApp<U, R>
where
    U: FnMut(f32) -> Result<AppControl>,
    R: FnMut(&mut dyn RenderBackend) -> Result<AppControl>,
{
    pub fn new(update: U, render: R) -> Self {
        Self { update, render }
    }
}

impl<U, R> App for FnApp<U, R>
where
    U: FnMut(f32) -> Result<AppControl>,
    R: FnMut(&mut dyn RenderBackend) -> Result<AppControl>,
{
    fn update(&mut self, dt: f32) -> Result<AppControl> {
        (self.update)(dt)
    }

    fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<AppControl> {
        (self.render)(backend)
    }
}
