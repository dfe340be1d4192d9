use crate::backend::{RawId, RenderBackend, TextureDesc};
use crate::error::{EngineError, Result};
use crate::resource::{Lifecycle, NativeHandle, Release};

use super::TextureConfig;

/// 2D texture resident on the GPU.
///
/// Created empty (`Lifecycle::Created`); the first successful `upload`
/// makes it `Ready`.
#[derive(Debug)]
pub struct Texture {
    handle: NativeHandle,
    width: u32,
    height: u32,
    config: TextureConfig,
}

impl Texture {
    /// Allocates an empty texture. Zero-sized dimensions are rejected.
    pub fn create(
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        config: TextureConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::invalid(format!(
                "texture dimensions must be positive, got {width}x{height}"
            )));
        }

        let id = backend.create_texture(&TextureDesc {
            width,
            height,
            config,
        })?;

        Ok(Self {
            handle: NativeHandle::new(id, "texture", Lifecycle::Created),
            width,
            height,
            config,
        })
    }

    /// `create` + `upload`. A wrong pixel count is rejected before anything
    /// is allocated; nothing stays allocated on any other failure.
    pub fn from_pixels(
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        config: TextureConfig,
        pixels: &[u8],
    ) -> Result<Self> {
        check_pixels(width, height, &config, pixels)?;
        let mut texture = Self::create(backend, width, height, config)?;
        if let Err(err) = texture.upload(backend, pixels) {
            texture.release(backend);
            return Err(err);
        }
        Ok(texture)
    }

    /// Replaces the texel data. `pixels` is tightly packed with
    /// `config.channels()` bytes per texel.
    pub fn upload(&mut self, backend: &mut dyn RenderBackend, pixels: &[u8]) -> Result<()> {
        check_pixels(self.width, self.height, &self.config, pixels)?;
        backend.upload_texture(self.handle.id(), pixels)?;
        self.handle.mark_ready();
        Ok(())
    }

    pub fn bind(&self, backend: &mut dyn RenderBackend, unit: u32) -> Result<()> {
        if self.handle.state() != Lifecycle::Ready {
            log::warn!("binding texture {} before any upload", self.handle.id());
        }
        backend.bind_texture(unit, Some(self.handle.id()))
    }

    /// Clears `unit`; draws then sample the backend's fallback texture.
    pub fn unbind(backend: &mut dyn RenderBackend, unit: u32) -> Result<()> {
        backend.bind_texture(unit, None)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> &TextureConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.handle.state()
    }

    pub fn raw(&self) -> RawId {
        self.handle.id()
    }
}

impl Release for Texture {
    fn release(self, backend: &mut dyn RenderBackend) {
        backend.delete_texture(self.handle.into_released());
    }
}

fn check_pixels(width: u32, height: u32, config: &TextureConfig, pixels: &[u8]) -> Result<()> {
    let channels = config.channels();
    let expected = width as usize * height as usize * channels as usize;
    if pixels.len() != expected {
        return Err(EngineError::invalid(format!(
            "{width}x{height} texture with {channels} channels needs {expected} bytes, got {}",
            pixels.len()
        )));
    }
    Ok(())
}
