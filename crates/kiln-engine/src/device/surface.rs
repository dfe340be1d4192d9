use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::error::EngineError;

use super::GpuInit;

/// Window surface plus the configuration it was last configured with.
pub(crate) struct SurfaceState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl SurfaceState {
    pub(crate) fn configure(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: pick_present_mode(&caps.present_modes, init.present_mode()),
            alpha_mode: pick_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.max_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!(
            "surface configured: {format:?}, {:?}, {}x{}",
            config.present_mode,
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// `false` while minimized.
    pub(crate) fn is_visible(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// A zero-sized window keeps its last configuration until it is visible
    /// again.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if !self.is_visible() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
    }

    /// Next swapchain texture, or `None` when this frame has to be skipped.
    ///
    /// A lost or outdated surface is reconfigured for the next frame. Only
    /// running out of memory is an error.
    pub(crate) fn acquire(
        &self,
        device: &wgpu::Device,
    ) -> crate::Result<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                if self.is_visible() {
                    self.surface.configure(device, &self.config);
                }
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(EngineError::Device("surface out of memory".into()))
            }
            Err(err) => {
                log::debug!("frame skipped: {err}");
                Ok(None)
            }
        }
    }
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(format) if prefer_srgb => Some(format),
        _ => formats.first().copied(),
    }
}

// Auto modes are resolved by wgpu itself and never listed in the caps.
fn pick_present_mode(supported: &[wgpu::PresentMode], wanted: wgpu::PresentMode) -> wgpu::PresentMode {
    let auto = matches!(
        wanted,
        wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
    );
    if auto || supported.contains(&wanted) {
        return wanted;
    }
    log::warn!("present mode {wanted:?} unsupported, falling back to Fifo");
    wgpu::PresentMode::Fifo
}

fn pick_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    wanted: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    wanted
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
