/// Device and surface preferences used by `Gpu::new`.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when the surface offers one. Textures are
    /// sampled as sRGB, so this keeps colours unchanged end to end.
    pub prefer_srgb: bool,

    /// `Fifo` when set, otherwise `AutoNoVsync`.
    pub vsync: bool,

    /// Ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    /// Limits requested from the device. Texture size checks read the
    /// granted limits, not these.
    pub required_limits: wgpu::Limits,

    /// Frames the surface may queue ahead. A hint.
    pub max_frame_latency: u32,
}

impl GpuInit {
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Present mode requested from the surface.
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            vsync: true,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: wgpu::Limits::default(),
            max_frame_latency: 2,
        }
    }
}
