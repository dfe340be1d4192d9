use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId};

use crate::backend::{RenderBackend, WgpuBackend};
use crate::device::{Gpu, GpuInit};
use crate::error::{EngineError, Result};

use super::Window;

/// Desktop window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Inner size in physical pixels. A zero component takes the primary
    /// monitor's size.
    pub size: (u32, u32),
    pub resizable: bool,
    pub decorated: bool,
    pub vsync: bool,
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            size: (1280, 720),
            resizable: true,
            decorated: true,
            vsync: true,
        }
    }
}

// Upper bound on pumps while waiting for the platform to resume the app and
// let us create the window.
const MAX_STARTUP_PUMPS: usize = 64;

/// winit window + wgpu surface driven by `pump_app_events`.
///
/// Nothing runs between frames: `refresh()` presents the recorded frame and
/// then drains the pending window events without blocking. Escape or the
/// close button set `should_close`.
pub struct DesktopWindow {
    event_loop: EventLoop<()>,
    events: EventState,
    window: Arc<WinitWindow>,
    backend: WgpuBackend,
    released: bool,
}

impl DesktopWindow {
    /// Creates the event loop, the window and its GPU backend.
    ///
    /// Every failure is `EngineError::Initialization`.
    pub fn open(config: WindowConfig) -> Result<Self> {
        Self::open_with(config, GpuInit::default())
    }

    pub fn open_with(config: WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new()
            .map_err(|e| EngineError::Initialization(format!("failed to create event loop: {e}")))?;

        let gpu_init = gpu_init.with_vsync(config.vsync);
        let mut startup = Startup {
            config,
            gpu_init,
            created: None,
            error: None,
        };

        for _ in 0..MAX_STARTUP_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut startup)
            {
                return Err(EngineError::Initialization(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
            if startup.created.is_some() || startup.error.is_some() {
                break;
            }
        }

        if let Some(err) = startup.error {
            return Err(err);
        }
        let Some((window, backend)) = startup.created else {
            return Err(EngineError::Initialization(
                "platform never resumed the application".into(),
            ));
        };

        log::info!(
            "window '{}' opened ({}x{})",
            window.title(),
            window.inner_size().width,
            window.inner_size().height
        );

        Ok(Self {
            event_loop,
            events: EventState {
                window_id: window.id(),
                close_requested: false,
                resized: None,
            },
            window,
            backend,
            released: false,
        })
    }

    /// The concrete backend.
    pub fn wgpu(&mut self) -> &mut WgpuBackend {
        &mut self.backend
    }

    pub fn inner_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }
}

impl Window for DesktopWindow {
    fn should_close(&self) -> bool {
        self.events.close_requested || self.released
    }

    fn refresh(&mut self) -> Result<()> {
        if self.released {
            return Err(EngineError::InvalidState("refresh after release".into()));
        }

        self.window.pre_present_notify();
        self.backend.present()?;

        if let PumpStatus::Exit(_) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.events)
        {
            self.events.close_requested = true;
        }

        if let Some(size) = self.events.resized.take() {
            self.backend.resize(size);
        }
        Ok(())
    }

    fn close(&mut self) {
        self.events.close_requested = true;
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.window.set_visible(false);
        log::info!("window '{}' closed", self.window.title());
    }

    fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut self.backend
    }
}

/// Event handler used until the window exists.
struct Startup {
    config: WindowConfig,
    gpu_init: GpuInit,
    created: Option<(Arc<WinitWindow>, WgpuBackend)>,
    error: Option<EngineError>,
}

impl Startup {
    fn create(&self, event_loop: &ActiveEventLoop) -> Result<(Arc<WinitWindow>, WgpuBackend)> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());

        let (mut width, mut height) = self.config.size;
        if width == 0 || height == 0 {
            let screen = monitor
                .as_ref()
                .map(|m| m.size())
                .unwrap_or(PhysicalSize::new(1280, 720));
            if width == 0 {
                width = screen.width;
            }
            if height == 0 {
                height = screen.height;
            }
        }
        let size = PhysicalSize::new(width, height);

        // Hidden until the surface is configured.
        let mut attrs = WinitWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size)
            .with_resizable(self.config.resizable)
            .with_decorations(self.config.decorated)
            .with_visible(false);
        if let Some(monitor) = &monitor {
            attrs = attrs.with_position(centered(monitor.position(), monitor.size(), size));
        }

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| EngineError::Initialization(format!("failed to create window: {e}")))?,
        );

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), self.gpu_init.clone()))
            .map_err(|e| EngineError::Initialization(format!("{e:#}")))?;

        window.set_visible(true);
        Ok((window, WgpuBackend::new(gpu)))
    }
}

/// Top-left corner that centres `window` on a monitor.
fn centered(
    origin: PhysicalPosition<i32>,
    monitor: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |screen: u32, size: u32| ((i64::from(screen) - i64::from(size)) / 2) as i32;
    PhysicalPosition::new(
        origin.x + offset(monitor.width, window.width),
        origin.y + offset(monitor.height, window.height),
    )
}

impl ApplicationHandler for Startup {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.created.is_some() || self.error.is_some() {
            return;
        }
        match self.create(event_loop) {
            Ok(created) => self.created = Some(created),
            Err(err) => {
                log::error!("{err}");
                self.error = Some(err);
            }
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

/// Event handler used while the engine runs.
struct EventState {
    window_id: WindowId,
    close_requested: bool,
    resized: Option<PhysicalSize<u32>>,
}

impl ApplicationHandler for EventState {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close_requested = true,

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::debug!("escape pressed, closing");
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => self.resized = Some(size),

            _ => {}
        }
    }
}
