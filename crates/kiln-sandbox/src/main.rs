use anyhow::{Context, Result};
use kiln_engine::backend::RenderBackend;
use kiln_engine::core::{App, AppControl, Engine, EngineConfig};
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::mesh::Mesh;
use kiln_engine::paint::Color;
use kiln_engine::resource::Release;
use kiln_engine::shader::{ProgramLoader, StageRegistry};
use kiln_engine::texture::{DecodedImage, MemoryImageSource, TextureConfig, TextureLoader};
use kiln_engine::window::{DesktopWindow, WindowConfig};

const SHADER_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders");
const SPRITE_STAGES: [&str; 2] = ["sprite.vert.wgsl", "sprite.frag.wgsl"];
const CHECKER: &str = "checker";

/// Draws a checkerboard quad over a slowly cycling background.
struct Sandbox {
    programs: ProgramLoader,
    textures: TextureLoader<MemoryImageSource>,
    quad: Option<Mesh>,
    elapsed: f32,
}

impl Sandbox {
    fn new() -> Result<Self> {
        let images = MemoryImageSource::new().with_image(CHECKER, checkerboard(64, 8)?);
        Ok(Self {
            programs: ProgramLoader::new(SHADER_ROOT, StageRegistry::builtin()),
            textures: TextureLoader::new(images),
            quad: None,
            elapsed: 0.0,
        })
    }
}

impl App for Sandbox {
    fn load(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.programs
            .load(backend, "sprite", &SPRITE_STAGES)
            .context("loading sprite program")?;
        self.textures
            .load(backend, CHECKER, TextureConfig::PIXEL_ART)
            .context("loading checkerboard")?;
        self.quad = Some(Mesh::quad(backend)?);
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<AppControl> {
        self.elapsed += dt;
        Ok(AppControl::Continue)
    }

    fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<AppControl> {
        let t = self.elapsed * 0.5;
        backend.clear(Color::rgb(0.02 + 0.02 * t.sin(), 0.02, 0.04 + 0.02 * t.cos()));

        self.programs
            .get("sprite", &SPRITE_STAGES)
            .context("sprite program not loaded")?
            .install(backend)?;
        self.textures
            .get(CHECKER, TextureConfig::PIXEL_ART)
            .context("checkerboard not loaded")?
            .bind(backend, 0)?;
        self.quad
            .as_ref()
            .context("quad not loaded")?
            .render(backend)?;

        Ok(AppControl::Continue)
    }

    fn unload(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.programs.clear(backend);
        self.textures.clear(backend);
        if let Some(quad) = self.quad.take() {
            quad.release(backend);
        }
        Ok(())
    }
}

fn checkerboard(size: u32, cells: u32) -> Result<DecodedImage> {
    let cell = (size / cells).max(1);
    let pixels = (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / cell + y / cell) % 2 == 0 {
                [235, 235, 235, 255]
            } else {
                [40, 40, 48, 255]
            }
        })
        .collect();
    Ok(DecodedImage::from_rgba(size, size, pixels)?)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let window = DesktopWindow::open(WindowConfig::default().with_title("kiln sandbox"))
        .context("failed to open window")?;
    let mut engine = Engine::new(window, Sandbox::new()?, EngineConfig::default())?;

    log::info!("sandbox running; press Escape to quit");
    engine.run()
}
