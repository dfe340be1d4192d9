//! End-to-end runs of the loop driver over the headless window: an app
//! loads programs, textures and meshes, draws them every frame and releases
//! everything on unload.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use kiln_engine::backend::{ObjectKind, RenderBackend};
use kiln_engine::core::{App, AppControl, Engine, EngineConfig, FnApp};
use kiln_engine::mesh::Mesh;
use kiln_engine::paint::Color;
use kiln_engine::resource::Release;
use kiln_engine::shader::{ProgramLoader, StageRegistry};
use kiln_engine::texture::{DecodedImage, MemoryImageSource, TextureConfig, TextureLoader};
use kiln_engine::time::ManualTime;
use kiln_engine::window::HeadlessWindow;
use kiln_engine::EngineError;

const SPRITE_VERT: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec2<f32>, @location(1) uv: vec2<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(pos, 0.0, 1.0);
    out.uv = uv;
    return out;
}
"#;

const SPRITE_FRAG: &str = r#"
@group(0) @binding(0) var t_sprite: texture_2d<f32>;
@group(0) @binding(1) var s_sprite: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(t_sprite, s_sprite, uv);
}
"#;

/// Reads a varying the vertex stage never writes.
const MISMATCHED_FRAG: &str = r#"
@fragment
fn fs_main(@location(2) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;

const STAGES: [&str; 2] = ["sprite.vert.wgsl", "sprite.frag.wgsl"];

fn shader_dir(fragment: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(STAGES[0]), SPRITE_VERT).unwrap();
    fs::write(dir.path().join(STAGES[1]), fragment).unwrap();
    dir
}

struct SpriteApp {
    programs: ProgramLoader,
    textures: TextureLoader<MemoryImageSource>,
    quad: Option<Mesh>,
    updates: u32,
}

impl SpriteApp {
    fn new(shader_root: &Path) -> Self {
        let images = MemoryImageSource::new()
            .with_image("checker.png", DecodedImage::solid(4, 4, [200, 40, 40, 255]));
        Self {
            programs: ProgramLoader::new(shader_root, StageRegistry::builtin()),
            textures: TextureLoader::new(images),
            quad: None,
            updates: 0,
        }
    }
}

impl App for SpriteApp {
    fn load(&mut self, backend: &mut dyn RenderBackend) -> anyhow::Result<()> {
        self.programs.load(backend, "sprite", &STAGES)?;
        self.textures
            .load(backend, "checker.png", TextureConfig::PIXEL_ART)?;
        self.quad = Some(Mesh::quad(backend)?);
        Ok(())
    }

    fn update(&mut self, _dt: f32) -> anyhow::Result<AppControl> {
        self.updates += 1;
        Ok(AppControl::Continue)
    }

    fn render(&mut self, backend: &mut dyn RenderBackend) -> anyhow::Result<AppControl> {
        backend.clear(Color::from_srgb8(20, 20, 30, 255));
        self.programs
            .get("sprite", &STAGES)
            .context("sprite program not loaded")?
            .install(backend)?;
        self.textures
            .get("checker.png", TextureConfig::PIXEL_ART)
            .context("checker texture not loaded")?
            .bind(backend, 0)?;
        self.quad
            .as_ref()
            .context("quad not loaded")?
            .render(backend)?;
        Ok(AppControl::Continue)
    }

    fn unload(&mut self, backend: &mut dyn RenderBackend) -> anyhow::Result<()> {
        self.programs.clear(backend);
        self.textures.clear(backend);
        if let Some(quad) = self.quad.take() {
            quad.release(backend);
        }
        Ok(())
    }
}

fn headless_engine<A: App>(
    app: A,
    ups: f32,
    frames: u64,
    frame_time: Duration,
) -> Engine<HeadlessWindow, A, ManualTime> {
    let time = ManualTime::new();
    let window = HeadlessWindow::new()
        .close_after(frames)
        .advance_on_refresh(time.clone(), frame_time);
    Engine::with_time_source(window, app, EngineConfig::default().with_ups(ups), time).unwrap()
}

// ── full lifecycle ───────────────────────────────────────────────────────

#[test]
fn loaded_resources_are_drawn_then_released_exactly_once() {
    let dir = shader_dir(SPRITE_FRAG);
    let mut engine = headless_engine(SpriteApp::new(dir.path()), 100.0, 3, Duration::from_millis(20));
    engine.run().unwrap();

    let (window, app) = engine.into_parts();
    let backend = window.headless();

    assert_eq!(backend.frames_presented(), 3);
    let frame = backend.last_frame();
    assert_eq!(frame.len(), 1);
    assert_eq!(frame[0].index_count, 6);
    assert!(frame[0].texture.is_some());

    // Stage shaders are released right after the link.
    assert_eq!(backend.created_count(ObjectKind::Shader), 2);
    assert_eq!(backend.created_count(ObjectKind::Program), 1);
    for kind in [ObjectKind::Shader, ObjectKind::Program, ObjectKind::Texture, ObjectKind::Mesh] {
        assert_eq!(backend.live_count(kind), 0, "{kind} left alive");
        assert_eq!(backend.released_count(kind), backend.created_count(kind));
    }
    assert!(backend.violations().is_empty(), "{:?}", backend.violations());

    assert!(app.programs.is_empty());
    assert!(app.textures.is_empty());
    assert_eq!(app.updates, 4);
}

#[test]
fn failed_load_skips_the_loop_and_leaves_nothing_alive() {
    let dir = shader_dir(MISMATCHED_FRAG);
    let mut engine = headless_engine(SpriteApp::new(dir.path()), 60.0, 5, Duration::from_millis(16));

    let err = engine.run().unwrap_err();
    assert!(format!("{err:#}").contains("application load failed"));
    assert!(matches!(
        err.root_cause().downcast_ref::<EngineError>(),
        Some(EngineError::Link { .. })
    ));

    assert_eq!(engine.stats().frames, 0);
    assert!(engine.window().is_released());
    let backend = engine.window().headless();
    for kind in [ObjectKind::Shader, ObjectKind::Program, ObjectKind::Texture, ObjectKind::Mesh] {
        assert_eq!(backend.live_count(kind), 0, "{kind} left alive");
    }
    assert!(backend.violations().is_empty());
}

#[test]
fn missing_stage_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(STAGES[0]), SPRITE_VERT).unwrap();

    let mut window = HeadlessWindow::new();
    let mut loader = ProgramLoader::new(dir.path(), StageRegistry::builtin());
    let err = loader
        .load(kiln_engine::window::Window::backend(&mut window), "sprite", &STAGES)
        .unwrap_err();

    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(loader.is_empty());
    assert_eq!(window.headless().live_count(ObjectKind::Shader), 0);
}

// ── stepping ─────────────────────────────────────────────────────────────

#[test]
fn fifty_ms_frames_at_sixty_ups_carry_the_remainder() {
    let mut dts = Vec::new();
    let app = FnApp::new(
        |dt| {
            dts.push(dt);
            Ok(AppControl::Continue)
        },
        |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
    );
    let mut engine = headless_engine(app, 60.0, 3, Duration::from_millis(50));
    engine.run().unwrap();
    let stats = engine.stats();
    drop(engine);

    // Frame 1 sees no elapsed time. Frame 2 has 50 ms, one nanosecond short
    // of three steps; frame 3 runs three with the carried remainder.
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.updates, 5);
    assert_eq!(dts.len(), 5);
    assert!(dts.iter().all(|dt| (dt - 1.0 / 60.0).abs() < 1e-6));
}

#[test]
fn step_limit_caps_catch_up_after_a_stall() {
    let time = ManualTime::new();
    let window = HeadlessWindow::new()
        .close_after(2)
        .advance_on_refresh(time.clone(), Duration::from_secs(2));
    let app = FnApp::new(
        |_| Ok(AppControl::Continue),
        |_: &mut dyn RenderBackend| Ok(AppControl::Continue),
    );
    let config = EngineConfig::default().with_ups(60.0).with_step_limit(5);
    let mut engine = Engine::with_time_source(window, app, config, time).unwrap();
    engine.run().unwrap();

    assert_eq!(engine.stats().updates, 5);
}

// ── texture cache ────────────────────────────────────────────────────────

#[test]
fn textures_are_shared_per_path_and_config() {
    let images = MemoryImageSource::new().with_image("tile.png", DecodedImage::solid(2, 2, [9, 9, 9, 255]));
    let mut loader = TextureLoader::new(images);
    let mut window = HeadlessWindow::new();
    let backend = kiln_engine::window::Window::backend(&mut window);

    let first = loader.load(backend, "tile.png", TextureConfig::DEFAULT).unwrap().raw();
    let again = loader.load(backend, "tile.png", TextureConfig::DEFAULT).unwrap().raw();
    let tiled = loader.load(backend, "tile.png", TextureConfig::TILED_REPEAT).unwrap().raw();

    assert_eq!(first, again);
    assert_ne!(first, tiled);
    assert_eq!(loader.len(), 2);
    assert_eq!(loader.source().decode_count(), 2);

    assert!(loader.remove(backend, "tile.png", TextureConfig::DEFAULT));
    assert!(!loader.contains("tile.png", TextureConfig::DEFAULT));
    loader.clear(backend);
    assert!(loader.is_empty());
    assert_eq!(window.headless().live_count(ObjectKind::Texture), 0);
}
