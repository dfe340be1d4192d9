//! Native GPU object API.
//!
//! `RenderBackend` is the seam between the resource wrappers (`Shader`,
//! `ShaderProgram`, `Texture`, `Mesh`) and a graphics device. Every native
//! object is identified by a `RawId`; wrappers own exactly one id each and
//! hand it back through the matching `delete_*` call.
//!
//! Implementations:
//! - `HeadlessBackend`: in-memory, records calls and counts; used by tests
//! - `WgpuBackend`: draws through a `device::Gpu`

mod headless;
mod ids;
mod pixels;
mod wgpu_backend;

use std::fmt;

use crate::error::Result;
use crate::paint::Color;
use crate::shader::ShaderStage;
use crate::texture::TextureConfig;

pub use headless::{DrawRecord, HeadlessBackend, ObjectKind};
pub(crate) use ids::IdAllocator;
pub use wgpu_backend::WgpuBackend;

/// Texture units a draw can sample from. The engine bind group has one
/// texture slot.
pub const TEXTURE_UNITS: u32 = 1;

/// Backend identifier of one native object. Never reused by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RawId(u32);

impl RawId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Texture allocation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub config: TextureConfig,
}

impl TextureDesc {
    /// Byte length of a tightly packed upload for this texture.
    pub fn upload_len(&self) -> usize {
        self.width as usize * self.height as usize * self.config.channels() as usize
    }
}

/// Native object API used by the resource wrappers.
///
/// Object safe; the engine hands hooks a `&mut dyn RenderBackend`.
/// Calls on ids that are not live fail with `EngineError::UseAfterRelease`
/// where the backend can detect it.
///
/// Compile, link and validate report the backend's diagnostic text as the
/// error so the wrappers can attach it to the matching `EngineError`.
pub trait RenderBackend {
    // ── shaders ──────────────────────────────────────────────────────────

    fn create_shader(&mut self, stage: ShaderStage) -> Result<RawId>;
    fn shader_source(&mut self, shader: RawId, source: &str) -> Result<()>;
    fn compile_shader(&mut self, shader: RawId) -> Result<std::result::Result<(), String>>;
    fn delete_shader(&mut self, shader: RawId);

    // ── programs ─────────────────────────────────────────────────────────

    fn create_program(&mut self) -> Result<RawId>;
    fn attach_shader(&mut self, program: RawId, shader: RawId) -> Result<()>;
    fn link_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>>;
    /// `Ok(Err(warnings))` when the program links but is unlikely to work as
    /// intended on this backend.
    fn validate_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>>;
    /// Installs `program` for subsequent draws; `None` uninstalls.
    fn use_program(&mut self, program: Option<RawId>) -> Result<()>;
    fn delete_program(&mut self, program: RawId);

    // ── textures ─────────────────────────────────────────────────────────

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<RawId>;
    /// `pixels` is tightly packed with `desc.config.channels()` bytes per texel.
    fn upload_texture(&mut self, texture: RawId, pixels: &[u8]) -> Result<()>;
    fn bind_texture(&mut self, unit: u32, texture: Option<RawId>) -> Result<()>;
    fn delete_texture(&mut self, texture: RawId);

    // ── meshes ───────────────────────────────────────────────────────────

    fn create_mesh(&mut self, vertices: &[f32], indices: &[u32], stride: u32) -> Result<RawId>;
    fn draw_mesh(&mut self, mesh: RawId) -> Result<()>;
    fn delete_mesh(&mut self, mesh: RawId);

    // ── frame ────────────────────────────────────────────────────────────

    /// Sets the colour the next frame is cleared to.
    fn clear(&mut self, color: Color);
}
