use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::mesh::check_geometry;
use crate::paint::Color;
use crate::shader::wgsl::{self, LinkedInterface, StageInterface};
use crate::shader::ShaderStage;

use super::{IdAllocator, RawId, RenderBackend, TextureDesc, TEXTURE_UNITS};

/// Native object categories tracked by the headless backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ObjectKind {
    Shader,
    Program,
    Texture,
    Mesh,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shader => "shader",
            Self::Program => "program",
            Self::Texture => "texture",
            Self::Mesh => "mesh",
        })
    }
}

/// One recorded `draw_mesh` call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawRecord {
    pub program: RawId,
    pub mesh: RawId,
    pub texture: Option<RawId>,
    pub index_count: u32,
}

enum Object {
    Shader {
        stage: ShaderStage,
        source: Option<String>,
        interface: Option<StageInterface>,
    },
    Program {
        attached: Vec<RawId>,
        linked: Option<LinkedInterface>,
    },
    Texture {
        desc: TextureDesc,
        pixels: Option<Vec<u8>>,
    },
    Mesh {
        index_count: u32,
    },
}

impl Object {
    fn kind(&self) -> ObjectKind {
        match self {
            Self::Shader { .. } => ObjectKind::Shader,
            Self::Program { .. } => ObjectKind::Program,
            Self::Texture { .. } => ObjectKind::Texture,
            Self::Mesh { .. } => ObjectKind::Mesh,
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
struct Counts {
    created: usize,
    released: usize,
}

/// In-memory `RenderBackend`.
///
/// Keeps every live object, counts creations and releases per kind, records
/// draws, and reports contract violations (double deletes, use after
/// release) both as errors and in `violations()`. Shader compilation and
/// linking run the real WGSL front end, so diagnostics match `WgpuBackend`.
#[derive(Default)]
pub struct HeadlessBackend {
    ids: IdAllocator,
    objects: HashMap<RawId, Object>,
    released: HashSet<RawId>,

    counts: HashMap<ObjectKind, Counts>,
    delete_calls: HashMap<RawId, usize>,
    violations: Vec<String>,

    program: Option<RawId>,
    texture: Option<RawId>,
    clear_color: Color,

    draws: Vec<DrawRecord>,
    last_frame: Vec<DrawRecord>,
    frames: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ── inspection ───────────────────────────────────────────────────────

    pub fn is_live(&self, id: RawId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn live_count(&self, kind: ObjectKind) -> usize {
        self.objects.values().filter(|o| o.kind() == kind).count()
    }

    pub fn created_count(&self, kind: ObjectKind) -> usize {
        self.counts.get(&kind).map_or(0, |c| c.created)
    }

    pub fn released_count(&self, kind: ObjectKind) -> usize {
        self.counts.get(&kind).map_or(0, |c| c.released)
    }

    /// Number of `delete_*` calls issued for `id`, valid or not.
    pub fn delete_calls(&self, id: RawId) -> usize {
        self.delete_calls.get(&id).copied().unwrap_or(0)
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Draws recorded since the last `present()`.
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Draws of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawRecord] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn installed_program(&self) -> Option<RawId> {
        self.program
    }

    pub fn bound_texture(&self) -> Option<RawId> {
        self.texture
    }

    /// Pixels of the last upload to `texture`, if any.
    pub fn texture_pixels(&self, texture: RawId) -> Option<&[u8]> {
        match self.objects.get(&texture) {
            Some(Object::Texture { pixels, .. }) => pixels.as_deref(),
            _ => None,
        }
    }

    pub fn texture_desc(&self, texture: RawId) -> Option<TextureDesc> {
        match self.objects.get(&texture) {
            Some(Object::Texture { desc, .. }) => Some(*desc),
            _ => None,
        }
    }

    /// Ends the frame: the recorded draws become `last_frame()`.
    pub fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.draws);
        self.frames += 1;
        log::trace!(
            "headless frame {} presented ({} draws)",
            self.frames,
            self.last_frame.len()
        );
    }

    // ── bookkeeping ──────────────────────────────────────────────────────

    fn insert(&mut self, object: Object) -> RawId {
        let id = self.ids.next();
        let kind = object.kind();
        self.counts.entry(kind).or_default().created += 1;
        self.objects.insert(id, object);
        log::debug!("headless: created {kind} {id}");
        id
    }

    fn missing(&mut self, id: RawId, kind: ObjectKind) -> EngineError {
        match self.objects.get(&id) {
            Some(other) => EngineError::invalid(format!("{id} is a {}, not a {kind}", other.kind())),
            None if self.released.contains(&id) => {
                self.violations.push(format!("{kind} {id} used after release"));
                EngineError::UseAfterRelease(id)
            }
            None => EngineError::invalid(format!("unknown {kind} id {id}")),
        }
    }

    fn has(&self, id: RawId, kind: ObjectKind) -> bool {
        self.objects.get(&id).is_some_and(|o| o.kind() == kind)
    }

    fn get(&mut self, id: RawId, kind: ObjectKind) -> Result<&mut Object> {
        if !self.has(id, kind) {
            return Err(self.missing(id, kind));
        }
        self.objects
            .get_mut(&id)
            .ok_or(EngineError::UseAfterRelease(id))
    }

    fn delete(&mut self, id: RawId, kind: ObjectKind) {
        *self.delete_calls.entry(id).or_default() += 1;

        if !self.has(id, kind) {
            let err = self.missing(id, kind);
            if !matches!(err, EngineError::UseAfterRelease(_)) {
                self.violations.push(format!("delete {kind} {id}: {err}"));
            }
            log::error!("headless: delete {kind} {id} rejected: {err}");
            return;
        }

        self.objects.remove(&id);
        self.released.insert(id);
        self.counts.entry(kind).or_default().released += 1;
        if self.program == Some(id) {
            self.program = None;
        }
        if self.texture == Some(id) {
            self.texture = None;
        }
        log::debug!("headless: released {kind} {id}");
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<RawId> {
        Ok(self.insert(Object::Shader {
            stage,
            source: None,
            interface: None,
        }))
    }

    fn shader_source(&mut self, shader: RawId, text: &str) -> Result<()> {
        if let Object::Shader { source, .. } = self.get(shader, ObjectKind::Shader)? {
            *source = Some(text.to_owned());
        }
        Ok(())
    }

    fn compile_shader(&mut self, shader: RawId) -> Result<std::result::Result<(), String>> {
        let Object::Shader {
            stage,
            source,
            interface,
        } = self.get(shader, ObjectKind::Shader)?
        else {
            return Err(EngineError::invalid(format!("{shader} is not a shader")));
        };

        let Some(src) = source.as_deref() else {
            return Ok(Err("shader has no source".to_string()));
        };

        Ok(wgsl::compile(*stage, src).map(|compiled| {
            *interface = Some(compiled);
        }))
    }

    fn delete_shader(&mut self, shader: RawId) {
        self.delete(shader, ObjectKind::Shader);
    }

    fn create_program(&mut self) -> Result<RawId> {
        Ok(self.insert(Object::Program {
            attached: Vec::new(),
            linked: None,
        }))
    }

    fn attach_shader(&mut self, program: RawId, shader: RawId) -> Result<()> {
        self.get(shader, ObjectKind::Shader)?;
        if let Object::Program { attached, .. } = self.get(program, ObjectKind::Program)? {
            if !attached.contains(&shader) {
                attached.push(shader);
            }
        }
        Ok(())
    }

    fn link_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>> {
        let Object::Program { attached, .. } = self.get(program, ObjectKind::Program)? else {
            return Err(EngineError::invalid(format!("{program} is not a program")));
        };
        let attached = attached.clone();

        let mut stages = Vec::with_capacity(attached.len());
        for id in &attached {
            match self.objects.get(id) {
                Some(Object::Shader {
                    interface: Some(i), ..
                }) => stages.push(i),
                Some(Object::Shader { stage, .. }) => {
                    return Ok(Err(format!("{stage} shader {id} is not compiled")));
                }
                _ => return Ok(Err(format!("attached shader {id} no longer exists"))),
            }
        }

        let result = wgsl::link(&stages);
        let outcome = match result {
            Ok(interface) => {
                if let Some(Object::Program { linked, .. }) = self.objects.get_mut(&program) {
                    *linked = Some(interface);
                }
                Ok(())
            }
            Err(log) => Err(log),
        };
        Ok(outcome)
    }

    fn validate_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>> {
        match self.get(program, ObjectKind::Program)? {
            Object::Program {
                linked: Some(interface),
                ..
            } => Ok(interface.validate()),
            _ => Err(EngineError::InvalidState(format!(
                "program {program} is not linked"
            ))),
        }
    }

    fn use_program(&mut self, program: Option<RawId>) -> Result<()> {
        if let Some(id) = program {
            let linked = matches!(
                self.get(id, ObjectKind::Program)?,
                Object::Program { linked: Some(_), .. }
            );
            if !linked {
                return Err(EngineError::InvalidState(format!(
                    "program {id} is not linked"
                )));
            }
        }
        self.program = program;
        Ok(())
    }

    fn delete_program(&mut self, program: RawId) {
        self.delete(program, ObjectKind::Program);
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<RawId> {
        if desc.width == 0 || desc.height == 0 {
            return Err(EngineError::invalid(format!(
                "texture dimensions must be positive, got {}x{}",
                desc.width, desc.height
            )));
        }
        Ok(self.insert(Object::Texture {
            desc: *desc,
            pixels: None,
        }))
    }

    fn upload_texture(&mut self, texture: RawId, data: &[u8]) -> Result<()> {
        if let Object::Texture { desc, pixels } = self.get(texture, ObjectKind::Texture)? {
            if data.len() != desc.upload_len() {
                return Err(EngineError::invalid(format!(
                    "texture {texture} expects {} bytes, got {}",
                    desc.upload_len(),
                    data.len()
                )));
            }
            *pixels = Some(data.to_vec());
        }
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<RawId>) -> Result<()> {
        if unit >= TEXTURE_UNITS {
            return Err(EngineError::invalid(format!(
                "texture unit {unit} out of range (units: {TEXTURE_UNITS})"
            )));
        }
        if let Some(id) = texture {
            self.get(id, ObjectKind::Texture)?;
        }
        self.texture = texture;
        Ok(())
    }

    fn delete_texture(&mut self, texture: RawId) {
        self.delete(texture, ObjectKind::Texture);
    }

    fn create_mesh(&mut self, vertices: &[f32], indices: &[u32], stride: u32) -> Result<RawId> {
        check_geometry(vertices, indices, stride)?;
        Ok(self.insert(Object::Mesh {
            index_count: indices.len() as u32,
        }))
    }

    fn draw_mesh(&mut self, mesh: RawId) -> Result<()> {
        let index_count = match self.get(mesh, ObjectKind::Mesh)? {
            Object::Mesh { index_count } => *index_count,
            _ => 0,
        };

        let Some(program) = self.program else {
            return Err(EngineError::InvalidState("no program installed".into()));
        };
        if let Some(Object::Program {
            linked: Some(interface),
            ..
        }) = self.objects.get(&program)
        {
            if interface.is_compute() {
                return Err(EngineError::InvalidState(format!(
                    "compute program {program} cannot draw meshes"
                )));
            }
        }

        self.draws.push(DrawRecord {
            program,
            mesh,
            texture: self.texture,
            index_count,
        });
        Ok(())
    }

    fn delete_mesh(&mut self, mesh: RawId) {
        self.delete(mesh, ObjectKind::Mesh);
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::wgsl::sources;
    use crate::texture::TextureConfig;

    const QUAD: [f32; 16] = [
        -0.5, -0.5, 0.0, 0.0, //
        0.5, -0.5, 1.0, 0.0, //
        0.5, 0.5, 1.0, 1.0, //
        -0.5, 0.5, 0.0, 1.0,
    ];
    const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

    fn compiled(b: &mut HeadlessBackend, stage: ShaderStage, src: &str) -> RawId {
        let id = b.create_shader(stage).unwrap();
        b.shader_source(id, src).unwrap();
        b.compile_shader(id).unwrap().unwrap();
        id
    }

    fn linked_program(b: &mut HeadlessBackend) -> RawId {
        let vs = compiled(b, ShaderStage::Vertex, sources::VERTEX);
        let fs = compiled(b, ShaderStage::Fragment, sources::FRAGMENT);
        let program = b.create_program().unwrap();
        b.attach_shader(program, vs).unwrap();
        b.attach_shader(program, fs).unwrap();
        b.link_program(program).unwrap().unwrap();
        program
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn creation_and_release_are_counted_per_kind() {
        let mut b = HeadlessBackend::new();
        let mesh = b.create_mesh(&QUAD, &QUAD_INDICES, 4).unwrap();
        assert!(b.is_live(mesh));
        assert_eq!(b.live_count(ObjectKind::Mesh), 1);

        b.delete_mesh(mesh);
        assert!(!b.is_live(mesh));
        assert_eq!(b.created_count(ObjectKind::Mesh), 1);
        assert_eq!(b.released_count(ObjectKind::Mesh), 1);
        assert_eq!(b.delete_calls(mesh), 1);
        assert!(b.violations().is_empty());
    }

    #[test]
    fn double_delete_is_a_violation_not_a_second_release() {
        let mut b = HeadlessBackend::new();
        let mesh = b.create_mesh(&QUAD, &QUAD_INDICES, 4).unwrap();
        b.delete_mesh(mesh);
        b.delete_mesh(mesh);
        assert_eq!(b.delete_calls(mesh), 2);
        assert_eq!(b.released_count(ObjectKind::Mesh), 1);
        assert_eq!(b.violations().len(), 1);
    }

    #[test]
    fn released_ids_report_use_after_release() {
        let mut b = HeadlessBackend::new();
        let tex = b
            .create_texture(&TextureDesc {
                width: 1,
                height: 1,
                config: TextureConfig::DEFAULT,
            })
            .unwrap();
        b.delete_texture(tex);

        let err = b.upload_texture(tex, &[0; 4]).unwrap_err();
        assert!(matches!(err, EngineError::UseAfterRelease(id) if id == tex));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut b = HeadlessBackend::new();
        let program = b.create_program().unwrap();
        assert!(matches!(
            b.shader_source(program, "").unwrap_err(),
            EngineError::InvalidParameter(_)
        ));
    }

    // ── programs ──────────────────────────────────────────────────────────

    #[test]
    fn compile_failure_returns_the_diagnostic() {
        let mut b = HeadlessBackend::new();
        let id = b.create_shader(ShaderStage::Fragment).unwrap();
        b.shader_source(id, sources::BROKEN).unwrap();
        assert!(b.compile_shader(id).unwrap().is_err());
    }

    #[test]
    fn linking_needs_compiled_stages() {
        let mut b = HeadlessBackend::new();
        let vs = b.create_shader(ShaderStage::Vertex).unwrap();
        let program = b.create_program().unwrap();
        b.attach_shader(program, vs).unwrap();
        let log = b.link_program(program).unwrap().unwrap_err();
        assert!(log.contains("not compiled"), "{log}");
    }

    #[test]
    fn unlinked_program_cannot_be_installed() {
        let mut b = HeadlessBackend::new();
        let program = b.create_program().unwrap();
        assert!(matches!(
            b.use_program(Some(program)).unwrap_err(),
            EngineError::InvalidState(_)
        ));
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draws_are_recorded_with_program_and_texture() {
        let mut b = HeadlessBackend::new();
        let program = linked_program(&mut b);
        let mesh = b.create_mesh(&QUAD, &QUAD_INDICES, 4).unwrap();
        let tex = b
            .create_texture(&TextureDesc {
                width: 2,
                height: 1,
                config: TextureConfig::OPAQUE_RGB,
            })
            .unwrap();
        b.upload_texture(tex, &[0; 6]).unwrap();

        b.use_program(Some(program)).unwrap();
        b.bind_texture(0, Some(tex)).unwrap();
        b.draw_mesh(mesh).unwrap();

        assert_eq!(
            b.draws(),
            [DrawRecord {
                program,
                mesh,
                texture: Some(tex),
                index_count: 6,
            }]
        );

        b.present();
        assert!(b.draws().is_empty());
        assert_eq!(b.last_frame().len(), 1);
        assert_eq!(b.frames_presented(), 1);
    }

    #[test]
    fn drawing_without_program_is_invalid_state() {
        let mut b = HeadlessBackend::new();
        let mesh = b.create_mesh(&QUAD, &QUAD_INDICES, 4).unwrap();
        assert!(matches!(
            b.draw_mesh(mesh).unwrap_err(),
            EngineError::InvalidState(_)
        ));
    }

    #[test]
    fn deleting_installed_program_uninstalls_it() {
        let mut b = HeadlessBackend::new();
        let program = linked_program(&mut b);
        b.use_program(Some(program)).unwrap();
        b.delete_program(program);
        assert_eq!(b.installed_program(), None);
    }

    #[test]
    fn upload_length_must_match_dimensions() {
        let mut b = HeadlessBackend::new();
        let tex = b
            .create_texture(&TextureDesc {
                width: 2,
                height: 2,
                config: TextureConfig::DEFAULT,
            })
            .unwrap();
        assert!(b.upload_texture(tex, &[0; 15]).is_err());
        assert!(b.texture_pixels(tex).is_none());
        b.upload_texture(tex, &[7; 16]).unwrap();
        assert_eq!(b.texture_pixels(tex), Some(&[7u8; 16][..]));
    }

    #[test]
    fn only_unit_zero_exists() {
        let mut b = HeadlessBackend::new();
        assert!(b.bind_texture(1, None).is_err());
        assert!(b.bind_texture(0, None).is_ok());
    }
}
