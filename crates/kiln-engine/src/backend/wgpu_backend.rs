use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::device::Gpu;
use crate::error::{EngineError, Result};
use crate::mesh::check_geometry;
use crate::paint::Color;
use crate::shader::wgsl::{self, LinkedInterface, ProgramLayout, StageInterface};
use crate::shader::ShaderStage;
use crate::texture::{Filter, PixelFormat, TextureConfig, Wrap};

use super::pixels;
use super::{IdAllocator, RawId, RenderBackend, TextureDesc, TEXTURE_UNITS};

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x2,
];

struct GpuShader {
    stage: ShaderStage,
    source: Option<String>,
    compiled: Option<(StageInterface, wgpu::ShaderModule)>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    stride: u32,
    blend: bool,
}

struct LinkedProgram {
    interface: LinkedInterface,
    vertex: Option<wgpu::ShaderModule>,
    fragment: Option<wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

struct GpuProgram {
    attached: Vec<RawId>,
    linked: Option<LinkedProgram>,
}

struct GpuTexture {
    desc: TextureDesc,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    stride: u32,
}

#[derive(Debug, Copy, Clone)]
struct DrawCall {
    program: RawId,
    mesh: RawId,
    texture: Option<RawId>,
    key: PipelineKey,
}

/// `RenderBackend` drawing through wgpu.
///
/// Draw calls are recorded during `render` and replayed into a single render
/// pass by `present()`. Pipelines are built lazily per (program, vertex
/// stride, blend) on the first draw that needs them.
pub struct WgpuBackend {
    gpu: Gpu,

    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    /// 1x1 white texture sampled when no texture is bound.
    fallback: GpuTexture,

    ids: IdAllocator,
    released: HashSet<RawId>,
    shaders: HashMap<RawId, GpuShader>,
    programs: HashMap<RawId, GpuProgram>,
    textures: HashMap<RawId, GpuTexture>,
    meshes: HashMap<RawId, GpuMesh>,

    program: Option<RawId>,
    texture: Option<RawId>,
    clear_color: Color,
    draws: Vec<DrawCall>,
}

impl WgpuBackend {
    pub fn new(gpu: Gpu) -> Self {
        let device = gpu.device();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: wgsl::TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: wgsl::SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let fallback_desc = TextureDesc {
            width: 1,
            height: 1,
            config: TextureConfig::DEFAULT,
        };
        let fallback = create_gpu_texture(device, &bind_group_layout, &fallback_desc, 1);
        write_level(gpu.queue(), &fallback.texture, 0, 1, 1, &[255, 255, 255, 255]);

        Self {
            gpu,
            bind_group_layout,
            pipeline_layout,
            fallback,
            ids: IdAllocator::default(),
            released: HashSet::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            meshes: HashMap::new(),
            program: None,
            texture: None,
            clear_color: Color::BLACK,
            draws: Vec::new(),
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Clears the surface, replays the recorded draws and presents.
    ///
    /// Frames the surface cannot provide (minimized, lost, timed out) are
    /// dropped. An out-of-memory surface is `EngineError::Device`.
    pub fn present(&mut self) -> Result<()> {
        let draws = std::mem::take(&mut self.draws);
        let Some(mut frame) = self.gpu.begin_frame()? else {
            return Ok(());
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &draws {
                self.encode(&mut rpass, draw);
            }
        }

        self.gpu.submit(frame);
        Ok(())
    }

    fn encode(&self, rpass: &mut wgpu::RenderPass<'_>, draw: &DrawCall) {
        let pipeline = self
            .programs
            .get(&draw.program)
            .and_then(|p| p.linked.as_ref())
            .and_then(|l| l.pipelines.get(&draw.key));
        let Some(pipeline) = pipeline else {
            log::error!("draw skipped: program {} released before present", draw.program);
            return;
        };
        let Some(mesh) = self.meshes.get(&draw.mesh) else {
            log::error!("draw skipped: mesh {} released before present", draw.mesh);
            return;
        };
        let bind_group = match draw.texture {
            Some(id) => match self.textures.get(&id) {
                Some(texture) => &texture.bind_group,
                None => {
                    log::error!("draw skipped: texture {id} released before present");
                    return;
                }
            },
            None => &self.fallback.bind_group,
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
        rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn missing(&self, id: RawId, kind: &str) -> EngineError {
        if self.released.contains(&id) {
            EngineError::UseAfterRelease(id)
        } else {
            EngineError::invalid(format!("unknown {kind} id {id}"))
        }
    }

    fn release(&mut self, id: RawId, kind: &str, removed: bool) {
        if !removed {
            log::error!("wgpu: delete {kind} {id} rejected: {}", self.missing(id, kind));
            return;
        }
        self.released.insert(id);
        if self.program == Some(id) {
            self.program = None;
        }
        if self.texture == Some(id) {
            self.texture = None;
        }
        log::debug!("wgpu: released {kind} {id}");
    }
}

impl RenderBackend for WgpuBackend {
    fn create_shader(&mut self, stage: ShaderStage) -> Result<RawId> {
        let id = self.ids.next();
        self.shaders.insert(
            id,
            GpuShader {
                stage,
                source: None,
                compiled: None,
            },
        );
        Ok(id)
    }

    fn shader_source(&mut self, shader: RawId, source: &str) -> Result<()> {
        let err = self.missing(shader, "shader");
        let entry = self.shaders.get_mut(&shader).ok_or(err)?;
        entry.source = Some(source.to_owned());
        entry.compiled = None;
        Ok(())
    }

    fn compile_shader(&mut self, shader: RawId) -> Result<std::result::Result<(), String>> {
        let err = self.missing(shader, "shader");
        let entry = self.shaders.get_mut(&shader).ok_or(err)?;
        let Some(source) = entry.source.as_deref() else {
            return Ok(Err("shader has no source".to_string()));
        };

        let interface = match wgsl::compile(entry.stage, source) {
            Ok(interface) => interface,
            Err(log) => return Ok(Err(log)),
        };
        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("kiln shader"),
                source: wgpu::ShaderSource::Wgsl(source.to_owned().into()),
            });
        entry.compiled = Some((interface, module));
        Ok(Ok(()))
    }

    fn delete_shader(&mut self, shader: RawId) {
        let removed = self.shaders.remove(&shader).is_some();
        self.release(shader, "shader", removed);
    }

    fn create_program(&mut self) -> Result<RawId> {
        let id = self.ids.next();
        self.programs.insert(
            id,
            GpuProgram {
                attached: Vec::new(),
                linked: None,
            },
        );
        Ok(id)
    }

    fn attach_shader(&mut self, program: RawId, shader: RawId) -> Result<()> {
        if !self.shaders.contains_key(&shader) {
            return Err(self.missing(shader, "shader"));
        }
        let err = self.missing(program, "program");
        let entry = self.programs.get_mut(&program).ok_or(err)?;
        if !entry.attached.contains(&shader) {
            entry.attached.push(shader);
        }
        Ok(())
    }

    fn link_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>> {
        let err = self.missing(program, "program");
        let attached = self.programs.get(&program).ok_or(err)?.attached.clone();

        let mut interfaces = Vec::with_capacity(attached.len());
        let mut vertex = None;
        let mut fragment = None;
        for id in &attached {
            let Some(shader) = self.shaders.get(id) else {
                return Ok(Err(format!("attached shader {id} no longer exists")));
            };
            let Some((interface, module)) = &shader.compiled else {
                return Ok(Err(format!("{} shader {id} is not compiled", shader.stage)));
            };
            match shader.stage {
                ShaderStage::Vertex => vertex = Some(module.clone()),
                ShaderStage::Fragment => fragment = Some(module.clone()),
                _ => {}
            }
            interfaces.push(interface);
        }

        let interface = match wgsl::link(&interfaces) {
            Ok(interface) => interface,
            Err(log) => return Ok(Err(log)),
        };

        if let Some(entry) = self.programs.get_mut(&program) {
            entry.linked = Some(LinkedProgram {
                interface,
                vertex,
                fragment,
                pipelines: HashMap::new(),
            });
        }
        Ok(Ok(()))
    }

    fn validate_program(&mut self, program: RawId) -> Result<std::result::Result<(), String>> {
        let err = self.missing(program, "program");
        match &self.programs.get(&program).ok_or(err)?.linked {
            Some(linked) => Ok(linked.interface.validate()),
            None => Err(EngineError::InvalidState(format!(
                "program {program} is not linked"
            ))),
        }
    }

    fn use_program(&mut self, program: Option<RawId>) -> Result<()> {
        if let Some(id) = program {
            let err = self.missing(id, "program");
            if self.programs.get(&id).ok_or(err)?.linked.is_none() {
                return Err(EngineError::InvalidState(format!("program {id} is not linked")));
            }
        }
        self.program = program;
        Ok(())
    }

    fn delete_program(&mut self, program: RawId) {
        let removed = self.programs.remove(&program).is_some();
        self.release(program, "program", removed);
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<RawId> {
        let max = self.gpu.max_texture_dimension();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(EngineError::invalid(format!(
                "texture dimensions {}x{} outside 1..={max}",
                desc.width, desc.height
            )));
        }

        let mip_levels = if desc.config.mipmaps {
            pixels::mip_level_count(desc.width, desc.height)
        } else {
            1
        };
        let texture = create_gpu_texture(self.gpu.device(), &self.bind_group_layout, desc, mip_levels);

        let id = self.ids.next();
        self.textures.insert(id, texture);
        log::debug!(
            "wgpu: created texture {id} ({}x{}, {mip_levels} mip levels)",
            desc.width,
            desc.height
        );
        Ok(id)
    }

    fn upload_texture(&mut self, texture: RawId, data: &[u8]) -> Result<()> {
        let err = self.missing(texture, "texture");
        let entry = self.textures.get(&texture).ok_or(err)?;
        let desc = entry.desc;
        if data.len() != desc.upload_len() {
            return Err(EngineError::invalid(format!(
                "texture {texture} expects {} bytes, got {}",
                desc.upload_len(),
                data.len()
            )));
        }

        let mut level = match desc.config.format {
            PixelFormat::Rgba8 => data.to_vec(),
            PixelFormat::Rgb8 => pixels::rgb_to_rgba(data),
        };
        let (mut width, mut height) = (desc.width, desc.height);
        let queue = self.gpu.queue();

        write_level(queue, &entry.texture, 0, width, height, &level);
        for mip in 1..entry.texture.mip_level_count() {
            let (next, w, h) = pixels::downsample_rgba(&level, width, height);
            write_level(queue, &entry.texture, mip, w, h, &next);
            (level, width, height) = (next, w, h);
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
            if !self.textures.contains_key(&id) {
                return Err(self.missing(id, "texture"));
            }
        }
        self.texture = texture;
        Ok(())
    }

    fn delete_texture(&mut self, texture: RawId) {
        let removed = match self.textures.remove(&texture) {
            Some(entry) => {
                entry.texture.destroy();
                true
            }
            None => false,
        };
        self.release(texture, "texture", removed);
    }

    fn create_mesh(&mut self, vertices: &[f32], indices: &[u32], stride: u32) -> Result<RawId> {
        check_geometry(vertices, indices, stride)?;
        let device = self.gpu.device();
        let max_stride = device.limits().max_vertex_buffer_array_stride;
        if u64::from(stride) * 4 > u64::from(max_stride) {
            return Err(EngineError::invalid(format!(
                "mesh stride of {stride} floats exceeds the device limit of {max_stride} bytes"
            )));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln mesh vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln mesh indices"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = self.ids.next();
        self.meshes.insert(
            id,
            GpuMesh {
                vertices: vertex_buffer,
                indices: index_buffer,
                index_count: indices.len() as u32,
                stride,
            },
        );
        Ok(id)
    }

    fn draw_mesh(&mut self, mesh: RawId) -> Result<()> {
        let stride = match self.meshes.get(&mesh) {
            Some(entry) => entry.stride,
            None => return Err(self.missing(mesh, "mesh")),
        };
        let Some(program) = self.program else {
            return Err(EngineError::InvalidState("no program installed".into()));
        };
        // Untextured draws sample the opaque white fallback.
        let blend = match self.texture {
            Some(id) => match self.textures.get(&id) {
                Some(entry) => entry.desc.config.blend,
                None => return Err(self.missing(id, "texture")),
            },
            None => true,
        };
        let key = PipelineKey { stride, blend };

        let format = self.gpu.surface_format();
        let linked = self
            .programs
            .get_mut(&program)
            .and_then(|p| p.linked.as_mut())
            .ok_or_else(|| EngineError::InvalidState(format!("program {program} is not linked")))?;

        if !linked.pipelines.contains_key(&key) {
            let pipeline = build_pipeline(
                self.gpu.device(),
                &self.pipeline_layout,
                format,
                linked,
                key,
            )
            .ok_or_else(|| {
                EngineError::InvalidState(format!("compute program {program} cannot draw meshes"))
            })?;
            log::debug!("wgpu: built pipeline for program {program} ({key:?})");
            linked.pipelines.insert(key, pipeline);
        }

        self.draws.push(DrawCall {
            program,
            mesh,
            texture: self.texture,
            key,
        });
        Ok(())
    }

    fn delete_mesh(&mut self, mesh: RawId) {
        let removed = match self.meshes.remove(&mesh) {
            Some(entry) => {
                entry.vertices.destroy();
                entry.indices.destroy();
                true
            }
            None => false,
        };
        self.release(mesh, "mesh", removed);
    }

    fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }
}

fn create_gpu_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    desc: &TextureDesc,
    mip_levels: u32,
) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("kiln texture"),
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&sampler_descriptor(&desc.config));

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("kiln texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: wgsl::TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: wgsl::SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuTexture {
        desc: *desc,
        texture,
        bind_group,
    }
}

fn write_level(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: mip,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

fn sampler_descriptor(config: &TextureConfig) -> wgpu::SamplerDescriptor<'static> {
    let mipmap_filter = match (config.mipmaps, config.min_filter) {
        (true, Filter::Linear) => wgpu::MipmapFilterMode::Linear,
        _ => wgpu::MipmapFilterMode::Nearest,
    };
    wgpu::SamplerDescriptor {
        label: Some("kiln texture sampler"),
        address_mode_u: address_mode(config.wrap_s),
        address_mode_v: address_mode(config.wrap_t),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter_mode(config.mag_filter),
        min_filter: filter_mode(config.min_filter),
        mipmap_filter,
        ..Default::default()
    }
}

fn address_mode(wrap: Wrap) -> wgpu::AddressMode {
    match wrap {
        Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        Wrap::Repeat => wgpu::AddressMode::Repeat,
        Wrap::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

fn filter_mode(filter: Filter) -> wgpu::FilterMode {
    match filter {
        Filter::Nearest => wgpu::FilterMode::Nearest,
        Filter::Linear => wgpu::FilterMode::Linear,
    }
}

/// Premultiplied alpha blending.
fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// `None` for compute programs.
fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    linked: &LinkedProgram,
    key: PipelineKey,
) -> Option<wgpu::RenderPipeline> {
    let ProgramLayout::Graphics {
        vertex_entry,
        fragment_entry,
    } = &linked.interface.layout
    else {
        return None;
    };
    let vertex = linked.vertex.as_ref()?;
    let fragment = linked.fragment.as_ref()?;

    let buffers = [wgpu::VertexBufferLayout {
        array_stride: u64::from(key.stride) * std::mem::size_of::<f32>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }];

    Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("kiln mesh pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: key.blend.then(premul_alpha_blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_follows_texture_config() {
        let desc = sampler_descriptor(&TextureConfig::TILED_REPEAT);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);

        let pixel = sampler_descriptor(&TextureConfig::PIXEL_ART);
        assert_eq!(pixel.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(pixel.min_filter, wgpu::FilterMode::Nearest);
    }

    #[test]
    fn mipmap_filter_only_interpolates_mipmapped_linear_textures() {
        let mipmapped = sampler_descriptor(&TextureConfig::MIPMAPPED);
        assert_eq!(mipmapped.mipmap_filter, wgpu::MipmapFilterMode::Linear);

        let flat = sampler_descriptor(&TextureConfig::DEFAULT.with_filter(Filter::Linear));
        assert_eq!(flat.mipmap_filter, wgpu::MipmapFilterMode::Nearest);
    }

    #[test]
    fn mirrored_wrap_maps_to_mirror_repeat() {
        assert_eq!(address_mode(Wrap::MirroredRepeat), wgpu::AddressMode::MirrorRepeat);
        assert_eq!(address_mode(Wrap::ClampToEdge), wgpu::AddressMode::ClampToEdge);
    }
}
