//! WGSL front end shared by the shipped backends.
//!
//! `compile` parses and validates one stage with naga and extracts its
//! interface; `link` checks a set of stage interfaces against each other and
//! against the fixed engine pipeline layout:
//! - vertex buffer: `@location(0)` position, `@location(1)` uv (`vec2<f32>` each)
//! - bind group 0: `@binding(0)` `texture_2d<f32>`, `@binding(1)` `sampler`
//! - one float colour target at `@location(0)`

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::ShaderStage;

pub const POSITION_LOCATION: u32 = 0;
pub const UV_LOCATION: u32 = 1;
pub const TEXTURE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    Texture2d,
    Sampler,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScalarType {
    Float,
    Sint,
    Uint,
    Other,
}

/// A user `@location` and the type read or written there.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Location {
    pub index: u32,
    pub scalar: ScalarType,
    pub components: u32,
}

/// A bound global variable an entry point actually uses.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceUse {
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
    pub name: String,
}

/// What one compiled stage reads and writes.
#[derive(Debug, Clone)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    /// User `@location`s of the entry point arguments.
    pub inputs: Vec<Location>,
    /// User `@location`s of the entry point result.
    pub outputs: Vec<Location>,
    pub resources: Vec<ResourceUse>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProgramLayout {
    Graphics {
        vertex_entry: String,
        fragment_entry: String,
    },
    Compute {
        entry: String,
    },
}

/// Result of a successful link.
#[derive(Debug, Clone)]
pub struct LinkedInterface {
    pub layout: ProgramLayout,
    pub vertex_inputs: Vec<u32>,
    pub resources: Vec<ResourceUse>,
}

impl LinkedInterface {
    pub fn is_compute(&self) -> bool {
        matches!(self.layout, ProgramLayout::Compute { .. })
    }

    /// Checks for programs that link but will not behave as expected.
    /// The error carries one warning per line.
    pub fn validate(&self) -> Result<(), String> {
        let mut warnings = Vec::new();

        if !self.is_compute() && !self.vertex_inputs.contains(&POSITION_LOCATION) {
            warnings.push(format!(
                "vertex stage ignores the position attribute (@location({POSITION_LOCATION}))"
            ));
        }

        let has = |kind| self.resources.iter().any(|r| r.kind == kind);
        match (has(ResourceKind::Texture2d), has(ResourceKind::Sampler)) {
            (true, false) => warnings.push("texture is declared without a sampler".to_string()),
            (false, true) => warnings.push("sampler is declared without a texture".to_string()),
            _ => {}
        }

        if warnings.is_empty() {
            Ok(())
        } else {
            Err(warnings.join("\n"))
        }
    }
}

/// Parses and validates `source`, then extracts the interface of the first
/// entry point for `stage`. The error is the rendered diagnostic.
pub fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let naga_stage = naga_stage(stage).ok_or_else(|| format!("WGSL has no {stage} stage"))?;

    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| error_chain(&e))?;

    let (index, entry) = module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.stage == naga_stage)
        .ok_or_else(|| format!("no {stage} entry point found"))?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(&module, arg.binding.as_ref(), arg.ty, &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(&module, result.binding.as_ref(), result.ty, &mut outputs);
    }

    let usage = info.get_entry_point(index);
    let mut resources = Vec::new();
    for (handle, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        if usage[handle].is_empty() {
            continue;
        }
        resources.push(ResourceUse {
            group: binding.group,
            binding: binding.binding,
            kind: resource_kind(&module.types[var.ty].inner),
            name: var.name.clone().unwrap_or_default(),
        });
    }

    inputs.sort_unstable_by_key(|l| l.index);
    outputs.sort_unstable_by_key(|l| l.index);

    Ok(StageInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        resources,
    })
}

/// Checks the stage combination and the interfaces between stages.
/// The error is a linker log, one problem per line.
pub fn link(stages: &[&StageInterface]) -> Result<LinkedInterface, String> {
    if stages.is_empty() {
        return Err("no shader stages attached".to_string());
    }

    let vertex = find_stage(stages, ShaderStage::Vertex)?;
    let fragment = find_stage(stages, ShaderStage::Fragment)?;
    let compute = find_stage(stages, ShaderStage::Compute)?;

    if let Some(other) = stages.iter().find(|s| naga_stage(s.stage).is_none()) {
        return Err(format!("{} stages are not supported", other.stage));
    }

    match (vertex, fragment, compute) {
        (None, None, Some(compute)) => {
            let mut log = Vec::new();
            check_resources(compute, &mut log);
            finish(log)?;
            Ok(LinkedInterface {
                layout: ProgramLayout::Compute {
                    entry: compute.entry_point.clone(),
                },
                vertex_inputs: Vec::new(),
                resources: compute.resources.clone(),
            })
        }
        (Some(vertex), Some(fragment), None) => link_graphics(vertex, fragment),
        (_, _, Some(_)) => Err("a compute stage cannot be linked with graphics stages".to_string()),
        (Some(_), None, None) => Err("vertex stage has no fragment stage to link with".to_string()),
        (None, Some(_), None) => Err("fragment stage has no vertex stage to link with".to_string()),
        (None, None, None) => Err("no linkable stages attached".to_string()),
    }
}

fn find_stage<'a>(
    stages: &[&'a StageInterface],
    stage: ShaderStage,
) -> Result<Option<&'a StageInterface>, String> {
    let mut found = stages.iter().filter(|s| s.stage == stage);
    let first = found.next().copied();
    if found.next().is_some() {
        return Err(format!("more than one {stage} stage attached"));
    }
    Ok(first)
}

fn link_graphics(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<LinkedInterface, String> {
    let mut log = Vec::new();

    for input in &vertex.inputs {
        let index = input.index;
        if index != POSITION_LOCATION && index != UV_LOCATION {
            log.push(format!(
                "vertex input @location({index}) is not part of the vertex layout \
                 (0: position, 1: uv)"
            ));
        } else if input.scalar != ScalarType::Float {
            log.push(format!(
                "vertex input @location({index}) must be a float type, the vertex buffer \
                 supplies vec2<f32>"
            ));
        }
    }

    for input in &fragment.inputs {
        let index = input.index;
        match vertex.outputs.iter().find(|o| o.index == index) {
            None => log.push(format!(
                "fragment input @location({index}) is not written by the vertex stage"
            )),
            Some(output) if output.scalar != input.scalar => log.push(format!(
                "fragment input @location({index}) does not match the scalar type the vertex \
                 stage writes there"
            )),
            Some(_) => {}
        }
    }

    match fragment.outputs.as_slice() {
        [color] if color.index == 0 => {
            if color.scalar != ScalarType::Float {
                log.push(
                    "fragment output @location(0) must be a float type for the colour target"
                        .to_string(),
                );
            }
        }
        _ => log.push(
            "fragment stage must write exactly one colour output at @location(0)".to_string(),
        ),
    }

    check_resources(vertex, &mut log);
    check_resources(fragment, &mut log);
    finish(log)?;

    let mut resources = vertex.resources.clone();
    for r in &fragment.resources {
        if !resources.iter().any(|v| v.group == r.group && v.binding == r.binding) {
            resources.push(r.clone());
        }
    }

    Ok(LinkedInterface {
        layout: ProgramLayout::Graphics {
            vertex_entry: vertex.entry_point.clone(),
            fragment_entry: fragment.entry_point.clone(),
        },
        vertex_inputs: vertex.inputs.iter().map(|l| l.index).collect(),
        resources,
    })
}

fn check_resources(stage: &StageInterface, log: &mut Vec<String>) {
    for r in &stage.resources {
        let expected = match (r.group, r.binding) {
            (0, TEXTURE_BINDING) => Some(ResourceKind::Texture2d),
            (0, SAMPLER_BINDING) => Some(ResourceKind::Sampler),
            _ => None,
        };
        if expected != Some(r.kind) {
            log.push(format!(
                "{} resource '{}' at @group({}) @binding({}) does not fit the engine bind group \
                 (group 0: binding 0 texture_2d<f32>, binding 1 sampler)",
                stage.stage, r.name, r.group, r.binding
            ));
        }
    }
}

fn finish(log: Vec<String>) -> Result<(), String> {
    if log.is_empty() {
        Ok(())
    } else {
        Err(log.join("\n"))
    }
}

fn naga_stage(stage: ShaderStage) -> Option<naga::ShaderStage> {
    match stage {
        ShaderStage::Vertex => Some(naga::ShaderStage::Vertex),
        ShaderStage::Fragment => Some(naga::ShaderStage::Fragment),
        ShaderStage::Compute => Some(naga::ShaderStage::Compute),
        ShaderStage::Geometry | ShaderStage::TessControl | ShaderStage::TessEvaluation => None,
    }
}

fn collect_locations(
    module: &naga::Module,
    binding: Option<&naga::Binding>,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<Location>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            let (scalar, components) = match &module.types[ty].inner {
                naga::TypeInner::Scalar(scalar) => (scalar_type(scalar.kind), 1),
                naga::TypeInner::Vector { size, scalar } => (scalar_type(scalar.kind), *size as u32),
                _ => (ScalarType::Other, 0),
            };
            out.push(Location {
                index: *location,
                scalar,
                components,
            });
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.binding.as_ref(), member.ty, out);
                }
            }
        }
    }
}

fn scalar_type(kind: naga::ScalarKind) -> ScalarType {
    match kind {
        naga::ScalarKind::Float => ScalarType::Float,
        naga::ScalarKind::Sint => ScalarType::Sint,
        naga::ScalarKind::Uint => ScalarType::Uint,
        _ => ScalarType::Other,
    }
}

fn resource_kind(inner: &naga::TypeInner) -> ResourceKind {
    match inner {
        naga::TypeInner::Image {
            dim: naga::ImageDimension::D2,
            arrayed: false,
            class:
                naga::ImageClass::Sampled {
                    kind: naga::ScalarKind::Float,
                    multi: false,
                },
        } => ResourceKind::Texture2d,
        naga::TypeInner::Sampler { comparison: false } => ResourceKind::Sampler,
        _ => ResourceKind::Other,
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
