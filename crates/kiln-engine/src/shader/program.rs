use std::fmt;

use crate::backend::{RawId, RenderBackend};
use crate::error::{EngineError, Result};
use crate::resource::{Lifecycle, NativeHandle, Release};

use super::{Shader, ShaderStage, StageRegistry};

/// Outcome of the post-link validation pass.
///
/// A warning never blocks `install`; it is logged once when the program is
/// assembled and kept here for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramValidation {
    Passed,
    Warned(String),
}

impl ProgramValidation {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// A linked shader program.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: NativeHandle,
    stages: Vec<ShaderStage>,
    validation: ProgramValidation,
}

impl ShaderProgram {
    /// Compiles `sources` and links them. Every intermediate object is
    /// released whatever the outcome.
    pub fn from_sources(
        backend: &mut dyn RenderBackend,
        sources: &[(ShaderStage, &str)],
    ) -> Result<Self> {
        let mut assembler = ProgramAssembler::new();
        for (stage, source) in sources {
            if let Err(err) = assembler.compile_stage(backend, *stage, source) {
                assembler.release(backend);
                return Err(err);
            }
        }
        assembler.link_or_release(backend)
    }

    /// Installs the program for subsequent draws.
    pub fn install(&self, backend: &mut dyn RenderBackend) -> Result<()> {
        backend.use_program(Some(self.handle.id()))
    }

    pub fn uninstall(backend: &mut dyn RenderBackend) -> Result<()> {
        backend.use_program(None)
    }

    pub fn validation(&self) -> &ProgramValidation {
        &self.validation
    }

    /// Stages the program was linked from, in attach order.
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    pub fn raw(&self) -> RawId {
        self.handle.id()
    }
}

impl Release for ShaderProgram {
    fn release(self, backend: &mut dyn RenderBackend) {
        backend.delete_program(self.handle.into_released());
    }
}

/// A failed link. The stages were not deleted; the caller owns them.
#[derive(Debug)]
pub struct LinkFailure {
    pub error: EngineError,
    pub stages: Vec<Shader>,
}

impl LinkFailure {
    /// Releases the returned stages and yields the link error.
    pub fn release_stages(self, backend: &mut dyn RenderBackend) -> EngineError {
        for stage in self.stages {
            stage.release(backend);
        }
        self.error
    }
}

impl fmt::Display for LinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for LinkFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Collects compiled stages and links them into one program.
#[derive(Debug, Default)]
pub struct ProgramAssembler {
    stages: Vec<Shader>,
}

impl ProgramAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, shader: Shader) -> Self {
        self.stages.push(shader);
        self
    }

    pub fn add_stage(&mut self, shader: Shader) {
        self.stages.push(shader);
    }

    /// Compiles `source` and adds it. A compile failure adds nothing.
    pub fn compile_stage(
        &mut self,
        backend: &mut dyn RenderBackend,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        self.stages.push(Shader::compile(backend, stage, source)?);
        Ok(())
    }

    /// Compiles a stage file and adds it. A failure adds nothing.
    pub fn add_file(
        &mut self,
        backend: &mut dyn RenderBackend,
        registry: &StageRegistry,
        path: &std::path::Path,
    ) -> Result<()> {
        self.stages.push(Shader::from_file(backend, registry, path)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Links the collected stages.
    ///
    /// On success every stage is deleted and the program has been validated.
    /// On failure the program object is deleted and the stages are handed
    /// back in the `LinkFailure`. An empty assembler fails with
    /// `InvalidParameter` before anything is allocated.
    pub fn link(self, backend: &mut dyn RenderBackend) -> std::result::Result<ShaderProgram, LinkFailure> {
        let stages = self.stages;
        if stages.is_empty() {
            return Err(LinkFailure {
                error: EngineError::invalid("a program needs at least one compiled stage"),
                stages,
            });
        }

        let id = match backend.create_program() {
            Ok(id) => id,
            Err(error) => return Err(LinkFailure { error, stages }),
        };

        let linked = stages
            .iter()
            .try_for_each(|s| backend.attach_shader(id, s.raw()))
            .and_then(|()| backend.link_program(id));

        let error = match linked {
            Ok(Ok(())) => None,
            Ok(Err(log)) => Some(EngineError::Link { log }),
            Err(err) => Some(err),
        };
        if let Some(error) = error {
            backend.delete_program(id);
            log::debug!("program {id} failed to link: {error}");
            return Err(LinkFailure { error, stages });
        }

        let validation = match backend.validate_program(id) {
            Ok(Ok(())) => ProgramValidation::Passed,
            Ok(Err(warning)) => ProgramValidation::Warned(warning),
            Err(err) => ProgramValidation::Warned(err.to_string()),
        };
        if let ProgramValidation::Warned(warning) = &validation {
            log::warn!("program {id} validation: {warning}");
        }

        let stage_kinds = stages.iter().map(Shader::stage).collect();
        for stage in stages {
            stage.release(backend);
        }

        log::debug!("linked program {id}");
        Ok(ShaderProgram {
            handle: NativeHandle::new(id, "program", Lifecycle::Ready),
            stages: stage_kinds,
            validation,
        })
    }

    /// `link`, releasing the stages if it fails.
    pub fn link_or_release(self, backend: &mut dyn RenderBackend) -> Result<ShaderProgram> {
        self.link(backend).map_err(|failure| failure.release_stages(backend))
    }
}

impl Release for ProgramAssembler {
    fn release(self, backend: &mut dyn RenderBackend) {
        for stage in self.stages {
            stage.release(backend);
        }
    }
}
