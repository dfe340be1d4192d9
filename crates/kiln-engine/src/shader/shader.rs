use std::path::Path;

use crate::backend::{RawId, RenderBackend};
use crate::error::{EngineError, Result};
use crate::resource::{Lifecycle, NativeHandle, Release};

use super::{ShaderStage, StageRegistry};

/// A successfully compiled shader stage.
#[derive(Debug)]
pub struct Shader {
    handle: NativeHandle,
    stage: ShaderStage,
}

impl Shader {
    /// Creates, sources and compiles a stage.
    ///
    /// On failure the native shader is deleted and the compiler diagnostic is
    /// returned as `EngineError::Compile`.
    pub fn compile(backend: &mut dyn RenderBackend, stage: ShaderStage, source: &str) -> Result<Self> {
        let id = backend.create_shader(stage)?;

        let outcome = backend
            .shader_source(id, source)
            .and_then(|()| backend.compile_shader(id));

        match outcome {
            Ok(Ok(())) => {
                log::debug!("compiled {stage} shader {id}");
                Ok(Self {
                    handle: NativeHandle::new(id, "shader", Lifecycle::Ready),
                    stage,
                })
            }
            Ok(Err(log)) => {
                backend.delete_shader(id);
                Err(EngineError::Compile { stage, log })
            }
            Err(err) => {
                backend.delete_shader(id);
                Err(err)
            }
        }
    }

    /// Reads and compiles a stage file; the stage comes from its extension.
    pub fn from_file(
        backend: &mut dyn RenderBackend,
        registry: &StageRegistry,
        path: &Path,
    ) -> Result<Self> {
        let stage = registry.stage_for_path(path)?;
        let source = read_source(path)?;
        Self::compile(backend, stage, &source).map_err(|err| match err {
            EngineError::Compile { stage, log } => EngineError::Compile {
                stage,
                log: format!("{}:\n{log}", path.display()),
            },
            other => other,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn raw(&self) -> RawId {
        self.handle.id()
    }
}

impl Release for Shader {
    fn release(self, backend: &mut dyn RenderBackend) {
        backend.delete_shader(self.handle.into_released());
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => EngineError::NotFound(path.display().to_string()),
        _ => EngineError::Io(err),
    })
}
