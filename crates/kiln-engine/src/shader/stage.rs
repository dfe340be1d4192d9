use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{EngineError, Result};

/// Programmable pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        Self::Vertex,
        Self::Fragment,
        Self::Geometry,
        Self::TessControl,
        Self::TessEvaluation,
        Self::Compute,
    ];

    /// Canonical file extension (without the dot).
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Fragment => "frag",
            Self::Geometry => "geom",
            Self::TessControl => "tesc",
            Self::TessEvaluation => "tese",
            Self::Compute => "comp",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::TessControl => "tessellation control",
            Self::TessEvaluation => "tessellation evaluation",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable file-extension → stage table.
///
/// Built once at startup and passed to whatever loads shader files.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    by_extension: HashMap<String, ShaderStage>,
}

impl StageRegistry {
    /// Canonical extensions of every stage (`vert`, `frag`, `geom`, ...).
    pub fn builtin() -> Self {
        ShaderStage::ALL
            .into_iter()
            .fold(Self::builder(), |b, stage| b.register(stage.extension(), stage))
            .build()
    }

    /// Starts an empty registry.
    pub fn builder() -> StageRegistryBuilder {
        StageRegistryBuilder {
            by_extension: HashMap::new(),
        }
    }

    pub fn stage_for_extension(&self, ext: &str) -> Option<ShaderStage> {
        self.by_extension.get(&normalize(ext)).copied()
    }

    /// Infers the stage from a file name.
    ///
    /// A trailing `.wgsl` is skipped, so both `sprite.vert` and
    /// `sprite.vert.wgsl` map to `Vertex`.
    pub fn stage_for_path(&self, path: &Path) -> Result<ShaderStage> {
        let mut name = Path::new(path.file_name().unwrap_or_default());
        if name
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("wgsl"))
        {
            name = Path::new(name.file_stem().unwrap_or_default());
        }

        name.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.stage_for_extension(e))
            .ok_or_else(|| {
                EngineError::invalid(format!(
                    "cannot infer shader stage from '{}'",
                    path.display()
                ))
            })
    }

    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

pub struct StageRegistryBuilder {
    by_extension: HashMap<String, ShaderStage>,
}

impl StageRegistryBuilder {
    /// Maps `ext` (leading dot optional, case-insensitive) to `stage`.
    /// Later registrations of the same extension win.
    pub fn register(mut self, ext: &str, stage: ShaderStage) -> Self {
        self.by_extension.insert(normalize(ext), stage);
        self
    }

    pub fn build(self) -> StageRegistry {
        StageRegistry {
            by_extension: self.by_extension,
        }
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_every_canonical_extension() {
        let reg = StageRegistry::builtin();
        assert_eq!(reg.len(), ShaderStage::ALL.len());
        for stage in ShaderStage::ALL {
            assert_eq!(reg.stage_for_extension(stage.extension()), Some(stage));
        }
    }

    #[test]
    fn stage_is_inferred_before_trailing_wgsl() {
        let reg = StageRegistry::builtin();
        assert_eq!(
            reg.stage_for_path(Path::new("shaders/sprite.vert.wgsl")).unwrap(),
            ShaderStage::Vertex
        );
        assert_eq!(
            reg.stage_for_path(Path::new("sprite.FRAG")).unwrap(),
            ShaderStage::Fragment
        );
    }

    #[test]
    fn unknown_or_missing_extension_is_invalid() {
        let reg = StageRegistry::builtin();
        for path in ["a.wgsl", "a.glsl", "noext", ""] {
            let err = reg.stage_for_path(Path::new(path)).unwrap_err();
            assert!(matches!(err, EngineError::InvalidParameter(_)), "{path}");
        }
    }

    #[test]
    fn custom_registry_only_knows_registered_extensions() {
        let reg = StageRegistry::builder()
            .register(".vs", ShaderStage::Vertex)
            .register("fs", ShaderStage::Fragment)
            .build();
        assert_eq!(reg.stage_for_path(Path::new("x.vs")).unwrap(), ShaderStage::Vertex);
        assert!(reg.stage_for_extension("vert").is_none());
    }

    #[test]
    fn stage_display_is_lowercase_name() {
        assert_eq!(ShaderStage::TessControl.to_string(), "tessellation control");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
