use std::path::PathBuf;

use crate::backend::RenderBackend;
use crate::error::Result;
use crate::resource::{CacheKey, Release, ResourceCache};

use super::{ProgramAssembler, ShaderProgram, StageRegistry};

/// Builds shader programs from stage files below a root folder.
///
/// Programs are cached by name and the ordered list of stage paths, so the
/// same name with a different stage list is a different program.
pub struct ProgramLoader {
    root: PathBuf,
    registry: StageRegistry,
    cache: ResourceCache<ShaderProgram, Vec<String>>,
}

impl ProgramLoader {
    pub fn new(root: impl Into<PathBuf>, registry: StageRegistry) -> Self {
        Self {
            root: root.into(),
            registry,
            cache: ResourceCache::new(),
        }
    }

    /// Returns the cached program, or compiles and links `stage_paths`
    /// (relative to the root). Failures are not cached and leave no native
    /// objects behind.
    pub fn load(
        &mut self,
        backend: &mut dyn RenderBackend,
        name: &str,
        stage_paths: &[&str],
    ) -> Result<&ShaderProgram> {
        let cache_key = key(name, stage_paths);
        let root = &self.root;
        let registry = &self.registry;

        self.cache.get_or_try_insert_with(cache_key, backend, |backend| {
            let mut assembler = ProgramAssembler::new();
            for path in stage_paths {
                if let Err(err) = assembler.add_file(backend, registry, &root.join(path)) {
                    assembler.release(backend);
                    return Err(err);
                }
            }
            let program = assembler.link_or_release(backend)?;
            log::info!("shader program '{name}' ready ({})", program.raw());
            Ok(program)
        })
    }

    pub fn get(&self, name: &str, stage_paths: &[&str]) -> Option<&ShaderProgram> {
        self.cache.get(&key(name, stage_paths))
    }

    pub fn remove(&mut self, backend: &mut dyn RenderBackend, name: &str, stage_paths: &[&str]) -> bool {
        self.cache.remove(&key(name, stage_paths), backend)
    }

    /// Releases every cached program.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        self.cache.clear(backend);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }
}

fn key(name: &str, stage_paths: &[&str]) -> CacheKey<Vec<String>> {
    CacheKey::new(name, stage_paths.iter().map(|p| p.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, ObjectKind};
    use crate::shader::wgsl::sources;
    use crate::EngineError;

    fn shader_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sprite.vert.wgsl"), sources::VERTEX).unwrap();
        std::fs::write(dir.path().join("sprite.frag.wgsl"), sources::FRAGMENT).unwrap();
        std::fs::write(dir.path().join("bad.frag.wgsl"), sources::FRAGMENT_BAD_VARYING).unwrap();
        dir
    }

    const SPRITE: [&str; 2] = ["sprite.vert.wgsl", "sprite.frag.wgsl"];

    #[test]
    fn program_is_built_once_per_key() {
        let dir = shader_dir();
        let mut b = HeadlessBackend::new();
        let mut programs = ProgramLoader::new(dir.path(), StageRegistry::builtin());

        let first = programs.load(&mut b, "sprite", &SPRITE).unwrap().raw();
        let second = programs.load(&mut b, "sprite", &SPRITE).unwrap().raw();
        assert_eq!(first, second);
        assert_eq!(b.created_count(ObjectKind::Program), 1);
        // Stages are gone after the link.
        assert_eq!(b.live_count(ObjectKind::Shader), 0);

        assert!(programs.get("sprite", &SPRITE).is_some());
        programs.clear(&mut b);
        assert_eq!(b.live_count(ObjectKind::Program), 0);
    }

    #[test]
    fn link_errors_are_not_cached_and_leave_nothing_live() {
        let dir = shader_dir();
        let mut b = HeadlessBackend::new();
        let mut programs = ProgramLoader::new(dir.path(), StageRegistry::builtin());

        let err = programs
            .load(&mut b, "bad", &["sprite.vert.wgsl", "bad.frag.wgsl"])
            .unwrap_err();
        assert!(matches!(err, EngineError::Link { .. }));
        assert!(programs.is_empty());
        assert_eq!(b.live_count(ObjectKind::Shader), 0);
        assert_eq!(b.live_count(ObjectKind::Program), 0);
    }

    #[test]
    fn missing_stage_file_releases_compiled_stages() {
        let dir = shader_dir();
        let mut b = HeadlessBackend::new();
        let mut programs = ProgramLoader::new(dir.path(), StageRegistry::builtin());

        let err = programs
            .load(&mut b, "sprite", &["sprite.vert.wgsl", "gone.frag.wgsl"])
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert_eq!(b.live_count(ObjectKind::Shader), 0);
    }

    #[test]
    fn remove_releases_the_program() {
        let dir = shader_dir();
        let mut b = HeadlessBackend::new();
        let mut programs = ProgramLoader::new(dir.path(), StageRegistry::builtin());
        let raw = programs.load(&mut b, "sprite", &SPRITE).unwrap().raw();

        assert!(programs.remove(&mut b, "sprite", &SPRITE));
        assert_eq!(b.delete_calls(raw), 1);
    }
}
