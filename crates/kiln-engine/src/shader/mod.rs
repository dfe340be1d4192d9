//! Shader stages and programs.
//!
//! A `Shader` is a compiled stage; a failed compile never yields one. The
//! `ProgramAssembler` links compiled stages into a `ShaderProgram` and
//! releases the stages once the link succeeds. On link failure the stages
//! come back to the caller inside `LinkFailure`.
//!
//! `ProgramLoader` builds programs from stage files (stage inferred from the
//! file extension through a `StageRegistry`) and caches them by name and
//! stage paths.

mod loader;
mod program;
mod shader;
mod stage;
pub mod wgsl;

pub use loader::ProgramLoader;
pub use program::{LinkFailure, ProgramAssembler, ProgramValidation, ShaderProgram};
pub use shader::Shader;
pub use stage::{ShaderStage, StageRegistry, StageRegistryBuilder};
