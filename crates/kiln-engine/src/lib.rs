//! Kiln engine crate.
//!
//! Fixed-timestep loop driver plus the GPU resource layer the loop's app
//! draws with: shader programs, textures and meshes owned through
//! `RenderBackend` ids and cached per (path, config).

pub mod backend;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;
pub mod mesh;
pub mod paint;
pub mod resource;
pub mod shader;
pub mod texture;
pub mod time;
pub mod window;

pub use error::{EngineError, Result};
