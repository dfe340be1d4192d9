//! Indexed triangle meshes in the engine vertex layout.
//!
//! Each vertex starts with `x, y` (position, `@location(0)`) followed by
//! `u, v` (texture coordinate, `@location(1)`); any further floats up to
//! `stride` are carried but not read by the pipeline.

mod mesh;
mod quad;

pub use mesh::Mesh;
pub(crate) use mesh::check_geometry;
