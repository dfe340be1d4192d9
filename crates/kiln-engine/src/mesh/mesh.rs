use crate::backend::{RawId, RenderBackend};
use crate::error::{EngineError, Result};
use crate::resource::{Lifecycle, NativeHandle, Release};

use super::quad::{uv_quad_vertices, QUAD_INDICES, QUAD_STRIDE, QUAD_VERTICES};

/// Smallest stride that holds position + uv.
const MIN_STRIDE: u32 = 4;

/// Largest stride, in floats, under the default 2048-byte vertex stride limit.
const MAX_STRIDE: u32 = 2048 / 4;

/// Indexed triangle list resident on the GPU.
#[derive(Debug)]
pub struct Mesh {
    handle: NativeHandle,
    vertex_count: u32,
    index_count: u32,
    stride: u32,
}

impl Mesh {
    /// Uploads `vertices` (`stride` floats per vertex) and `indices`.
    ///
    /// Malformed geometry is rejected before anything is allocated.
    pub fn new(
        backend: &mut dyn RenderBackend,
        vertices: &[f32],
        indices: &[u32],
        stride: u32,
    ) -> Result<Self> {
        let vertex_count = check_geometry(vertices, indices, stride)?;
        let id = backend.create_mesh(vertices, indices, stride)?;

        Ok(Self {
            handle: NativeHandle::new(id, "mesh", Lifecycle::Ready),
            vertex_count,
            index_count: indices.len() as u32,
            stride,
        })
    }

    /// Unit quad centred on the origin.
    pub fn quad(backend: &mut dyn RenderBackend) -> Result<Self> {
        Self::new(backend, &QUAD_VERTICES, &QUAD_INDICES, QUAD_STRIDE)
    }

    /// Unit quad at `0..1` showing the texture region `u0,v0 .. u1,v1`.
    pub fn uv_quad(
        backend: &mut dyn RenderBackend,
        u0: f32,
        v0: f32,
        u1: f32,
        v1: f32,
    ) -> Result<Self> {
        Self::new(
            backend,
            &uv_quad_vertices(u0, v0, u1, v1),
            &QUAD_INDICES,
            QUAD_STRIDE,
        )
    }

    /// Draws the mesh with the installed program and bound texture.
    pub fn render(&self, backend: &mut dyn RenderBackend) -> Result<()> {
        backend.draw_mesh(self.handle.id())
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Floats per vertex.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn raw(&self) -> RawId {
        self.handle.id()
    }
}

impl Release for Mesh {
    fn release(self, backend: &mut dyn RenderBackend) {
        backend.delete_mesh(self.handle.into_released());
    }
}

/// Validates geometry for the engine vertex layout. Returns the vertex count.
pub(crate) fn check_geometry(vertices: &[f32], indices: &[u32], stride: u32) -> Result<u32> {
    if stride < MIN_STRIDE {
        return Err(EngineError::invalid(format!(
            "mesh stride must be at least {MIN_STRIDE} floats (position + uv), got {stride}"
        )));
    }
    if stride > MAX_STRIDE {
        return Err(EngineError::invalid(format!(
            "mesh stride must be at most {MAX_STRIDE} floats, got {stride}"
        )));
    }

    let stride = stride as usize;
    if vertices.len() < stride * 2 {
        return Err(EngineError::invalid(format!(
            "mesh needs at least two vertices, got {} floats at stride {stride}",
            vertices.len()
        )));
    }
    if vertices.len() % stride != 0 {
        return Err(EngineError::invalid(format!(
            "mesh vertex data ({} floats) is not a multiple of stride {stride}",
            vertices.len()
        )));
    }
    if indices.is_empty() {
        return Err(EngineError::invalid("mesh has no indices"));
    }

    let vertex_count = u32::try_from(vertices.len() / stride)
        .map_err(|_| EngineError::invalid("mesh has too many vertices"))?;
    if let Some(bad) = indices.iter().find(|&&i| i >= vertex_count) {
        return Err(EngineError::invalid(format!(
            "mesh index {bad} out of range for {vertex_count} vertices"
        )));
    }

    Ok(vertex_count)
}
