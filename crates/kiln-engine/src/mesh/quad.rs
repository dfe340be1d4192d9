/// Floats per quad vertex: x, y, u, v.
pub(crate) const QUAD_STRIDE: u32 = 4;

pub(crate) const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Unit quad centred on the origin, uv covering the whole texture.
#[rustfmt::skip]
pub(crate) const QUAD_VERTICES: [f32; 16] = [
    // pos         // uv
    -0.5, -0.5,    0.0, 0.0,
     0.5, -0.5,    1.0, 0.0,
     0.5,  0.5,    1.0, 1.0,
    -0.5,  0.5,    0.0, 1.0,
];

/// Unit quad spanning `0..1` with uv `u0,v0 .. u1,v1`.
#[rustfmt::skip]
pub(crate) fn uv_quad_vertices(u0: f32, v0: f32, u1: f32, v1: f32) -> [f32; 16] {
    [
        0.0, 0.0,    u0, v0,
        1.0, 0.0,    u1, v0,
        1.0, 1.0,    u1, v1,
        0.0, 1.0,    u0, v1,
    ]
}
