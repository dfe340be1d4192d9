//! CPU-side texel preparation for GPU upload.

/// Number of mip levels down to 1x1.
pub(crate) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Expands tightly packed RGB to RGBA with opaque alpha.
pub(crate) fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|p| [p[0], p[1], p[2], 255])
        .collect()
}

/// 2x2 box filter of an RGBA8 image. Odd edges repeat the last texel.
pub(crate) fn downsample_rgba(src: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let (w, h) = (width as usize, height as usize);
    let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
    let mut out = vec![0u8; nw * nh * 4];

    for y in 0..nh {
        for x in 0..nw {
            let (x0, y0) = (x * 2, y * 2);
            let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
            for c in 0..4 {
                let sum: u32 = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
                    .iter()
                    .map(|&(sx, sy)| u32::from(src[(sy * w + sx) * 4 + c]))
                    .sum();
                out[(y * nw + x) * 4 + c] = ((sum + 2) / 4) as u8;
            }
        }
    }

    (out, nw as u32, nh as u32)
}
