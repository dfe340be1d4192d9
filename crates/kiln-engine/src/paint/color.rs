/// Straight-alpha linear RGBA colour.
///
/// Conversions to GPU clear values premultiply, matching the premultiplied
/// blend the backends draw with.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes 8-bit sRGB channels (as written in colour pickers) to linear.
    /// Alpha is linear already.
    pub fn from_srgb8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            srgb_to_linear(r),
            srgb_to_linear(g),
            srgb_to_linear(b),
            f32::from(a) / 255.0,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channels clamped to `0..=1`, rgb multiplied by alpha.
    pub fn premultiplied(self) -> Self {
        let a = self.a.clamp(0.0, 1.0);
        Self::rgba(
            self.r.clamp(0.0, 1.0) * a,
            self.g.clamp(0.0, 1.0) * a,
            self.b.clamp(0.0, 1.0) * a,
            a,
        )
    }

    /// Premultiplied clear value for a render pass.
    pub fn to_wgpu(self) -> wgpu::Color {
        let c = self.premultiplied();
        wgpu::Color {
            r: f64::from(c.r),
            g: f64::from(c.g),
            b: f64::from(c.b),
            a: f64::from(c.a),
        }
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_extremes_map_exactly() {
        assert_eq!(Color::from_srgb8(0, 0, 0, 255), Color::BLACK);
        assert_eq!(Color::from_srgb8(255, 255, 255, 255), Color::WHITE);
    }

    #[test]
    fn srgb_midtone_is_darker_in_linear() {
        let c = Color::from_srgb8(128, 128, 128, 255);
        assert!((c.r - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn clear_value_is_premultiplied() {
        let clear = Color::rgb(1.0, 0.5, 0.0).with_alpha(0.5).to_wgpu();
        assert_eq!((clear.r, clear.g, clear.b, clear.a), (0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(Color::rgba(2.0, -1.0, 0.5, 3.0).premultiplied(), Color::rgb(1.0, 0.0, 0.5));
    }
}
