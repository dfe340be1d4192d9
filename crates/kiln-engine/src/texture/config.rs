/// Texture coordinate wrapping outside `0..1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Wrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Texel layout of uploaded pixel data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Rgba8,
    Rgb8,
}

impl PixelFormat {
    pub const fn channels(self) -> u32 {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// Sampling and storage parameters of a texture.
///
/// Part of the texture cache key: two equal configs share one resident
/// texture for the same path. When `mipmaps` is set the mip chain is
/// generated on upload and `min_filter` also selects between mip levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureConfig {
    pub mipmaps: bool,
    /// Alpha-blend when drawn; opaque textures overwrite the target.
    pub blend: bool,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub format: PixelFormat,
}

impl TextureConfig {
    /// Clamped, bilinear, blended RGBA.
    pub const DEFAULT: Self = Self {
        mipmaps: false,
        blend: true,
        wrap_s: Wrap::ClampToEdge,
        wrap_t: Wrap::ClampToEdge,
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        format: PixelFormat::Rgba8,
    };

    /// Nearest sampling, no smoothing between texels.
    pub const PIXEL_ART: Self = Self {
        min_filter: Filter::Nearest,
        mag_filter: Filter::Nearest,
        ..Self::DEFAULT
    };

    pub const OPAQUE_PIXEL_ART: Self = Self {
        blend: false,
        ..Self::PIXEL_ART
    };

    pub const OPAQUE: Self = Self {
        blend: false,
        ..Self::DEFAULT
    };

    pub const TILED_REPEAT: Self = Self {
        wrap_s: Wrap::Repeat,
        wrap_t: Wrap::Repeat,
        ..Self::DEFAULT
    };

    /// Repeating, trilinear.
    pub const MIPMAPPED: Self = Self {
        mipmaps: true,
        ..Self::TILED_REPEAT
    };

    /// Three-channel opaque texture (expanded to RGBA on the GPU side).
    pub const OPAQUE_RGB: Self = Self {
        blend: false,
        format: PixelFormat::Rgb8,
        ..Self::DEFAULT
    };

    #[inline]
    pub const fn channels(&self) -> u32 {
        self.format.channels()
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.min_filter = filter;
        self.mag_filter = filter;
        self
    }

    pub fn with_mipmaps(mut self, mipmaps: bool) -> Self {
        self.mipmaps = mipmaps;
        self
    }

    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
