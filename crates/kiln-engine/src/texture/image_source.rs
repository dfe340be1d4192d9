use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{EngineError, Result};

/// Tightly packed 8-bit pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let image = Self {
            width,
            height,
            channels: 4,
            pixels,
        };
        if image.pixels.len() != image.expected_len() {
            return Err(EngineError::invalid(format!(
                "{width}x{height} RGBA image needs {} bytes, got {}",
                image.expected_len(),
                image.pixels.len()
            )));
        }
        Ok(image)
    }

    /// Single-colour RGBA image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            channels: 4,
            pixels: rgba.repeat(count),
        }
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Repacks to 3 (RGB, alpha dropped) or 4 (RGBA, opaque alpha) channels.
    pub fn to_channels(&self, channels: u32) -> Result<Self> {
        let pixels = match (self.channels, channels) {
            (from, to) if from == to => self.pixels.clone(),
            (4, 3) => self
                .pixels
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect(),
            (3, 4) => self
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            (from, to) => {
                return Err(EngineError::invalid(format!(
                    "cannot convert {from}-channel pixels to {to} channels"
                )));
            }
        };
        Ok(Self {
            width: self.width,
            height: self.height,
            channels,
            pixels,
        })
    }
}

/// Image decoding collaborator of `TextureLoader`.
pub trait ImageSource {
    /// Decodes the image at `path` into `channels` (3 or 4) per texel.
    ///
    /// A missing image is `NotFound`; an unreadable one is `Load`.
    fn decode(&self, path: &str, channels: u32) -> Result<DecodedImage>;
}

/// Decodes image files below a root folder with the `image` crate.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ImageSource for FileImageSource {
    fn decode(&self, path: &str, channels: u32) -> Result<DecodedImage> {
        let full = self.root.join(path);
        if !full.is_file() {
            return Err(EngineError::NotFound(full.display().to_string()));
        }

        let image = image::open(&full).map_err(|e| EngineError::load(path, e))?;
        let (width, height) = (image.width(), image.height());

        let pixels = match channels {
            4 => image.into_rgba8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            other => {
                return Err(EngineError::invalid(format!(
                    "unsupported channel count {other}"
                )));
            }
        };

        log::debug!("decoded '{path}' ({width}x{height}, {channels} channels)");

        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels,
        })
    }
}

/// In-memory images keyed by path. Counts decodes so callers can observe
/// cache behaviour.
#[derive(Debug, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, DecodedImage>,
    decodes: Cell<usize>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: impl Into<String>, image: DecodedImage) -> Self {
        self.insert(path, image);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, image: DecodedImage) {
        self.images.insert(path.into(), image);
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.get()
    }
}

impl ImageSource for MemoryImageSource {
    fn decode(&self, path: &str, channels: u32) -> Result<DecodedImage> {
        self.decodes.set(self.decodes.get() + 1);
        self.images
            .get(path)
            .ok_or_else(|| EngineError::NotFound(path.to_owned()))?
            .to_channels(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_conversion_drops_or_fills_alpha() {
        let rgba = DecodedImage::from_rgba(1, 1, vec![10, 20, 30, 40]).unwrap();
        let rgb = rgba.to_channels(3).unwrap();
        assert_eq!(rgb.pixels, [10, 20, 30]);
        assert_eq!(rgb.to_channels(4).unwrap().pixels, [10, 20, 30, 255]);
        assert!(rgba.to_channels(2).is_err());
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileImageSource::new(dir.path());
        let err = source.decode("nope.png", 4).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn undecodable_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"not a png").unwrap();
        let source = FileImageSource::new(dir.path());
        let err = source.decode("bad.png", 4).unwrap_err();
        assert!(matches!(err, EngineError::Load { .. }), "{err}");
    }

    #[test]
    fn png_files_decode_to_requested_channels() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
        img.save(dir.path().join("two.png")).unwrap();

        let source = FileImageSource::new(dir.path());
        let rgba = source.decode("two.png", 4).unwrap();
        assert_eq!((rgba.width, rgba.height), (2, 1));
        assert_eq!(rgba.pixels, [255, 0, 0, 255, 0, 0, 255, 128]);

        let rgb = source.decode("two.png", 3).unwrap();
        assert_eq!(rgb.pixels, [255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn memory_source_counts_decodes() {
        let source = MemoryImageSource::new().with_image("a", DecodedImage::solid(1, 1, [1, 2, 3, 4]));
        assert!(source.decode("a", 4).is_ok());
        assert!(source.decode("b", 4).is_err());
        assert_eq!(source.decode_count(), 2);
    }
}
