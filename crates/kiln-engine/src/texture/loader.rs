use crate::backend::RenderBackend;
use crate::error::Result;
use crate::resource::{CacheKey, ResourceCache};

use super::{FileImageSource, ImageSource, Texture, TextureConfig};

/// Loads textures through an `ImageSource` and keeps one resident texture
/// per (path, config).
///
/// Owns its cache; call `clear` before the backend goes away.
pub struct TextureLoader<S: ImageSource = FileImageSource> {
    source: S,
    cache: ResourceCache<Texture, TextureConfig>,
}

impl<S: ImageSource> TextureLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: ResourceCache::new(),
        }
    }

    /// Returns the resident texture for (`path`, `config`), decoding and
    /// uploading it on first request. Failures leave the cache unchanged.
    pub fn load(
        &mut self,
        backend: &mut dyn RenderBackend,
        path: &str,
        config: TextureConfig,
    ) -> Result<&Texture> {
        let source = &self.source;
        self.cache
            .get_or_try_insert_with(CacheKey::new(path, config), backend, |backend| {
                let image = source.decode(path, config.channels())?;
                let texture = Texture::from_pixels(
                    backend,
                    image.width,
                    image.height,
                    config,
                    &image.pixels,
                )?;
                log::debug!(
                    "texture '{path}' loaded as {} ({}x{})",
                    texture.raw(),
                    image.width,
                    image.height
                );
                Ok(texture)
            })
    }

    /// `load` with `TextureConfig::DEFAULT`.
    pub fn load_default(&mut self, backend: &mut dyn RenderBackend, path: &str) -> Result<&Texture> {
        self.load(backend, path, TextureConfig::DEFAULT)
    }

    pub fn get(&self, path: &str, config: TextureConfig) -> Option<&Texture> {
        self.cache.get(&CacheKey::new(path, config))
    }

    pub fn contains(&self, path: &str, config: TextureConfig) -> bool {
        self.cache.contains(&CacheKey::new(path, config))
    }

    /// Releases the texture for (`path`, `config`) if resident.
    pub fn remove(
        &mut self,
        backend: &mut dyn RenderBackend,
        path: &str,
        config: TextureConfig,
    ) -> bool {
        self.cache.remove(&CacheKey::new(path, config), backend)
    }

    /// Releases every resident texture.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        self.cache.clear(backend);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessBackend, ObjectKind};
    use crate::texture::{DecodedImage, MemoryImageSource};
    use crate::EngineError;

    fn loader() -> TextureLoader<MemoryImageSource> {
        TextureLoader::new(
            MemoryImageSource::new()
                .with_image("player.png", DecodedImage::solid(4, 2, [9, 8, 7, 255]))
                .with_image("tiles.png", DecodedImage::solid(8, 8, [0, 0, 0, 255])),
        )
    }

    #[test]
    fn identical_requests_share_one_texture() {
        let mut b = HeadlessBackend::new();
        let mut textures = loader();

        let first = textures.load_default(&mut b, "player.png").unwrap().raw();
        let second = textures.load_default(&mut b, "player.png").unwrap().raw();

        assert_eq!(first, second);
        assert_eq!(textures.source().decode_count(), 1);
        assert_eq!(b.created_count(ObjectKind::Texture), 1);
        textures.clear(&mut b);
    }

    #[test]
    fn different_config_is_a_distinct_texture() {
        let mut b = HeadlessBackend::new();
        let mut textures = loader();

        let smooth = textures.load(&mut b, "player.png", TextureConfig::DEFAULT).unwrap().raw();
        let pixel = textures.load(&mut b, "player.png", TextureConfig::PIXEL_ART).unwrap().raw();

        assert_ne!(smooth, pixel);
        assert_eq!(textures.len(), 2);
        textures.clear(&mut b);
        assert_eq!(b.live_count(ObjectKind::Texture), 0);
    }

    #[test]
    fn rgb_config_uploads_three_channels() {
        let mut b = HeadlessBackend::new();
        let mut textures = loader();
        let tex = textures.load(&mut b, "player.png", TextureConfig::OPAQUE_RGB).unwrap();
        assert_eq!(b.texture_pixels(tex.raw()).map(<[u8]>::len), Some(4 * 2 * 3));
        textures.clear(&mut b);
    }

    #[test]
    fn failed_decode_leaves_cache_unchanged() {
        let mut b = HeadlessBackend::new();
        let mut textures = loader();
        textures.load_default(&mut b, "tiles.png").unwrap();

        let err = textures.load_default(&mut b, "missing.png").unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert_eq!(textures.len(), 1);
        assert!(!textures.contains("missing.png", TextureConfig::DEFAULT));
        assert_eq!(b.created_count(ObjectKind::Texture), 1);
        textures.clear(&mut b);
    }

    #[test]
    fn remove_then_reload_decodes_again() {
        let mut b = HeadlessBackend::new();
        let mut textures = loader();
        let raw = textures.load_default(&mut b, "tiles.png").unwrap().raw();

        assert!(textures.remove(&mut b, "tiles.png", TextureConfig::DEFAULT));
        assert_eq!(b.delete_calls(raw), 1);

        textures.load_default(&mut b, "tiles.png").unwrap();
        assert_eq!(textures.source().decode_count(), 2);
        textures.clear(&mut b);
    }
}
