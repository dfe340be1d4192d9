//! Textures: sampling config, GPU wrapper, image decoding and the
//! path + config keyed loader.

mod config;
mod image_source;
mod loader;
mod texture;

pub use config::{Filter, PixelFormat, TextureConfig, Wrap};
pub use image_source::{DecodedImage, FileImageSource, ImageSource, MemoryImageSource};
pub use loader::TextureLoader;
pub use texture::Texture;
