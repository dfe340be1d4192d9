//! Colour values handed to the backends (frame clear colour).

mod color;

pub use color::Color;
