//! GPU resource ownership.
//!
//! Every wrapper (`Shader`, `ShaderProgram`, `Texture`, `Mesh`) owns exactly
//! one native object through a `NativeHandle` and gives it back with
//! `Release::release(self, backend)`. Release consumes the wrapper, so a
//! second delete or a use after delete does not compile. Dropping a wrapper
//! without releasing it leaks the native object and logs a warning.
//!
//! `ResourceCache` deduplicates expensive creation by (path, config) key.

mod cache;
mod handle;

pub use cache::{CacheKey, ResourceCache};
pub use handle::{Lifecycle, Release};
pub(crate) use handle::NativeHandle;
