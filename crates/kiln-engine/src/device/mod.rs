//! wgpu device and window surface.
//!
//! `Gpu` owns the device, the queue and the configured surface of one
//! desktop window. `WgpuBackend` is its only consumer: it acquires a
//! `GpuFrame` per `present()`, encodes one pass and submits it.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
