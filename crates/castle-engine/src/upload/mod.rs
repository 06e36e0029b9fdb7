//! Dirty-region uploader.
//!
//! Moves changed chunks from a CPU layer's store into its texture. The scan
//! and bookkeeping are backend-agnostic (`sync_chunks` over a `TextureSink`);
//! `GpuTextureSink` drives wgpu, `MemoryTexture` keeps pixels on the CPU.

mod gpu;
mod memory;
mod sync;

pub use gpu::{GpuTextureSink, TransferRing};
pub use memory::MemoryTexture;
pub use sync::{sync_chunks, TextureSink, UploadReport};
