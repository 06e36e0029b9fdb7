//! CPU chunk store.
//!
//! A CPU layer keeps its pixels in fixed-size chunks so that per-frame
//! uploads only touch the regions that changed.

mod grid;

pub use grid::{Chunk, ChunkGrid, Region};
