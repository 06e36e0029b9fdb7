/// Default chunk edge length in pixels.
pub const DEFAULT_CHUNK_SIZE: u32 = 270;

/// Default number of dirty chunks uploaded per layer per sync.
pub const DEFAULT_UPLOAD_CAP: usize = 512;

/// Default bound on nested GPU-layer recordings.
pub const DEFAULT_MAX_RECORDING_DEPTH: usize = 16;

/// Engine-wide configuration.
///
/// Construct with [`EngineConfig::default`] and adjust with the `with_*` builders.
/// Values are passed through [`EngineConfig::sanitized`] when the engine is created,
/// so a zero chunk size or cap never reaches the chunk store.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Seed mixed into every procedural palette color.
    pub seed: u32,

    /// Edge length of the square chunks CPU layers are tiled into.
    pub chunk_size: u32,

    /// Maximum number of dirty chunks uploaded per layer per sync.
    pub upload_cap: usize,

    /// Size in bytes of each of the two transfer buffers a CPU layer owns.
    ///
    /// Chunks whose staged size exceeds this are uploaded directly.
    pub transfer_capacity: u64,

    /// Maximum nesting depth of GPU-layer recordings.
    pub max_recording_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            upload_cap: DEFAULT_UPLOAD_CAP,
            transfer_capacity: staged_chunk_bytes(DEFAULT_CHUNK_SIZE),
            max_recording_depth: DEFAULT_MAX_RECORDING_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the chunk edge and resizes the transfer buffers to hold one full chunk.
    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self.transfer_capacity = staged_chunk_bytes(chunk_size.max(1));
        self
    }

    pub fn with_upload_cap(mut self, upload_cap: usize) -> Self {
        self.upload_cap = upload_cap;
        self
    }

    pub fn with_transfer_capacity(mut self, bytes: u64) -> Self {
        self.transfer_capacity = bytes;
        self
    }

    pub fn with_max_recording_depth(mut self, depth: usize) -> Self {
        self.max_recording_depth = depth;
        self
    }

    /// Replaces unusable values with defaults.
    ///
    /// A zero chunk size, upload cap or recording depth would stall the engine,
    /// so each is logged and reset.
    pub fn sanitized(mut self) -> Self {
        if self.chunk_size == 0 {
            log::warn!(
                "chunk_size 0 is invalid; using default {}",
                DEFAULT_CHUNK_SIZE
            );
            self.chunk_size = DEFAULT_CHUNK_SIZE;
            self.transfer_capacity = self.transfer_capacity.max(staged_chunk_bytes(DEFAULT_CHUNK_SIZE));
        }
        if self.upload_cap == 0 {
            log::warn!(
                "upload_cap 0 would never converge; using default {}",
                DEFAULT_UPLOAD_CAP
            );
            self.upload_cap = DEFAULT_UPLOAD_CAP;
        }
        if self.max_recording_depth == 0 {
            log::warn!(
                "max_recording_depth 0 forbids GPU recording; using default {}",
                DEFAULT_MAX_RECORDING_DEPTH
            );
            self.max_recording_depth = DEFAULT_MAX_RECORDING_DEPTH;
        }
        self
    }
}

/// Bytes per staged row of `width` RGBA pixels, padded to the GPU copy alignment.
#[inline]
pub fn padded_row_bytes(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Staged byte size of a full square chunk with edge `chunk_size`.
#[inline]
pub fn staged_chunk_bytes(chunk_size: u32) -> u64 {
    padded_row_bytes(chunk_size) as u64 * chunk_size as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transfer_capacity_holds_one_chunk() {
        let cfg = EngineConfig::default();
        // 270 * 4 = 1080 bytes, padded to 1280.
        assert_eq!(cfg.transfer_capacity, 1280 * 270);
        assert_eq!(cfg.chunk_size, 270);
    }

    #[test]
    fn padded_rows_respect_alignment() {
        assert_eq!(padded_row_bytes(1), 256);
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
    }

    #[test]
    fn sanitized_replaces_zero_values() {
        let cfg = EngineConfig::default()
            .with_chunk_size(0)
            .with_upload_cap(0)
            .with_max_recording_depth(0)
            .sanitized();
        assert_eq!(cfg.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(cfg.upload_cap, DEFAULT_UPLOAD_CAP);
        assert_eq!(cfg.max_recording_depth, DEFAULT_MAX_RECORDING_DEPTH);
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        let cfg = EngineConfig::default().with_chunk_size(64).with_upload_cap(3);
        assert_eq!(cfg.clone().sanitized(), cfg);
    }
}
