use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by layer, shader and resource operations.
///
/// Geometry problems (out-of-range pixels, reversed rects) are never errors;
/// they are absorbed where they occur.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    /// The render target cannot be created on this device.
    #[error("render target `{name}` is incomplete: {reason}")]
    TargetIncomplete { name: String, reason: String },

    #[error("shader `{name}` failed to compile: {message}")]
    ShaderCompile { name: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid sprite data: {0}")]
    InvalidSprite(String),

    #[error("font load error: {0}")]
    FontLoad(String),

    #[error("recording stack overflow (max depth {max_depth})")]
    RecordingOverflow { max_depth: usize },

    #[error("{0} has no GPU texture")]
    NotUploaded(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
