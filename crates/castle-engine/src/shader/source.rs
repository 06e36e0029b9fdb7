use crate::error::{RenderError, RenderResult};

const PRELUDE: &str = include_str!("shaders/prelude.wgsl");

/// Prepends the shared post-process prelude to a fragment source.
///
/// The fragment sees `t_input`, `s_input`, the `fx` uniform block, the `FxIn`
/// varyings and `texel_size()`, and must define `fs_main`.
pub fn compose_source(fragment: &str) -> String {
    format!("{PRELUDE}\n{fragment}")
}

/// Parses and validates WGSL before it reaches the device.
///
/// wgpu reports invalid modules through its error callback; validating up
/// front turns a broken shader into a recoverable error.
pub fn validate_wgsl(name: &str, source: &str) -> RenderResult<()> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| RenderError::ShaderCompile {
        name: name.to_string(),
        message: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| RenderError::ShaderCompile {
        name: name.to_string(),
        message: e.emit_to_string(source),
    })?;

    let has_entry = module
        .entry_points
        .iter()
        .any(|ep| ep.name == "fs_main" && ep.stage == naga::ShaderStage::Fragment);
    if !has_entry {
        return Err(RenderError::ShaderCompile {
            name: name.to_string(),
            message: "missing fragment entry point `fs_main`".to_string(),
        });
    }

    Ok(())
}
