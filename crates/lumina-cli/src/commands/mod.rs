//! Command implementations.

pub mod eval;
pub mod glsl;

use crate::PipelineArgs;
use anyhow::{Context, Result};
use lumina_shaders::colorspace::{color_map, decode_color};
use lumina_shaders::{ShaderProgram, Signature};
use tracing::debug;

/// Builds the decode + color map program described by `args`.
pub fn build_program(args: &PipelineArgs) -> Result<ShaderProgram> {
    let params = args.params()?;
    let (src, dst) = (args.src(), args.dst());
    debug!(?src, ?dst, ?params, "building program");

    let mut prog = ShaderProgram::new(Signature::Color);
    if let Some(mut repr) = args.repr() {
        decode_color(&mut prog, &mut repr, &params.color_adjustment).context("decode failed")?;
    }
    color_map(&mut prog, &params.color_map, &src, &dst, false).context("color map failed")?;
    Ok(prog)
}
