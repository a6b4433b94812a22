//! `lumina glsl`: print the generated program.

use crate::GlslArgs;
use anyhow::Result;
use lumina_shaders::GlslVersion;

pub fn run(args: GlslArgs) -> Result<()> {
    let prog = super::build_program(&args.pipeline)?;
    let version = if args.gles {
        GlslVersion::es(args.glsl_version)
    } else {
        GlslVersion::desktop(args.glsl_version)
    };
    print!("{}", prog.glsl(version));
    Ok(())
}
