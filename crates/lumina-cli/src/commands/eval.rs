//! `lumina eval`: run a pixel through the program on the CPU.

use crate::EvalArgs;
use anyhow::{Context, Result};

pub fn run(args: EvalArgs, verbose: u8) -> Result<()> {
    let prog = super::build_program(&args.pipeline)?;

    let mut pixel = [0.0, 0.0, 0.0, 1.0];
    for (dst, v) in pixel.iter_mut().zip(&args.pixel) {
        *dst = *v;
    }

    if verbose > 0 {
        println!(
            "program: {} statements, {} constants",
            prog.body().len(),
            prog.vars().len()
        );
    }

    let out = prog.eval(pixel).context("evaluation failed")?;
    println!("{:.6} {:.6} {:.6} {:.6}", out[0], out[1], out[2], out[3]);
    Ok(())
}
