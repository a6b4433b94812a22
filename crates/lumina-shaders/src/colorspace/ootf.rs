//! Scene light to display light.

use crate::error::Result;
use crate::ir::{CmpOp, Expr, Ident, Stmt};
use crate::program::{ShaderProgram, Signature};
use lumina_core::ColorLight;
use lumina_transfer::bt2020;
use lumina_transfer::ootf::{HLG_GAMMA, hlg_gain};
use tracing::trace;

/// Appends the OOTF of `light`.
///
/// `peak` is the nominal peak of the signal; values are scaled by it
/// around the curve. `luma` names a bound `vec3` with the RGB to Y weights
/// of the working primaries. Display light is a no-op.
pub fn ootf(prog: &mut ShaderProgram, light: ColorLight, peak: f32, luma: &Ident) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    if !light.is_scene_referred() {
        return Ok(());
    }
    trace!(?light, peak, "ootf");

    let rgb = Expr::rgb;
    prog.extend([Stmt::comment("ootf"), Stmt::SetRgb(rgb() * Expr::splat(peak))]);
    match light {
        ColorLight::SceneHlg => {
            let y = Expr::var(luma).dot(rgb()).pow(Expr::float(HLG_GAMMA - 1.0));
            prog.push(Stmt::SetRgb(
                rgb() * Expr::splat_expr(Expr::float(hlg_gain()) * y),
            ));
        }
        ColorLight::Scene709_1886 => prog.extend([
            Stmt::SetRgb(Expr::mix(
                rgb() * Expr::splat(bt2020::ALPHA_SLOPE),
                Expr::splat(bt2020::ALPHA) * rgb().pow(Expr::splat(bt2020::GAMMA)) - Expr::splat(bt2020::BETA),
                Expr::cmp(CmpOp::Lt, Expr::splat(bt2020::LINEAR_BREAK), rgb()),
            )),
            Stmt::SetRgb(rgb().pow(Expr::splat(2.4))),
        ]),
        ColorLight::Scene1_2 => prog.push(Stmt::SetRgb(rgb().pow(Expr::splat(1.2)))),
        ColorLight::Display | ColorLight::Unknown => {}
    }
    prog.push(Stmt::SetRgb(rgb() * Expr::splat(1.0 / peak)));
    Ok(())
}

/// Appends the exact inverse of [`ootf`].
pub fn inverse_ootf(prog: &mut ShaderProgram, light: ColorLight, peak: f32, luma: &Ident) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    if !light.is_scene_referred() {
        return Ok(());
    }
    trace!(?light, peak, "inverse_ootf");

    let rgb = Expr::rgb;
    prog.extend([Stmt::comment("inverse_ootf"), Stmt::SetRgb(rgb() * Expr::splat(peak))]);
    match light {
        ColorLight::SceneHlg => {
            let y = Expr::var(luma)
                .dot(rgb())
                .pow(Expr::float((HLG_GAMMA - 1.0) / HLG_GAMMA));
            prog.extend([
                Stmt::SetRgb(rgb() * Expr::splat(1.0 / hlg_gain())),
                Stmt::SetRgb(rgb() / Expr::splat_expr(Expr::float(1e-6).max(y))),
            ]);
        }
        ColorLight::Scene709_1886 => prog.extend([
            Stmt::SetRgb(rgb().pow(Expr::splat(1.0 / 2.4))),
            Stmt::SetRgb(Expr::mix(
                rgb() * Expr::splat(1.0 / bt2020::ALPHA_SLOPE),
                ((rgb() + Expr::splat(bt2020::BETA)) * Expr::splat(1.0 / bt2020::ALPHA))
                    .pow(Expr::splat(1.0 / bt2020::GAMMA)),
                Expr::cmp(CmpOp::Lt, Expr::splat(bt2020::ENCODED_BREAK), rgb()),
            )),
        ]),
        ColorLight::Scene1_2 => prog.push(Stmt::SetRgb(rgb().pow(Expr::splat(1.0 / 1.2)))),
        ColorLight::Display | ColorLight::Unknown => {}
    }
    prog.push(Stmt::SetRgb(rgb() * Expr::splat(1.0 / peak)));
    Ok(())
}
