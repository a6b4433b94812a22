//! Color mapping between two color spaces.

use super::{ColorMapParams, delinearize, inverse_ootf, linearize, ootf, tone_map};
use crate::error::Result;
use crate::ir::{CmpOp, ConstValue, Expr, Stmt};
use crate::program::{ShaderProgram, Signature};
use lumina_core::{ColorPrimaries, ColorSpace, ColorTransfer};
use lumina_primaries::{RawPrimaries, color_mapping_matrix, luma_coeffs};
use tracing::debug;

/// Fills in the unknown parts of a destination space.
///
/// Untagged primaries and transfer follow the source, except that wide
/// gamut sources map to BT.709 and HDR or linear sources to gamma 2.2.
///
/// ```rust
/// use lumina_core::{ColorPrimaries, ColorSpace, ColorTransfer};
/// use lumina_shaders::colorspace::resolve_destination;
///
/// let dst = resolve_destination(&ColorSpace::BT2020_PQ, &ColorSpace::UNKNOWN);
/// assert_eq!(dst.primaries, ColorPrimaries::Bt709);
/// assert_eq!(dst.transfer, ColorTransfer::Gamma22);
/// ```
pub fn resolve_destination(src: &ColorSpace, dst: &ColorSpace) -> ColorSpace {
    let mut out = *dst;
    if out.primaries == ColorPrimaries::Unknown {
        out.primaries = if src.primaries.is_wide_gamut() {
            ColorPrimaries::Bt709
        } else {
            src.primaries
        };
    }
    if out.transfer == ColorTransfer::Unknown {
        out.transfer = if src.transfer.is_hdr() || src.transfer == ColorTransfer::Linear {
            ColorTransfer::Gamma22
        } else {
            src.transfer
        };
    }
    out
}

/// Maps the working value from `src` into `dst`.
///
/// Only the steps the two spaces actually require are emitted, in this
/// order: linearize, OOTF, range rescale, gamut matrix, tone mapping,
/// inverse OOTF, delinearize. Identical spaces produce no code at all.
///
/// `prelinearized` means the value is already linear light in `src`; the
/// result is delinearized into `dst` regardless.
pub fn color_map(
    prog: &mut ShaderProgram,
    params: &ColorMapParams,
    src: &ColorSpace,
    dst: &ColorSpace,
    prelinearized: bool,
) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    let dst = resolve_destination(src, dst);

    let src_range = src.nominal_peak();
    let dst_range = dst.nominal_peak();
    let sig_peak = src.signal_peak();
    let mut ref_peak = sig_peak / dst_range;

    let src_prim = src.primaries.resolve();
    let dst_prim = dst.primaries.resolve();
    let light_differs = src.light.resolve() != dst.light.resolve();
    let need_linear = src.transfer.resolve() != dst.transfer.resolve()
        || src_prim != dst_prim
        || src_range != dst_range
        || sig_peak > dst_range
        || light_differs;

    debug!(
        src = ?src.transfer,
        dst = ?dst.transfer,
        src_prim = ?src_prim,
        dst_prim = ?dst_prim,
        need_linear,
        "color_map"
    );

    if !need_linear && !prelinearized && !params.gamut_warning {
        return Ok(());
    }
    prog.push(Stmt::comment("color_map"));

    let mut is_linear = prelinearized;
    if need_linear {
        let src_raw = RawPrimaries::of(src_prim);
        let dst_raw = RawPrimaries::of(dst_prim);
        let src_luma = prog.bind("src_luma", ConstValue::Vec3(luma_coeffs(&src_raw).to_array()));
        let dst_luma = prog.bind("dst_luma", ConstValue::Vec3(luma_coeffs(&dst_raw).to_array()));

        if !is_linear {
            linearize(prog, src.transfer)?;
            is_linear = true;
        }

        if light_differs {
            ootf(prog, src.light, src_range, &src_luma)?;
        }

        if src_range != dst_range {
            prog.extend([
                Stmt::comment("rescale value range"),
                Stmt::SetRgb(Expr::rgb() * Expr::splat(src_range / dst_range)),
            ]);
        }

        if src_prim != dst_prim {
            let m = color_mapping_matrix(&src_raw, &dst_raw, params.intent);
            let cms = prog.bind("cms_matrix", ConstValue::Mat3(m));
            prog.push(Stmt::SetRgb(Expr::var(&cms) * Expr::rgb()));
            // Reducing the gamut can push channels past 1.0
            for gain in m.diag().to_array() {
                ref_peak = ref_peak.max(gain);
            }
        }

        if ref_peak > 1.0 {
            tone_map(prog, ref_peak, &dst_luma, params)?;
        }

        if light_differs {
            inverse_ootf(prog, dst.light, dst_range, &dst_luma)?;
        }
    }

    if params.gamut_warning {
        let over = Expr::cmp(CmpOp::Gt, Expr::rgb(), Expr::splat(1.01)).any();
        let under = Expr::cmp(CmpOp::Lt, Expr::rgb(), Expr::splat(-0.01)).any();
        prog.push(Stmt::If {
            cond: over.or(under),
            then: vec![Stmt::SetRgb(Expr::splat(1.0) - Expr::rgb())],
        });
    }

    if is_linear {
        delinearize(prog, dst.transfer)?;
    }
    Ok(())
}
