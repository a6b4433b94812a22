//! Transfer characteristics: encoded values to linear light and back.
//!
//! Both directions clamp their input to [0, 1] first. Linear light is kept
//! normalized by the transfer's nominal peak, so an HDR signal fits the
//! same [0, 1] range as SDR and survives integer intermediate textures.

use crate::error::Result;
use crate::ir::{CmpOp, Expr, Stmt};
use crate::program::{ShaderProgram, Signature};
use lumina_core::ColorTransfer;
use lumina_transfer::{hlg, pq, prophoto, s_log, srgb, v_log};
use std::f32::consts::LN_10;
use tracing::trace;

/// `mix(lo, hi, <op>(vec3(edge), color.rgb))`
fn piecewise(lo: Expr, hi: Expr, op: CmpOp, edge: f32) -> Expr {
    Expr::mix(lo, hi, Expr::cmp(op, Expr::splat(edge), Expr::rgb()))
}

fn set(e: Expr) -> Stmt {
    Stmt::SetRgb(e)
}

fn rgb() -> Expr {
    Expr::rgb()
}

fn v(x: f64) -> Expr {
    Expr::splat(x as f32)
}

fn clamp01() -> Stmt {
    set(rgb().clamp(Expr::float(0.0), Expr::float(1.0)))
}

/// `pow(vec3(10.0), (color.rgb - c) / a)`
fn exp10(c: f64, a: f64) -> Expr {
    Expr::splat(10.0).pow((rgb() - v(c)) * v(1.0 / a))
}

/// Appends the decoding curve of `trc`, producing linear light divided by
/// the nominal peak.
///
/// A no-op for [`ColorTransfer::Linear`].
pub fn linearize(prog: &mut ShaderProgram, trc: ColorTransfer) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    if trc == ColorTransfer::Linear {
        return Ok(());
    }
    trace!(?trc, "linearize");

    prog.extend([Stmt::comment("linearize"), clamp01()]);
    let curve = match trc.resolve() {
        ColorTransfer::Linear => Vec::new(),
        ColorTransfer::Srgb => vec![set(piecewise(
            rgb() * Expr::splat(1.0 / 12.92),
            ((rgb() + Expr::splat(0.055)) / Expr::splat(1.055)).pow(Expr::splat(2.4)),
            CmpOp::Lt,
            srgb::ENCODED_BREAK,
        ))],
        ColorTransfer::Bt1886 => vec![set(rgb().pow(Expr::splat(2.4)))],
        ColorTransfer::Gamma18 => vec![set(rgb().pow(Expr::splat(1.8)))],
        ColorTransfer::Gamma22 | ColorTransfer::Unknown => vec![set(rgb().pow(Expr::splat(2.2)))],
        ColorTransfer::Gamma28 => vec![set(rgb().pow(Expr::splat(2.8)))],
        ColorTransfer::ProPhoto => vec![set(piecewise(
            rgb() * Expr::splat(1.0 / 16.0),
            rgb().pow(Expr::splat(1.8)),
            CmpOp::Lt,
            prophoto::ENCODED_BREAK,
        ))],
        ColorTransfer::Pq => vec![
            set(rgb().pow(v(1.0 / pq::M2))),
            set((rgb() - v(pq::C1)).max(Expr::splat(0.0)) / (v(pq::C2) - v(pq::C3) * rgb())),
            set(rgb().pow(v(1.0 / pq::M1))),
            set(rgb() * v(pq::PEAK)),
        ],
        ColorTransfer::Hlg => vec![set(piecewise(
            Expr::splat(4.0) * rgb() * rgb(),
            ((rgb() - v(hlg::C)) * v(1.0 / hlg::A)).exp() + v(hlg::B),
            CmpOp::Lt,
            0.5,
        ))],
        ColorTransfer::VLog => vec![set(piecewise(
            (rgb() - Expr::splat(0.125)) * Expr::splat(1.0 / 5.6),
            exp10(v_log::D, v_log::C) - v(v_log::B),
            CmpOp::Le,
            v_log::ENCODED_BREAK as f32,
        ))],
        ColorTransfer::SLog1 => vec![set(exp10(s_log::C, s_log::A) - v(s_log::B))],
        ColorTransfer::SLog2 => vec![set(piecewise(
            (rgb() - v(s_log::Q)) * v(1.0 / s_log::P),
            (exp10(s_log::C, s_log::A) - v(s_log::B)) * v(1.0 / s_log::K2),
            CmpOp::Le,
            s_log::Q as f32,
        ))],
    };
    prog.extend(curve);
    prog.push(set(rgb() * Expr::splat(1.0 / trc.nominal_peak())));
    Ok(())
}

/// Appends the encoding curve of `trc`; the inverse of [`linearize`].
pub fn delinearize(prog: &mut ShaderProgram, trc: ColorTransfer) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    if trc == ColorTransfer::Linear {
        return Ok(());
    }
    trace!(?trc, "delinearize");

    prog.extend([
        Stmt::comment("delinearize"),
        clamp01(),
        set(rgb() * Expr::splat(trc.nominal_peak())),
    ]);
    let curve = match trc.resolve() {
        ColorTransfer::Linear => Vec::new(),
        ColorTransfer::Srgb => vec![set(piecewise(
            rgb() * Expr::splat(12.92),
            Expr::splat(1.055) * rgb().pow(Expr::splat(1.0 / 2.4)) - Expr::splat(0.055),
            CmpOp::Le,
            srgb::LINEAR_BREAK,
        ))],
        ColorTransfer::Bt1886 => vec![set(rgb().pow(Expr::splat(1.0 / 2.4)))],
        ColorTransfer::Gamma18 => vec![set(rgb().pow(Expr::splat(1.0 / 1.8)))],
        ColorTransfer::Gamma22 | ColorTransfer::Unknown => vec![set(rgb().pow(Expr::splat(1.0 / 2.2)))],
        ColorTransfer::Gamma28 => vec![set(rgb().pow(Expr::splat(1.0 / 2.8)))],
        ColorTransfer::ProPhoto => vec![set(piecewise(
            rgb() * Expr::splat(16.0),
            rgb().pow(Expr::splat(1.0 / 1.8)),
            CmpOp::Le,
            prophoto::LINEAR_BREAK,
        ))],
        ColorTransfer::Pq => vec![
            set(rgb() * v(1.0 / pq::PEAK)),
            set(rgb().pow(v(pq::M1))),
            set((v(pq::C1) + v(pq::C2) * rgb()) / (Expr::splat(1.0) + v(pq::C3) * rgb())),
            set(rgb().pow(v(pq::M2))),
        ],
        ColorTransfer::Hlg => vec![set(piecewise(
            Expr::splat(0.5) * rgb().sqrt(),
            v(hlg::A) * (rgb() - v(hlg::B)).log() + v(hlg::C),
            CmpOp::Lt,
            1.0,
        ))],
        ColorTransfer::VLog => vec![set(piecewise(
            Expr::splat(5.6) * rgb() + Expr::splat(0.125),
            Expr::splat(v_log::C as f32 / LN_10) * (rgb() + v(v_log::B)).log() + v(v_log::D),
            CmpOp::Le,
            v_log::LINEAR_BREAK as f32,
        ))],
        ColorTransfer::SLog1 => vec![set(
            Expr::splat(s_log::A as f32 / LN_10) * (rgb() + v(s_log::B)).log() + v(s_log::C),
        )],
        ColorTransfer::SLog2 => vec![set(piecewise(
            v(s_log::P) * rgb() + v(s_log::Q),
            Expr::splat(s_log::A as f32 / LN_10) * (v(s_log::K2) * rgb() + v(s_log::B)).log() + v(s_log::C),
            CmpOp::Le,
            0.0,
        ))],
    };
    prog.extend(curve);
    Ok(())
}
