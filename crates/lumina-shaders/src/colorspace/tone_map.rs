//! Tone mapping: compressing signals brighter than the target can encode.
//!
//! Every curve works on `sig = max(r, g, b)` and scales all three channels
//! by the same ratio afterwards, so only brightness changes and hue is
//! kept. Each curve maps `sig_peak` to exactly 1.0, except CLIP which is
//! plain clipping by the following clamp.

use super::ColorMapParams;
use crate::error::Result;
use crate::ir::{CmpOp, Expr, Ident, Stmt};
use crate::program::{ShaderProgram, Signature};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Tone mapping curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Scale by the parameter (default 1.0) and let the result clip.
    Clip,
    /// Identity below the knee (parameter, default 0.3), a rational curve
    /// reaching 1.0 at the peak above it. C1-continuous at the knee.
    #[default]
    Mobius,
    /// `x / (x + k)` rescaled to hit 1.0 at the peak. The parameter is the
    /// contrast (default 0.5).
    Reinhard,
    /// John Hable's filmic curve, normalized by its value at the peak.
    Hable,
    /// Power curve with a linear toe; the parameter is the gamma
    /// (default 1.8).
    Gamma,
    /// Uniform scale by `param / peak` (default 1.0).
    Linear,
}

const HABLE: [f32; 6] = [0.15, 0.50, 0.10, 0.20, 0.02, 0.30];
const GAMMA_CUTOFF: f32 = 0.05;

fn hable(x: f32) -> f32 {
    let [a, b, c, d, e, f] = HABLE;
    (x * (a * x + c * b) + d * e) / (x * (a * x + b) + d * f) - e / f
}

/// Mobius coefficients `(a, b, scale)` for knee `j` and `peak`.
fn mobius(j: f32, peak: f32) -> (f32, f32, f32) {
    let a = -j * j * (peak - 1.0) / (j * j - 2.0 * j + peak);
    let b = (j * j - 2.0 * j * peak + peak) / (peak - 1.0).max(1e-6);
    let scale = (b * b + 2.0 * b * j + j * j) / (b - a);
    (a, b, scale)
}

impl ToneMapping {
    /// Every curve.
    pub const ALL: [Self; 6] = [
        Self::Clip,
        Self::Mobius,
        Self::Reinhard,
        Self::Hable,
        Self::Gamma,
        Self::Linear,
    ];

    /// Parameter used when none is configured.
    pub fn default_param(self) -> f32 {
        match self {
            Self::Clip | Self::Linear => 1.0,
            Self::Mobius => 0.3,
            Self::Reinhard => 0.5,
            Self::Gamma => 1.8,
            Self::Hable => 0.0,
        }
    }

    /// Evaluates the curve on the CPU.
    ///
    /// ```rust
    /// use lumina_shaders::colorspace::ToneMapping;
    ///
    /// let peak = 4.0;
    /// let tm = ToneMapping::Reinhard;
    /// assert!((tm.map(tm.default_param(), peak, peak) - 1.0).abs() < 1e-6);
    /// ```
    pub fn map(self, param: f32, peak: f32, sig: f32) -> f32 {
        match self {
            Self::Clip => param * sig,
            Self::Mobius => {
                let j = param;
                if sig > j {
                    let (a, b, scale) = mobius(j, peak);
                    scale * (sig + a) / (sig + b)
                } else {
                    sig
                }
            }
            Self::Reinhard => {
                let offset = (1.0 - param) / param;
                sig / (sig + offset) * (peak + offset) / peak
            }
            Self::Hable => hable(sig) / hable(peak),
            Self::Gamma => {
                let gamma = 1.0 / param;
                if sig > GAMMA_CUTOFF {
                    (sig / peak).powf(gamma)
                } else {
                    (GAMMA_CUTOFF / peak).powf(gamma) / GAMMA_CUTOFF * sig
                }
            }
            Self::Linear => param / peak * sig,
        }
    }
}

/// Appends tone mapping from `ref_peak` down to 1.0.
///
/// `luma` names the destination RGB to Y weights used for desaturation.
pub fn tone_map(prog: &mut ShaderProgram, ref_peak: f32, luma: &Ident, params: &ColorMapParams) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    let algo = params.tone_mapping;
    let param = params.tone_param();
    trace!(?algo, param, ref_peak, "tone_map");

    let sig = || Expr::local("sig");
    let mut body = Vec::new();

    if params.tone_mapping_desaturate > 0.0 {
        let luma_l = || Expr::local("luma");
        body.extend([
            Stmt::let_float("luma", Expr::var(luma).dot(Expr::rgb())),
            Stmt::let_float(
                "overbright",
                (luma_l() - Expr::float(params.tone_mapping_desaturate)).max(Expr::float(1e-6))
                    / luma_l().max(Expr::float(1e-6)),
            ),
            Stmt::SetRgb(Expr::mix(
                Expr::rgb(),
                Expr::splat_expr(luma_l()),
                Expr::local("overbright"),
            )),
        ]);
    }

    body.extend([
        Stmt::let_float("sig", Expr::max_rgb()),
        Stmt::let_float("sig_orig", sig()),
        Stmt::let_const("sig_peak", Expr::float(ref_peak)),
    ]);
    let peak = || Expr::local("sig_peak");

    match algo {
        ToneMapping::Clip => body.push(Stmt::assign("sig", Expr::float(param) * sig())),
        ToneMapping::Mobius => {
            let j = || Expr::local("j");
            let (a, b) = (|| Expr::local("a"), || Expr::local("b"));
            body.extend([
                Stmt::let_const("j", Expr::float(param)),
                Stmt::let_float(
                    "a",
                    -(j() * j()) * (peak() - Expr::float(1.0))
                        / (j() * j() - Expr::float(2.0) * j() + peak()),
                ),
                Stmt::let_float(
                    "b",
                    (j() * j() - Expr::float(2.0) * j() * peak() + peak())
                        / Expr::float(1e-6).max(peak() - Expr::float(1.0)),
                ),
                Stmt::let_float(
                    "scale",
                    (b() * b() + Expr::float(2.0) * b() * j() + j() * j()) / (b() - a()),
                ),
                Stmt::assign(
                    "sig",
                    Expr::select(
                        Expr::cmp(CmpOp::Gt, sig(), j()),
                        Expr::local("scale") * (sig() + a()) / (sig() + b()),
                        sig(),
                    ),
                ),
            ]);
        }
        ToneMapping::Reinhard => {
            let offset = (1.0 - param) / param;
            body.extend([
                Stmt::assign("sig", sig() / (sig() + Expr::float(offset))),
                Stmt::let_float("scale", (peak() + Expr::float(offset)) / peak()),
                Stmt::assign("sig", sig() * Expr::local("scale")),
            ]);
        }
        ToneMapping::Hable => {
            let [a, b, c, d, e, f] = HABLE;
            let x = || Expr::Param;
            let f_hable = prog.define(
                "hable",
                (x() * (Expr::float(a) * x() + Expr::float(c * b)) + Expr::float(d * e))
                    / (x() * (Expr::float(a) * x() + Expr::float(b)) + Expr::float(d * f))
                    - Expr::float(e / f),
            );
            body.push(Stmt::assign(
                "sig",
                Expr::call(&f_hable, sig()) / Expr::call(&f_hable, peak()),
            ));
        }
        ToneMapping::Gamma => {
            let gamma = || Expr::local("gamma");
            let cutoff = || Expr::local("cutoff");
            body.extend([
                Stmt::let_const("cutoff", Expr::float(GAMMA_CUTOFF)),
                Stmt::let_const("gamma", Expr::float(1.0 / param)),
                Stmt::let_float("scale", (cutoff() / peak()).pow(gamma()) / cutoff()),
                Stmt::assign(
                    "sig",
                    Expr::select(
                        Expr::cmp(CmpOp::Gt, sig(), cutoff()),
                        (sig() / peak()).pow(gamma()),
                        Expr::local("scale") * sig(),
                    ),
                ),
            ]);
        }
        ToneMapping::Linear => body.push(Stmt::assign("sig", Expr::float(param) / peak() * sig())),
    }

    body.push(Stmt::SetRgb(
        Expr::rgb() * Expr::splat_expr(sig() / Expr::local("sig_orig")),
    ));

    prog.push(Stmt::comment("tone_map"));
    prog.push(Stmt::Block(body));
    Ok(())
}
