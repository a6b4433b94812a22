//! Representation decoding: stored samples to RGB.

use crate::error::Result;
use crate::ir::{Channel, CmpOp, ConstValue, Expr, Stmt};
use crate::program::{ShaderProgram, Signature};
use lumina_core::{AlphaMode, BitEncoding, ColorAdjustment, ColorLevels, ColorRepr, ColorSystem};
use lumina_math::{BRADFORD, ILLUMINANT_E, D65, Mat3, Transform3x3, Vec3, adapt_matrix};
use lumina_primaries::{BT709, xyz_to_rgb_matrix};
use lumina_transfer::bt2020;
use tracing::trace;

/// Input gamma of digital cinema XYZ.
pub const XYZ_GAMMA: f32 = 2.6;

/// Y'CbCr to R'G'B' for the given luma weights, chroma in [-0.5, 0.5].
fn luma_matrix(lr: f32, lg: f32, lb: f32) -> Mat3 {
    Mat3::from_rows([
        [1.0, 0.0, 2.0 * (1.0 - lr)],
        [1.0, -2.0 * (1.0 - lb) * lb / lg, -2.0 * (1.0 - lr) * lr / lg],
        [1.0, 2.0 * (1.0 - lb), 0.0],
    ])
}

fn system_matrix(sys: ColorSystem) -> Mat3 {
    match sys {
        ColorSystem::Bt601 => luma_matrix(0.299, 0.587, 0.114),
        ColorSystem::Bt709 => luma_matrix(0.2126, 0.7152, 0.0722),
        ColorSystem::Smpte240m => luma_matrix(0.2122, 0.7013, 0.0865),
        ColorSystem::Bt2020Nc => luma_matrix(0.2627, 0.6780, 0.0593),
        // Channel permutation; the constant luminance math runs in the shader
        ColorSystem::Bt2020C => Mat3::from_rows([[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
        ColorSystem::YCgCo => Mat3::from_rows([[1.0, -1.0, 1.0], [1.0, 1.0, 0.0], [1.0, -1.0, -1.0]]),
        // SMPTE 428 white is illuminant E; assume BT.709 display primaries
        ColorSystem::Xyz => xyz_to_rgb_matrix(&BT709) * adapt_matrix(BRADFORD, ILLUMINANT_E, D65),
        ColorSystem::Unknown | ColorSystem::Rgb => Mat3::IDENTITY,
    }
}

/// Computes the affine transform that decodes `repr` into full range RGB.
///
/// Levels are expressed in texture-normalized units so the transform
/// applies directly to sampled values, whatever the sample depth and bit
/// shift. Afterwards `repr` describes full range RGB at the original color
/// depth.
///
/// ```rust
/// use lumina_core::{ColorAdjustment, ColorLevels, ColorRepr, ColorSystem};
/// use lumina_math::Vec3;
/// use lumina_shaders::colorspace::decoding_transform;
///
/// let mut repr = ColorRepr::new(ColorSystem::Bt709, ColorLevels::Tv);
/// let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
/// let white = tr.apply(Vec3::new(235.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0));
/// assert!((white.x - 1.0).abs() < 1e-4);
/// assert_eq!(repr.sys, ColorSystem::Rgb);
/// ```
pub fn decoding_transform(repr: &mut ColorRepr, adj: &ColorAdjustment) -> Transform3x3 {
    let sys = repr.sys;
    let mut m = system_matrix(sys);

    // Hue rotates the [Cb, Cr] columns, saturation scales them
    if sys.is_ycbcr_like() {
        let huecos = adj.saturation * adj.hue.cos();
        let huesin = adj.saturation * adj.hue.sin();
        for row in m.m.iter_mut() {
            let (u, v) = (row[1], row[2]);
            row[1] = huecos * u - huesin * v;
            row[2] = huesin * u + huecos * v;
        }
    }

    let bits = repr.bits;
    let color_bits = bits.color_bits();
    let s = 2f64.powi(color_bits as i32 - 8) * 2f64.powi(bits.bit_shift as i32)
        / (2f64.powi(bits.sample_bits() as i32) - 1.0);

    let (ymin, ymax, cmax, cmid) = match (sys.is_ycbcr_like(), repr.effective_levels()) {
        (true, ColorLevels::Tv) => (16.0 * s, 235.0 * s, 240.0 * s, 128.0 * s),
        (true, _) => (0.0, 255.0 * s, 255.0 * s, 128.0 * s),
        // Non-YCbCr systems scale every column like luma
        (false, ColorLevels::Tv) => (16.0 * s, 235.0 * s, (16.0 + 219.0 / 2.0) * s, 16.0 * s),
        (false, _) => (0.0, 255.0 * s, 127.5 * s, 0.0),
    };

    let contrast = adj.contrast as f64;
    let ymul = contrast / (ymax - ymin);
    let cmul = contrast / (cmax - cmid) / 2.0;

    let mut c = Vec3::ZERO;
    for (i, row) in m.m.iter_mut().enumerate() {
        row[0] = (row[0] as f64 * ymul) as f32;
        row[1] = (row[1] as f64 * cmul) as f32;
        row[2] = (row[2] as f64 * cmul) as f32;
        c[i] = (-(row[0] as f64) * ymin - (row[1] as f64 + row[2] as f64) * cmid) as f32 + adj.brightness;
    }

    repr.sys = ColorSystem::Rgb;
    repr.levels = ColorLevels::Pc;
    repr.bits = BitEncoding::new(color_bits);
    Transform3x3::new(m, c)
}

/// Decodes the sampled value in `color` into RGB with premultiplied alpha.
///
/// `repr` is rewritten to describe the result: full range RGB, and
/// premultiplied alpha if the source carried alpha at all. Non-linear
/// systems (XYZ, constant luminance BT.2020) have premultiplied alpha
/// divided out before the matrix and re-applied afterwards.
pub fn decode_color(prog: &mut ShaderProgram, repr: &mut ColorRepr, adj: &ColorAdjustment) -> Result<()> {
    prog.require(Signature::Color, 0, 0)?;
    trace!(sys = ?repr.sys, levels = ?repr.levels, alpha = ?repr.alpha, "decode_color");
    prog.push(Stmt::comment("decode_color"));

    let alpha = || Expr::splat_expr(Expr::channel(Channel::A));

    if !repr.sys.is_linear() && repr.alpha == AlphaMode::Premultiplied {
        prog.push(Stmt::SetRgb(Expr::rgb() / alpha()));
        repr.alpha = AlphaMode::Independent;
    }

    if repr.sys == ColorSystem::Xyz {
        let scale = repr.normalize();
        prog.push(Stmt::SetRgb(
            (Expr::splat(scale) * Expr::rgb()).pow(Expr::splat(XYZ_GAMMA)),
        ));
    }

    let orig_sys = repr.sys;
    let tr = decoding_transform(repr, adj);
    let cmat = prog.bind("cmat", ConstValue::Mat3(tr.mat));
    let cmat_c = prog.bind("cmat_c", ConstValue::Vec3(tr.c.to_array()));
    prog.push(Stmt::SetRgb(Expr::var(&cmat) * Expr::rgb() + Expr::var(&cmat_c)));

    if orig_sys == ColorSystem::Bt2020C {
        constant_luminance(prog);
    }

    if repr.alpha == AlphaMode::Independent {
        prog.push(Stmt::SetRgb(Expr::rgb() * alpha()));
        repr.alpha = AlphaMode::Premultiplied;
    }

    Ok(())
}

/// Rebuilds R'G'B' from the permuted (C'rc, Y'c, C'bc) triple.
fn constant_luminance(prog: &mut ShaderProgram) {
    let [bn, bp, rn, rp] = bt2020::CL_DIVISORS;
    let chroma = |c: Channel, neg: f32, pos: f32| {
        let v = Expr::channel(c);
        let k = Expr::select(
            Expr::cmp(CmpOp::Le, v.clone(), Expr::float(0.0)),
            Expr::float(neg),
            Expr::float(pos),
        );
        Stmt::SetChannel(c, v * k + Expr::channel(Channel::G))
    };

    let decode = Expr::mix(
        Expr::rgb() * Expr::splat(1.0 / bt2020::ALPHA_SLOPE),
        ((Expr::rgb() + Expr::splat(bt2020::BETA)) * Expr::splat(1.0 / bt2020::ALPHA))
            .pow(Expr::splat(1.0 / bt2020::GAMMA)),
        Expr::cmp(CmpOp::Le, Expr::splat(bt2020::ENCODED_BREAK), Expr::rgb()),
    );

    let [lr, lg, lb] = bt2020::LUMA;
    let green = (Expr::channel(Channel::G)
        - Expr::float(lr) * Expr::channel(Channel::R)
        - Expr::float(lb) * Expr::channel(Channel::B))
        * Expr::float(1.0 / lg);

    let encode = Expr::mix(
        Expr::rgb() * Expr::splat(bt2020::ALPHA_SLOPE),
        Expr::splat(bt2020::ALPHA) * Expr::rgb().pow(Expr::splat(bt2020::GAMMA)) - Expr::splat(bt2020::BETA),
        Expr::cmp(CmpOp::Le, Expr::splat(bt2020::LINEAR_BREAK), Expr::rgb()),
    );

    prog.extend([
        Stmt::comment("constant luminance conversion"),
        chroma(Channel::B, bn, bp),
        chroma(Channel::R, rn, rp),
        Stmt::SetRgb(decode),
        Stmt::SetChannel(Channel::G, green),
        Stmt::SetRgb(encode),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn decode(repr: &mut ColorRepr, color: [f32; 4]) -> [f32; 4] {
        let mut prog = ShaderProgram::new(Signature::Color);
        decode_color(&mut prog, repr, &ColorAdjustment::NEUTRAL).unwrap();
        prog.eval(color).unwrap()
    }

    #[test]
    fn test_tv_range_black_white() {
        for sys in [ColorSystem::Bt601, ColorSystem::Bt709, ColorSystem::Bt2020Nc, ColorSystem::Smpte240m] {
            let mut repr = ColorRepr::new(sys, ColorLevels::Tv);
            let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
            let black = tr.apply(Vec3::new(16.0, 128.0, 128.0) / 255.0);
            let white = tr.apply(Vec3::new(235.0, 128.0, 128.0) / 255.0);
            for i in 0..3 {
                assert_abs_diff_eq!(black[i], 0.0, epsilon = 1e-5);
                assert_abs_diff_eq!(white[i], 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_bt709_red() {
        let mut repr = ColorRepr::new(ColorSystem::Bt709, ColorLevels::Pc);
        let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
        let cmid = 128.0 / 255.0;
        let cmul = 254.0 / 255.0;
        // BT.709 red: Y = 0.2126, Cb = -0.1146, Cr = 0.5
        let rgb = tr.apply(Vec3::new(0.2126, -0.114572 * cmul + cmid, 0.5 * cmul + cmid));
        assert_abs_diff_eq!(rgb.x, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ten_bit_shifted() {
        // 10 significant bits in the top of a 16-bit sample
        let mut repr = ColorRepr::new(ColorSystem::Bt709, ColorLevels::Tv);
        repr.bits = BitEncoding {
            sample_depth: 16,
            color_depth: 10,
            bit_shift: 6,
        };
        let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
        let sample = |code: f32| code * 64.0 / 65535.0;
        let white = tr.apply(Vec3::new(sample(940.0), sample(512.0), sample(512.0)));
        assert_abs_diff_eq!(white.x, 1.0, epsilon = 1e-4);
        assert_eq!(repr.bits, BitEncoding::new(10));
    }

    #[test]
    fn test_rgb_pc_is_identity() {
        let mut repr = ColorRepr::RGB;
        let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
        let v = Vec3::new(0.2, 0.5, 0.9);
        let out = tr.apply(v);
        for i in 0..3 {
            assert_abs_diff_eq!(out[i], v[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rgb_tv_expands_all_channels() {
        let mut repr = ColorRepr::new(ColorSystem::Rgb, ColorLevels::Tv);
        let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
        let black = tr.apply(Vec3::splat(16.0 / 255.0));
        let white = tr.apply(Vec3::splat(235.0 / 255.0));
        for i in 0..3 {
            assert_abs_diff_eq!(black[i], 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(white[i], 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_brightness_contrast() {
        let mut repr = ColorRepr::RGB;
        let adj = ColorAdjustment {
            brightness: 0.1,
            contrast: 2.0,
            ..ColorAdjustment::NEUTRAL
        };
        let tr = decoding_transform(&mut repr, &adj);
        let out = tr.apply(Vec3::splat(0.25));
        assert_abs_diff_eq!(out.x, 0.6, epsilon = 1e-5);
    }

    #[test]
    fn test_saturation_zero_removes_chroma() {
        let mut repr = ColorRepr::new(ColorSystem::Bt709, ColorLevels::Pc);
        let adj = ColorAdjustment {
            saturation: 0.0,
            ..ColorAdjustment::NEUTRAL
        };
        let tr = decoding_transform(&mut repr, &adj);
        let out = tr.apply(Vec3::new(0.4, 0.1, 0.9));
        assert_abs_diff_eq!(out.x, out.y, epsilon = 1e-5);
        assert_abs_diff_eq!(out.y, out.z, epsilon = 1e-5);
    }

    #[test]
    fn test_ycgco() {
        let mut repr = ColorRepr::new(ColorSystem::YCgCo, ColorLevels::Pc);
        let tr = decoding_transform(&mut repr, &ColorAdjustment::NEUTRAL);
        let mid = 128.0 / 255.0;
        let gray = tr.apply(Vec3::new(0.5, mid, mid));
        assert_abs_diff_eq!(gray.x, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(gray.y, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(gray.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_xyz_white() {
        // D65 white encoded as XYZ with the 2.6 gamma
        let white = lumina_math::xy_to_xyz(D65);
        let adapted = adapt_matrix(BRADFORD, D65, ILLUMINANT_E) * white;
        let enc = adapted.map(|v| (v / 1.1).powf(1.0 / XYZ_GAMMA));
        let mut repr = ColorRepr::new(ColorSystem::Xyz, ColorLevels::Pc);
        let out = decode(&mut repr, [enc.x, enc.y, enc.z, 1.0]);
        for c in &out[..3] {
            assert_abs_diff_eq!(*c, 1.0 / 1.1, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_bt709_premultiplied_stays_premultiplied() {
        let mid = 128.0 / 255.0;
        let mut repr = ColorRepr {
            alpha: AlphaMode::Premultiplied,
            ..ColorRepr::new(ColorSystem::Bt709, ColorLevels::Pc)
        };
        let out = decode(&mut repr, [0.4, mid, mid, 0.8]);
        assert_abs_diff_eq!(out[0], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(out[1], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(out[2], 0.4, epsilon = 1e-5);
        assert_eq!(out[3], 0.8);
        assert_eq!(repr.alpha, AlphaMode::Premultiplied);
    }

    #[test]
    fn test_independent_alpha_gets_premultiplied() {
        let mut repr = ColorRepr {
            alpha: AlphaMode::Independent,
            ..ColorRepr::new(ColorSystem::Bt709, ColorLevels::Pc)
        };
        let out = decode(&mut repr, [0.5, 0.5, 0.5, 0.8]);
        // (Y, Cb, Cr) = (0.5, 0.5, 0.5) is mid gray (the chroma sits
        // half a code below the midpoint), scaled by alpha
        for c in &out[..3] {
            assert_abs_diff_eq!(*c, 0.4, epsilon = 2e-3);
        }
        assert_eq!(repr.alpha, AlphaMode::Premultiplied);
    }

    #[test]
    fn test_constant_luminance_matches_reference() {
        for &(y, cb, cr) in &[(0.5, 0.1, -0.05), (0.3, -0.08, 0.12), (0.7, 0.02, 0.02)] {
            let cmid = 128.0 / 255.0;
            let cmul = 254.0 / 255.0;
            let mut repr = ColorRepr::new(ColorSystem::Bt2020C, ColorLevels::Pc);
            let out = decode(&mut repr, [y, cb * cmul + cmid, cr * cmul + cmid, 1.0]);
            let expected = bt2020::cl_to_rgb(y, cb, cr);
            for i in 0..3 {
                assert_abs_diff_eq!(out[i], expected[i], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_constant_luminance_round_trip() {
        let mid = 128.0 / 255.0;
        let cmul = 254.0 / 255.0;
        for &rgb in &[[0.6, 0.4, 0.3], [0.2, 0.5, 0.7], [0.45, 0.45, 0.45]] {
            let (y, cb, cr) = bt2020::rgb_to_cl(rgb);
            let mut repr = ColorRepr::new(ColorSystem::Bt2020C, ColorLevels::Pc);
            let out = decode(&mut repr, [y, cb * cmul + mid, cr * cmul + mid, 1.0]);
            let (_, cb2, cr2) = bt2020::rgb_to_cl([out[0], out[1], out[2]]);
            assert_abs_diff_eq!(cb2, cb, epsilon = 1e-4);
            assert_abs_diff_eq!(cr2, cr, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_constant_luminance_alpha() {
        let mid = 128.0 / 255.0;
        let mut repr = ColorRepr {
            alpha: AlphaMode::Independent,
            ..ColorRepr::new(ColorSystem::Bt2020C, ColorLevels::Pc)
        };
        let out = decode(&mut repr, [0.5, mid, mid, 0.5]);
        for c in &out[..3] {
            assert_abs_diff_eq!(*c, 0.25, epsilon = 1e-3);
        }
        assert_eq!(repr.alpha, AlphaMode::Premultiplied);
    }

    #[test]
    fn test_requires_color() {
        let mut prog = ShaderProgram::new(Signature::None);
        let mut repr = ColorRepr::BT709_TV;
        assert!(decode_color(&mut prog, &mut repr, &ColorAdjustment::NEUTRAL).is_err());
        assert!(prog.is_empty());
        assert_eq!(repr, ColorRepr::BT709_TV);
    }
}
