//! BT.2020 camera transfer function and constant luminance YCbCr.
//!
//! The OETF is the BT.709 curve with the 12-bit precision constants from
//! BT.2020. It is used by the 709/1886 OOTF and by the constant luminance
//! (CL) decoder, which has to leave the gamma domain to compute green.

/// Linear slope near black.
pub const ALPHA_SLOPE: f32 = 4.5;
/// Power segment scale.
pub const ALPHA: f32 = 1.0993;
/// Power segment offset.
pub const BETA: f32 = 0.0993;
/// Power segment exponent.
pub const GAMMA: f32 = 0.45;
/// Linear breakpoint.
pub const LINEAR_BREAK: f32 = 0.0181;
/// Encoded breakpoint.
pub const ENCODED_BREAK: f32 = 0.08145;

/// Luma weights of the BT.2020 primaries.
pub const LUMA: [f32; 3] = [0.2627, 0.6780, 0.0593];

/// Chroma divisors from BT.2020 table 4: (Cb <= 0, Cb > 0, Cr <= 0, Cr > 0).
pub const CL_DIVISORS: [f32; 4] = [1.9404, 1.5816, 1.7184, 0.9936];

/// Linear to encoded.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l >= LINEAR_BREAK {
        ALPHA * l.powf(GAMMA) - BETA
    } else {
        l * ALPHA_SLOPE
    }
}

/// Encoded to linear.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v >= ENCODED_BREAK {
        ((v + BETA) / ALPHA).powf(1.0 / GAMMA)
    } else {
        v / ALPHA_SLOPE
    }
}

/// Reconstructs non-constant-luminance R'G'B' from Y'c, C'bc, C'rc.
///
/// Chroma is centered on zero. The result is the gamma-encoded RGB tuple
/// the CL encoding approximates.
///
/// ```rust
/// use lumina_transfer::bt2020;
///
/// // gray has no chroma and round trips to equal channels
/// let rgb = bt2020::cl_to_rgb(0.5, 0.0, 0.0);
/// assert!((rgb[0] - 0.5).abs() < 1e-5);
/// assert!((rgb[1] - 0.5).abs() < 1e-5);
/// ```
pub fn cl_to_rgb(y: f32, cb: f32, cr: f32) -> [f32; 3] {
    let b = cb * if cb <= 0.0 { CL_DIVISORS[0] } else { CL_DIVISORS[1] } + y;
    let r = cr * if cr <= 0.0 { CL_DIVISORS[2] } else { CL_DIVISORS[3] } + y;

    let (r_lin, y_lin, b_lin) = (eotf(r), eotf(y), eotf(b));
    let g_lin = (y_lin - LUMA[0] * r_lin - LUMA[2] * b_lin) / LUMA[1];

    [oetf(r_lin), oetf(g_lin), oetf(b_lin)]
}

/// Encodes R'G'B' as constant luminance Y'c, C'bc, C'rc.
///
/// Inverse of [`cl_to_rgb`].
pub fn rgb_to_cl(rgb: [f32; 3]) -> (f32, f32, f32) {
    let lin = rgb.map(eotf);
    let y_lin = LUMA[0] * lin[0] + LUMA[1] * lin[1] + LUMA[2] * lin[2];
    let y = oetf(y_lin);

    let db = rgb[2] - y;
    let dr = rgb[0] - y;
    let cb = db / if db <= 0.0 { CL_DIVISORS[0] } else { CL_DIVISORS[1] };
    let cr = dr / if dr <= 0.0 { CL_DIVISORS[2] } else { CL_DIVISORS[3] };
    (y, cb, cr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let v = i as f32 / 100.0;
            assert!((oetf(eotf(v)) - v).abs() < 1e-5, "v={v}");
        }
    }

    #[test]
    fn test_cl_roundtrip() {
        for &(y, cb, cr) in &[
            (0.5, 0.1, -0.05),
            (0.3, -0.08, 0.12),
            (0.7, 0.02, 0.02),
            (0.9, -0.1, -0.1),
        ] {
            let (y2, cb2, cr2) = rgb_to_cl(cl_to_rgb(y, cb, cr));
            assert!((y - y2).abs() < 1e-4, "y {y} -> {y2}");
            assert!((cb - cb2).abs() < 1e-4, "cb {cb} -> {cb2}");
            assert!((cr - cr2).abs() < 1e-4, "cr {cr} -> {cr2}");
        }
    }
}
