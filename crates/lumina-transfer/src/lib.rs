//! # lumina-transfer
//!
//! Transfer functions for the lumina color pipeline.
//!
//! Each module implements one family of curves as plain scalar functions:
//!
//! | Module | Curves |
//! |--------|--------|
//! | [`srgb`] | IEC 61966-2-1 |
//! | [`gamma`] | pure powers: 1.8, 2.2, 2.8, BT.1886 (2.4) |
//! | [`prophoto`] | ROMM RGB |
//! | [`pq`] | SMPTE ST 2084 |
//! | [`hlg`] | ARIB STD-B67 |
//! | [`v_log`] | Panasonic V-Log |
//! | [`s_log`] | Sony S-Log1, S-Log2 |
//! | [`bt2020`] | BT.2020 OETF, constant luminance YCbCr |
//! | [`ootf`] | scene to display light |
//!
//! [`linearize`] and [`delinearize`] dispatch on [`ColorTransfer`] and use
//! the pipeline's normalized convention: encoded values are clamped to
//! [0, 1] and linear values are divided by the transfer's nominal peak,
//! so both domains fit in [0, 1]. The generated GPU programs compute the
//! same functions.
//!
//! ```rust
//! use lumina_core::ColorTransfer;
//! use lumina_transfer::{delinearize, linearize};
//!
//! let lin = linearize(ColorTransfer::Pq, 0.58);
//! assert!(lin > 0.0 && lin < 1.0);
//! assert!((delinearize(ColorTransfer::Pq, lin) - 0.58).abs() < 1e-5);
//! ```

#![warn(missing_docs)]

pub mod bt2020;
pub mod gamma;
pub mod hlg;
pub mod ootf;
pub mod pq;
pub mod prophoto;
pub mod s_log;
pub mod srgb;
pub mod v_log;

use lumina_core::ColorTransfer;

/// Encoded value to linear light normalized by the nominal peak.
///
/// Input is clamped to [0, 1]; `Linear` passes through untouched.
pub fn linearize(trc: ColorTransfer, v: f32) -> f32 {
    if trc == ColorTransfer::Linear {
        return v;
    }

    let v = v.clamp(0.0, 1.0);
    let l = match trc.resolve() {
        ColorTransfer::Linear => v,
        ColorTransfer::Srgb => srgb::eotf(v),
        ColorTransfer::Bt1886 => gamma::eotf(v, gamma::BT1886),
        ColorTransfer::Gamma18 => gamma::eotf(v, 1.8),
        ColorTransfer::Gamma22 | ColorTransfer::Unknown => gamma::eotf(v, 2.2),
        ColorTransfer::Gamma28 => gamma::eotf(v, 2.8),
        ColorTransfer::ProPhoto => prophoto::eotf(v),
        ColorTransfer::Pq => pq::eotf(v),
        ColorTransfer::Hlg => hlg::eotf(v),
        ColorTransfer::VLog => v_log::decode(v),
        ColorTransfer::SLog1 => s_log::decode1(v),
        ColorTransfer::SLog2 => s_log::decode2(v),
    };
    l / trc.nominal_peak()
}

/// Normalized linear light to encoded value; inverse of [`linearize`].
///
/// Input is clamped to [0, 1] before scaling by the nominal peak.
pub fn delinearize(trc: ColorTransfer, l: f32) -> f32 {
    if trc == ColorTransfer::Linear {
        return l;
    }

    let l = l.clamp(0.0, 1.0) * trc.nominal_peak();
    match trc.resolve() {
        ColorTransfer::Linear => l,
        ColorTransfer::Srgb => srgb::oetf(l),
        ColorTransfer::Bt1886 => gamma::oetf(l, gamma::BT1886),
        ColorTransfer::Gamma18 => gamma::oetf(l, 1.8),
        ColorTransfer::Gamma22 | ColorTransfer::Unknown => gamma::oetf(l, 2.2),
        ColorTransfer::Gamma28 => gamma::oetf(l, 2.8),
        ColorTransfer::ProPhoto => prophoto::oetf(l),
        ColorTransfer::Pq => pq::oetf(l),
        ColorTransfer::Hlg => hlg::oetf(l),
        ColorTransfer::VLog => v_log::encode(l),
        ColorTransfer::SLog1 => s_log::encode1(l),
        ColorTransfer::SLog2 => s_log::encode2(l),
    }
}

/// [`linearize`] applied to each channel.
#[inline]
pub fn linearize_rgb(trc: ColorTransfer, rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|v| linearize(trc, v))
}

/// [`delinearize`] applied to each channel.
#[inline]
pub fn delinearize_rgb(trc: ColorTransfer, rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|l| delinearize(trc, l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_transfers() {
        for trc in ColorTransfer::ALL {
            let lo = delinearize(trc, 0.0);
            for i in 0..=2000 {
                let v = lo + (1.0 - lo) * i as f32 / 2000.0;
                let back = delinearize(trc, linearize(trc, v));
                assert!((back - v).abs() < 1e-5, "{trc:?}: v={v}, back={back}");
            }
        }
    }

    #[test]
    fn test_encoded_white_is_nominal_peak() {
        for trc in ColorTransfer::ALL {
            if trc == ColorTransfer::Linear {
                continue;
            }
            let l = linearize(trc, 1.0);
            assert!((l - 1.0).abs() < 1e-3, "{trc:?}: {l}");
        }
    }

    #[test]
    fn test_linearize_clamps() {
        assert_eq!(linearize(ColorTransfer::Srgb, 1.5), linearize(ColorTransfer::Srgb, 1.0));
        assert_eq!(linearize(ColorTransfer::Srgb, -0.5), 0.0);
        assert_eq!(linearize(ColorTransfer::Linear, 1.5), 1.5);
    }

    #[test]
    fn test_unknown_is_gamma22() {
        for i in 0..=10 {
            let v = i as f32 / 10.0;
            assert_eq!(
                linearize(ColorTransfer::Unknown, v),
                linearize(ColorTransfer::Gamma22, v)
            );
        }
    }
}
