//! # lumina-primaries
//!
//! Chromaticities of RGB primaries and the matrices derived from them.
//!
//! [`RawPrimaries::of`] maps a [`ColorPrimaries`] tag to CIE xy
//! coordinates; [`rgb_to_xyz_matrix`] and [`xyz_to_rgb_matrix`] turn
//! those into conversion matrices, and [`color_mapping_matrix`] builds the
//! RGB-to-RGB gamut conversion used by the color mapping stage.
//!
//! ```rust
//! use lumina_core::ColorPrimaries;
//! use lumina_primaries::{luma_coeffs, RawPrimaries};
//!
//! let luma = luma_coeffs(&RawPrimaries::of(ColorPrimaries::Bt709));
//! assert!((luma.x - 0.2126).abs() < 1e-3);
//! assert!((luma.y - 0.7152).abs() < 1e-3);
//! ```

#![warn(missing_docs)]

mod intent;

pub use intent::*;

use lumina_core::ColorPrimaries;
use lumina_math::{Chromaticity, D50, D65, DCI_WHITE, ILLUMINANT_C, ILLUMINANT_E, Mat3, xy_to_xyz};

/// Red, green and blue primaries plus white point, as CIE xy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrimaries {
    /// Red primary
    pub red: Chromaticity,
    /// Green primary
    pub green: Chromaticity,
    /// Blue primary
    pub blue: Chromaticity,
    /// White point
    pub white: Chromaticity,
}

const fn raw(r: (f32, f32), g: (f32, f32), b: (f32, f32), white: Chromaticity) -> RawPrimaries {
    RawPrimaries {
        red: Chromaticity::new(r.0, r.1),
        green: Chromaticity::new(g.0, g.1),
        blue: Chromaticity::new(b.0, b.1),
        white,
    }
}

/// SMPTE 170M / BT.601 525-line.
pub const BT601_525: RawPrimaries = raw((0.630, 0.340), (0.310, 0.595), (0.155, 0.070), D65);
/// EBU 3213 / BT.601 625-line.
pub const BT601_625: RawPrimaries = raw((0.640, 0.330), (0.290, 0.600), (0.150, 0.060), D65);
/// BT.709 and sRGB.
pub const BT709: RawPrimaries = raw((0.640, 0.330), (0.300, 0.600), (0.150, 0.060), D65);
/// BT.470 System M (NTSC 1953).
pub const BT470M: RawPrimaries = raw((0.670, 0.330), (0.210, 0.710), (0.140, 0.080), ILLUMINANT_C);
/// BT.2020.
pub const BT2020: RawPrimaries = raw((0.708, 0.292), (0.170, 0.797), (0.131, 0.046), D65);
/// Apple RGB.
pub const APPLE: RawPrimaries = raw((0.625, 0.340), (0.280, 0.595), (0.115, 0.070), D65);
/// Adobe RGB (1998).
pub const ADOBE: RawPrimaries = raw((0.640, 0.330), (0.210, 0.710), (0.150, 0.060), D65);
/// ProPhoto RGB (ROMM).
pub const PRO_PHOTO: RawPrimaries = raw((0.7347, 0.2653), (0.1596, 0.8404), (0.0366, 0.0001), D50);
/// CIE 1931 RGB.
pub const CIE_1931: RawPrimaries =
    raw((0.7347, 0.2653), (0.2738, 0.7174), (0.1666, 0.0089), ILLUMINANT_E);
/// DCI-P3 with the DCI white point.
pub const DCI_P3: RawPrimaries = raw((0.680, 0.320), (0.265, 0.690), (0.150, 0.060), DCI_WHITE);
/// Panasonic V-Gamut.
pub const V_GAMUT: RawPrimaries = raw((0.730, 0.280), (0.165, 0.840), (0.100, -0.030), D65);
/// Sony S-Gamut.
pub const S_GAMUT: RawPrimaries = raw((0.730, 0.280), (0.140, 0.855), (0.100, -0.050), D65);

impl RawPrimaries {
    /// Chromaticities for a primaries tag. Unknown resolves to BT.709.
    pub const fn of(prim: ColorPrimaries) -> Self {
        match prim {
            ColorPrimaries::Unknown | ColorPrimaries::Bt709 => BT709,
            ColorPrimaries::Bt601_525 => BT601_525,
            ColorPrimaries::Bt601_625 => BT601_625,
            ColorPrimaries::Bt470M => BT470M,
            ColorPrimaries::Bt2020 => BT2020,
            ColorPrimaries::Apple => APPLE,
            ColorPrimaries::Adobe => ADOBE,
            ColorPrimaries::ProPhoto => PRO_PHOTO,
            ColorPrimaries::Cie1931 => CIE_1931,
            ColorPrimaries::DciP3 => DCI_P3,
            ColorPrimaries::VGamut => V_GAMUT,
            ColorPrimaries::SGamut => S_GAMUT,
        }
    }
}

impl From<ColorPrimaries> for RawPrimaries {
    fn from(prim: ColorPrimaries) -> Self {
        Self::of(prim)
    }
}

/// Linear RGB to XYZ, normalized so that RGB white maps to Y = 1.
///
/// Each primary's XYZ column is scaled so the three sum to the white point.
pub fn rgb_to_xyz_matrix(prim: &RawPrimaries) -> Mat3 {
    let r = xy_to_xyz(prim.red);
    let g = xy_to_xyz(prim.green);
    let b = xy_to_xyz(prim.blue);
    let w = xy_to_xyz(prim.white);

    let m = Mat3::from_col_vecs(r, g, b);
    let s = m.inverse().unwrap_or(Mat3::IDENTITY) * w;

    Mat3::from_col_vecs(r * s.x, g * s.y, b * s.z)
}

/// XYZ to linear RGB.
pub fn xyz_to_rgb_matrix(prim: &RawPrimaries) -> Mat3 {
    rgb_to_xyz_matrix(prim).inverse().unwrap_or(Mat3::IDENTITY)
}

/// RGB to luminance weights (the Y row of [`rgb_to_xyz_matrix`]).
pub fn luma_coeffs(prim: &RawPrimaries) -> lumina_math::Vec3 {
    rgb_to_xyz_matrix(prim).row(1)
}
