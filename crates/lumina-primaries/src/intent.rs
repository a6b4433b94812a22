//! Rendering intents and gamut mapping matrices.

use crate::{RawPrimaries, rgb_to_xyz_matrix, xyz_to_rgb_matrix};
use lumina_math::{BRADFORD, Mat3, adapt_matrix};

/// How colors are mapped between gamuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RenderingIntent {
    /// Treated as relative colorimetric.
    Perceptual,
    /// Colorimetric with white point adaptation.
    #[default]
    RelativeColorimetric,
    /// Primaries map onto primaries (identity matrix).
    Saturation,
    /// Colorimetric without white point adaptation.
    AbsoluteColorimetric,
}

/// Linear RGB (src) to linear RGB (dst) gamut conversion.
///
/// Computes `RGBd <- XYZd <- XYZs <- RGBs`. The middle step is a Bradford
/// adaptation between the two white points, skipped for
/// [`RenderingIntent::AbsoluteColorimetric`] and when the whites already
/// match.
///
/// ```rust
/// use lumina_primaries::{color_mapping_matrix, RenderingIntent, BT2020, BT709};
///
/// let m = color_mapping_matrix(&BT2020, &BT709, RenderingIntent::RelativeColorimetric);
/// // pure BT.2020 red is far outside BT.709
/// assert!(m.m[0][0] > 1.6);
/// ```
pub fn color_mapping_matrix(src: &RawPrimaries, dst: &RawPrimaries, intent: RenderingIntent) -> Mat3 {
    if intent == RenderingIntent::Saturation {
        return Mat3::IDENTITY;
    }

    let mut xyz2rgb_d = xyz_to_rgb_matrix(dst);
    let same_white = (src.white.x - dst.white.x).abs() < 1e-6 && (src.white.y - dst.white.y).abs() < 1e-6;
    if intent != RenderingIntent::AbsoluteColorimetric && !same_white {
        xyz2rgb_d = xyz2rgb_d * adapt_matrix(BRADFORD, src.white, dst.white);
    }

    xyz2rgb_d * rgb_to_xyz_matrix(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BT709, BT2020, DCI_P3};
    use approx::assert_abs_diff_eq;
    use lumina_math::Vec3;

    #[test]
    fn test_saturation_is_identity() {
        assert_eq!(color_mapping_matrix(&BT2020, &BT709, RenderingIntent::Saturation), Mat3::IDENTITY);
    }

    #[test]
    fn test_same_primaries_identity() {
        let m = color_mapping_matrix(&BT709, &BT709, RenderingIntent::RelativeColorimetric);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(m.m[i][j], expected, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_relative_preserves_white() {
        let m = color_mapping_matrix(&DCI_P3, &BT709, RenderingIntent::RelativeColorimetric);
        let white = m * Vec3::ONE;
        assert_abs_diff_eq!(white.x, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(white.y, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(white.z, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_absolute_keeps_white_tint() {
        let m = color_mapping_matrix(&DCI_P3, &BT709, RenderingIntent::AbsoluteColorimetric);
        let white = m * Vec3::ONE;
        assert!((white.x - white.z).abs() > 0.01);
    }

    #[test]
    fn test_perceptual_matches_relative() {
        let a = color_mapping_matrix(&BT2020, &BT709, RenderingIntent::Perceptual);
        let b = color_mapping_matrix(&BT2020, &BT709, RenderingIntent::RelativeColorimetric);
        assert_eq!(a, b);
    }
}
