//! Optical-to-optical transfer functions (scene light to display light).
//!
//! Only scene-referred [`ColorLight`] modes have an OOTF; display light
//! passes through unchanged. Values are scaled by `peak` before the core
//! transform and back afterwards, so the curves see absolute-ish light
//! relative to reference white regardless of the encoding range.

use crate::bt2020;
use lumina_core::{ColorLight, REF_WHITE};

/// Reference display peak assumed by the HLG OOTF, in cd/m².
pub const HLG_DISPLAY_PEAK: f32 = 1000.0;

/// HLG system gamma for a 1000 cd/m² display.
pub const HLG_GAMMA: f32 = 1.2;

/// Gain of the HLG OOTF: maps nominal scene peak (12) onto the display peak.
#[inline]
pub fn hlg_gain() -> f32 {
    (HLG_DISPLAY_PEAK / REF_WHITE) / 12f32.powf(HLG_GAMMA)
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Scene light to display light.
///
/// `luma` holds the RGB to Y weights of the working primaries.
///
/// ```rust
/// use lumina_core::ColorLight;
/// use lumina_transfer::ootf;
///
/// let rgb = [0.25, 0.5, 0.75];
/// assert_eq!(ootf::apply(ColorLight::Display, 1.0, [0.0; 3], rgb), rgb);
/// ```
pub fn apply(light: ColorLight, peak: f32, luma: [f32; 3], rgb: [f32; 3]) -> [f32; 3] {
    let rgb = rgb.map(|c| c * peak);
    let out = match light.resolve() {
        ColorLight::Display | ColorLight::Unknown => return rgb.map(|c| c / peak),
        ColorLight::SceneHlg => {
            let gain = hlg_gain() * dot(luma, rgb).powf(HLG_GAMMA - 1.0);
            rgb.map(|c| c * gain)
        }
        ColorLight::Scene709_1886 => rgb.map(|c| bt2020::oetf(c).powf(2.4)),
        ColorLight::Scene1_2 => rgb.map(|c| c.powf(1.2)),
    };
    out.map(|c| c / peak)
}

/// Display light to scene light, the exact inverse of [`apply`].
pub fn invert(light: ColorLight, peak: f32, luma: [f32; 3], rgb: [f32; 3]) -> [f32; 3] {
    let rgb = rgb.map(|c| c * peak);
    let out = match light.resolve() {
        ColorLight::Display | ColorLight::Unknown => return rgb.map(|c| c / peak),
        ColorLight::SceneHlg => {
            let rgb = rgb.map(|c| c / hlg_gain());
            let y = dot(luma, rgb).powf((HLG_GAMMA - 1.0) / HLG_GAMMA).max(1e-6);
            rgb.map(|c| c / y)
        }
        ColorLight::Scene709_1886 => rgb.map(|c| bt2020::eotf(c.powf(1.0 / 2.4))),
        ColorLight::Scene1_2 => rgb.map(|c| c.powf(1.0 / 1.2)),
    };
    out.map(|c| c / peak)
}
