//! Color space description: primaries, transfer, light and peak.
//!
//! A [`ColorSpace`] tags decoded RGB values with everything needed to move
//! them into another space. Fields may be left unknown; the color mapping
//! stage resolves them from the other side of the conversion.
//!
//! # Units
//!
//! All linear light values are relative to reference white ([`REF_WHITE`],
//! 100 cd/m²). A linear value of `1.0` is reference white; HDR transfers
//! encode values above `1.0` up to their [nominal peak](ColorTransfer::nominal_peak).
//!
//! # Usage
//!
//! ```rust
//! use lumina_core::{ColorSpace, ColorTransfer};
//!
//! let hdr = ColorSpace::BT2020_PQ;
//! assert!(hdr.transfer.is_hdr());
//! assert_eq!(hdr.signal_peak(), ColorTransfer::Pq.nominal_peak());
//! ```

/// Reference white in cd/m².
pub const REF_WHITE: f32 = 100.0;

/// Set of RGB primaries (the gamut).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorPrimaries {
    /// Not tagged.
    #[default]
    Unknown,
    /// ITU-R BT.601 525-line (SMPTE 170M).
    Bt601_525,
    /// ITU-R BT.601 625-line (EBU 3213).
    Bt601_625,
    /// ITU-R BT.709, also sRGB.
    Bt709,
    /// ITU-R BT.470 System M.
    Bt470M,
    /// ITU-R BT.2020 (UHDTV).
    Bt2020,
    /// Apple RGB.
    Apple,
    /// Adobe RGB (1998).
    Adobe,
    /// ProPhoto RGB (ROMM), D50 white.
    ProPhoto,
    /// CIE 1931 RGB.
    Cie1931,
    /// DCI-P3 with the DCI white point.
    DciP3,
    /// Panasonic V-Gamut.
    VGamut,
    /// Sony S-Gamut.
    SGamut,
}

impl ColorPrimaries {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Unknown,
        Self::Bt601_525,
        Self::Bt601_625,
        Self::Bt709,
        Self::Bt470M,
        Self::Bt2020,
        Self::Apple,
        Self::Adobe,
        Self::ProPhoto,
        Self::Cie1931,
        Self::DciP3,
        Self::VGamut,
        Self::SGamut,
    ];

    /// Whether the gamut is substantially wider than BT.709.
    ///
    /// Wide gamut sources are not assumed to be displayable as-is: an
    /// untagged destination defaults to BT.709 for them.
    #[inline]
    pub fn is_wide_gamut(self) -> bool {
        matches!(
            self,
            Self::Bt2020 | Self::ProPhoto | Self::Cie1931 | Self::DciP3 | Self::VGamut | Self::SGamut
        )
    }

    /// Substitutes BT.709 for [`ColorPrimaries::Unknown`].
    #[inline]
    pub fn resolve(self) -> Self {
        match self {
            Self::Unknown => Self::Bt709,
            p => p,
        }
    }
}

/// Transfer characteristic (the encoding curve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorTransfer {
    /// Not tagged; decoded as gamma 2.2.
    #[default]
    Unknown,
    /// ITU-R BT.1886, approximated as pure gamma 2.4.
    Bt1886,
    /// IEC 61966-2-1 sRGB.
    Srgb,
    /// Already linear.
    Linear,
    /// Pure power 1.8.
    Gamma18,
    /// Pure power 2.2.
    Gamma22,
    /// Pure power 2.8.
    Gamma28,
    /// ProPhoto RGB (ROMM).
    ProPhoto,
    /// SMPTE ST 2084 perceptual quantizer.
    Pq,
    /// ARIB STD-B67 hybrid log-gamma.
    Hlg,
    /// Panasonic V-Log.
    VLog,
    /// Sony S-Log1.
    SLog1,
    /// Sony S-Log2.
    SLog2,
}

impl ColorTransfer {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::Unknown,
        Self::Bt1886,
        Self::Srgb,
        Self::Linear,
        Self::Gamma18,
        Self::Gamma22,
        Self::Gamma28,
        Self::ProPhoto,
        Self::Pq,
        Self::Hlg,
        Self::VLog,
        Self::SLog1,
        Self::SLog2,
    ];

    /// Largest linear value this transfer can encode, relative to [`REF_WHITE`].
    ///
    /// ```rust
    /// use lumina_core::ColorTransfer;
    ///
    /// assert_eq!(ColorTransfer::Srgb.nominal_peak(), 1.0);
    /// assert_eq!(ColorTransfer::Pq.nominal_peak(), 100.0);
    /// ```
    #[inline]
    pub fn nominal_peak(self) -> f32 {
        match self {
            Self::Pq => 10000.0 / REF_WHITE,
            Self::Hlg => 12.0,
            Self::VLog => 46.0855,
            Self::SLog1 => 6.52,
            Self::SLog2 => 9.212,
            _ => 1.0,
        }
    }

    /// Whether the transfer encodes values above reference white.
    #[inline]
    pub fn is_hdr(self) -> bool {
        self.nominal_peak() > 1.0
    }

    /// Substitutes gamma 2.2 for [`ColorTransfer::Unknown`].
    #[inline]
    pub fn resolve(self) -> Self {
        match self {
            Self::Unknown => Self::Gamma22,
            t => t,
        }
    }
}

/// Whether values are scene-referred or display-referred, and if scene
/// referred, which OOTF relates them to display light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorLight {
    /// Not tagged; treated as display-referred.
    #[default]
    Unknown,
    /// Display-referred; no OOTF.
    Display,
    /// Scene-referred with the HLG OOTF (BT.2100).
    SceneHlg,
    /// Scene-referred with the BT.709 OETF followed by the BT.1886 EOTF.
    Scene709_1886,
    /// Scene-referred with a flat 1.2 gamma.
    Scene1_2,
}

impl ColorLight {
    /// Substitutes [`ColorLight::Display`] for [`ColorLight::Unknown`].
    #[inline]
    pub fn resolve(self) -> Self {
        match self {
            Self::Unknown => Self::Display,
            l => l,
        }
    }

    /// Whether an OOTF must be applied to reach display light.
    #[inline]
    pub fn is_scene_referred(self) -> bool {
        matches!(self, Self::SceneHlg | Self::Scene709_1886 | Self::Scene1_2)
    }
}

/// Full description of a color space.
///
/// `sig_peak` is the brightest value actually present in the signal,
/// relative to [`REF_WHITE`]. Zero means unknown, in which case the
/// transfer's nominal peak is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorSpace {
    /// RGB primaries.
    pub primaries: ColorPrimaries,
    /// Transfer characteristic.
    pub transfer: ColorTransfer,
    /// Scene/display light mode.
    pub light: ColorLight,
    /// Signal peak relative to reference white, 0 = unknown.
    pub sig_peak: f32,
}

impl ColorSpace {
    /// Fully untagged.
    pub const UNKNOWN: Self = Self::new(ColorPrimaries::Unknown, ColorTransfer::Unknown);
    /// BT.709 video with the BT.1886 EOTF.
    pub const BT709: Self = Self::new(ColorPrimaries::Bt709, ColorTransfer::Bt1886);
    /// sRGB.
    pub const SRGB: Self = Self::new(ColorPrimaries::Bt709, ColorTransfer::Srgb);
    /// Linear light with BT.709 primaries.
    pub const LINEAR_BT709: Self = Self::new(ColorPrimaries::Bt709, ColorTransfer::Linear);
    /// HDR10: BT.2020 with PQ.
    pub const BT2020_PQ: Self = Self::new(ColorPrimaries::Bt2020, ColorTransfer::Pq);
    /// BT.2100 HLG, scene-referred.
    pub const BT2020_HLG: Self = Self {
        primaries: ColorPrimaries::Bt2020,
        transfer: ColorTransfer::Hlg,
        light: ColorLight::SceneHlg,
        sig_peak: 0.0,
    };
    /// Panasonic V-Gamut / V-Log camera space.
    pub const VLOG: Self = Self {
        primaries: ColorPrimaries::VGamut,
        transfer: ColorTransfer::VLog,
        light: ColorLight::Display,
        sig_peak: 0.0,
    };

    /// Creates a display-referred space with unknown signal peak.
    #[inline]
    pub const fn new(primaries: ColorPrimaries, transfer: ColorTransfer) -> Self {
        Self {
            primaries,
            transfer,
            light: ColorLight::Display,
            sig_peak: 0.0,
        }
    }

    /// Returns a copy with a different light mode.
    #[inline]
    pub const fn with_light(mut self, light: ColorLight) -> Self {
        self.light = light;
        self
    }

    /// Returns a copy with a known signal peak.
    #[inline]
    pub const fn with_sig_peak(mut self, sig_peak: f32) -> Self {
        self.sig_peak = sig_peak;
        self
    }

    /// Nominal peak of the transfer characteristic.
    #[inline]
    pub fn nominal_peak(&self) -> f32 {
        self.transfer.nominal_peak()
    }

    /// Signal peak, falling back to the nominal peak when unknown.
    #[inline]
    pub fn signal_peak(&self) -> f32 {
        if self.sig_peak > 0.0 {
            self.sig_peak
        } else {
            self.nominal_peak()
        }
    }

    /// Whether this is an HDR encoding.
    #[inline]
    pub fn is_hdr(&self) -> bool {
        self.transfer.is_hdr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_peaks() {
        assert_eq!(ColorTransfer::Pq.nominal_peak(), 100.0);
        assert_eq!(ColorTransfer::Hlg.nominal_peak(), 12.0);
        assert_eq!(ColorTransfer::Bt1886.nominal_peak(), 1.0);
        assert!(ColorTransfer::SLog2.is_hdr());
        assert!(!ColorTransfer::Linear.is_hdr());
    }

    #[test]
    fn test_wide_gamut() {
        assert!(ColorPrimaries::Bt2020.is_wide_gamut());
        assert!(ColorPrimaries::DciP3.is_wide_gamut());
        assert!(!ColorPrimaries::Bt709.is_wide_gamut());
        assert!(!ColorPrimaries::Adobe.is_wide_gamut());
    }

    #[test]
    fn test_resolve_unknowns() {
        assert_eq!(ColorPrimaries::Unknown.resolve(), ColorPrimaries::Bt709);
        assert_eq!(ColorTransfer::Unknown.resolve(), ColorTransfer::Gamma22);
        assert_eq!(ColorLight::Unknown.resolve(), ColorLight::Display);
        assert_eq!(ColorTransfer::Pq.resolve(), ColorTransfer::Pq);
    }

    #[test]
    fn test_signal_peak_fallback() {
        let space = ColorSpace::BT2020_PQ;
        assert_eq!(space.signal_peak(), 100.0);
        assert_eq!(space.with_sig_peak(10.0).signal_peak(), 10.0);
    }

    #[test]
    fn test_scene_referred() {
        assert!(ColorSpace::BT2020_HLG.light.is_scene_referred());
        assert!(!ColorLight::Unknown.is_scene_referred());
    }
}
