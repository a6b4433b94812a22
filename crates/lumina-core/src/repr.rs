//! Color representation: how color values are stored in textures.
//!
//! [`ColorRepr`] describes the *encoding* of a pixel, independent of its
//! [`ColorSpace`](crate::ColorSpace): which matrix system (RGB, YCbCr
//! variants, XYZ), which level range, how alpha is stored and how many
//! bits the samples carry.
//!
//! The decode stage rewrites a representation in place as it goes, so a
//! caller can always see what state the working value is in.

/// Matrix system of the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorSystem {
    /// Not tagged; treated as RGB.
    #[default]
    Unknown,
    /// ITU-R BT.601 YCbCr.
    Bt601,
    /// ITU-R BT.709 YCbCr.
    Bt709,
    /// SMPTE-240M YCbCr.
    Smpte240m,
    /// ITU-R BT.2020 non-constant luminance YCbCr.
    Bt2020Nc,
    /// ITU-R BT.2020 constant luminance YCbCr.
    Bt2020C,
    /// YCgCo.
    YCgCo,
    /// Plain RGB.
    Rgb,
    /// CIE XYZ with a 2.6 input gamma (digital cinema).
    Xyz,
}

impl ColorSystem {
    /// Whether the system stores one luma and two chroma channels.
    #[inline]
    pub fn is_ycbcr_like(self) -> bool {
        matches!(
            self,
            Self::Bt601 | Self::Bt709 | Self::Smpte240m | Self::Bt2020Nc | Self::Bt2020C | Self::YCgCo
        )
    }

    /// Whether decoding is a pure affine matrix.
    ///
    /// Constant luminance BT.2020 and XYZ involve non-linear steps, which
    /// do not commute with alpha premultiplication.
    #[inline]
    pub fn is_linear(self) -> bool {
        !matches!(self, Self::Bt2020C | Self::Xyz)
    }
}

/// Quantization range of the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ColorLevels {
    /// Not tagged; guessed from the system.
    #[default]
    Unknown,
    /// Limited/TV range (16-235 for 8-bit luma).
    Tv,
    /// Full/PC range.
    Pc,
}

impl ColorLevels {
    /// Resolves unknown levels: TV for YCbCr-like systems, PC otherwise.
    #[inline]
    pub fn resolve(self, sys: ColorSystem) -> Self {
        match self {
            Self::Unknown if sys.is_ycbcr_like() => Self::Tv,
            Self::Unknown => Self::Pc,
            l => l,
        }
    }
}

/// How alpha is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlphaMode {
    /// No alpha, or not tagged.
    #[default]
    Unknown,
    /// Color values are independent of alpha.
    Independent,
    /// Color values are multiplied by alpha.
    Premultiplied,
}

/// Bit layout of the samples.
///
/// `sample_depth` is the number of bits in the texture format,
/// `color_depth` the number of significant bits, and `bit_shift` how far
/// those bits are shifted left inside the sample. Zero depths mean 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BitEncoding {
    /// Bits per sample in the texture.
    pub sample_depth: u32,
    /// Significant bits per sample.
    pub color_depth: u32,
    /// Left shift of the significant bits.
    pub bit_shift: u32,
}

impl BitEncoding {
    /// Creates an encoding where all bits are significant.
    #[inline]
    pub const fn new(depth: u32) -> Self {
        Self {
            sample_depth: depth,
            color_depth: depth,
            bit_shift: 0,
        }
    }

    /// Sample depth with the 8-bit default applied.
    #[inline]
    pub fn sample_bits(&self) -> u32 {
        if self.sample_depth == 0 { 8 } else { self.sample_depth }
    }

    /// Color depth with defaults applied (falls back to the sample depth).
    #[inline]
    pub fn color_bits(&self) -> u32 {
        if self.color_depth == 0 {
            self.sample_bits()
        } else {
            self.color_depth
        }
    }
}

/// Complete description of how color values are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorRepr {
    /// Matrix system.
    pub sys: ColorSystem,
    /// Level range.
    pub levels: ColorLevels,
    /// Alpha storage.
    pub alpha: AlphaMode,
    /// Bit layout.
    pub bits: BitEncoding,
}

impl ColorRepr {
    /// Full range 8-bit RGB with independent alpha.
    pub const RGB: Self = Self {
        sys: ColorSystem::Rgb,
        levels: ColorLevels::Pc,
        alpha: AlphaMode::Independent,
        bits: BitEncoding::new(8),
    };

    /// Limited range 8-bit BT.709 YCbCr.
    pub const BT709_TV: Self = Self {
        sys: ColorSystem::Bt709,
        levels: ColorLevels::Tv,
        alpha: AlphaMode::Unknown,
        bits: BitEncoding::new(8),
    };

    /// Creates a representation with 8-bit samples and unknown alpha.
    #[inline]
    pub const fn new(sys: ColorSystem, levels: ColorLevels) -> Self {
        Self {
            sys,
            levels,
            alpha: AlphaMode::Unknown,
            bits: BitEncoding::new(8),
        }
    }

    /// Level range with the guessing rule applied.
    #[inline]
    pub fn effective_levels(&self) -> ColorLevels {
        self.levels.resolve(self.sys)
    }

    /// Normalizes the bit encoding.
    ///
    /// Returns the factor that maps sampled texture values (normalized
    /// against `sample_depth`, shifted by `bit_shift`) onto values
    /// normalized against `color_depth`. Afterwards the encoding reads as
    /// if the texture had been sampled at `color_depth` with no shift.
    ///
    /// ```rust
    /// use lumina_core::{BitEncoding, ColorLevels, ColorRepr, ColorSystem};
    ///
    /// let mut repr = ColorRepr::new(ColorSystem::Rgb, ColorLevels::Pc);
    /// repr.bits = BitEncoding { sample_depth: 16, color_depth: 10, bit_shift: 0 };
    /// let scale = repr.normalize();
    /// assert!((scale - 65535.0 / 1023.0).abs() < 1e-3);
    /// assert_eq!(repr.bits.sample_depth, 10);
    /// ```
    pub fn normalize(&mut self) -> f32 {
        let mut scale = 1.0f64;
        if self.bits.bit_shift > 0 {
            scale /= (1u64 << self.bits.bit_shift) as f64;
            self.bits.bit_shift = 0;
        }

        let tex_bits = self.bits.sample_bits();
        let col_bits = self.bits.color_bits();
        let tex_max = (1u64 << tex_bits) as f64;
        let col_max = (1u64 << col_bits) as f64;

        match self.effective_levels() {
            // Limited range is always shifted directly
            ColorLevels::Tv => scale *= tex_max / col_max,
            // Full range always spans the whole range available
            _ => scale *= (tex_max - 1.0) / (col_max - 1.0),
        }

        self.bits.sample_depth = col_bits;
        self.bits.color_depth = col_bits;
        scale as f32
    }
}

/// User color controls applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorAdjustment {
    /// Additive offset, 0 = neutral.
    pub brightness: f32,
    /// Gain, 1 = neutral.
    pub contrast: f32,
    /// Chroma gain, 1 = neutral. YCbCr-like systems only.
    pub saturation: f32,
    /// Chroma rotation in radians, 0 = neutral. YCbCr-like systems only.
    pub hue: f32,
}

impl ColorAdjustment {
    /// No adjustment.
    pub const NEUTRAL: Self = Self {
        brightness: 0.0,
        contrast: 1.0,
        saturation: 1.0,
        hue: 0.0,
    };
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        Self::NEUTRAL
    }
}
