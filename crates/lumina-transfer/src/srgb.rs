//! sRGB transfer function (IEC 61966-2-1).
//!
//! Piecewise: a linear toe below the breakpoint, a 2.4 power with offset
//! above it.
//!
//! ```rust
//! use lumina_transfer::srgb;
//!
//! let linear = srgb::eotf(0.5);
//! assert!((linear - 0.214).abs() < 0.001);
//! assert!((srgb::oetf(linear) - 0.5).abs() < 1e-5);
//! ```

/// Encoded breakpoint between the toe and the power segment.
pub const ENCODED_BREAK: f32 = 0.04045;
/// Linear breakpoint between the toe and the power segment.
pub const LINEAR_BREAK: f32 = 0.0031308;

/// Encoded to linear.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v > ENCODED_BREAK {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    }
}

/// Linear to encoded.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l >= LINEAR_BREAK {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    } else {
        l * 12.92
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=1000 {
            let v = i as f32 / 1000.0;
            let back = oetf(eotf(v));
            assert!((v - back).abs() < 1e-5, "v={v}, back={back}");
        }
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(eotf(0.0), 0.0);
        assert!((eotf(1.0) - 1.0).abs() < 1e-6);
        assert!((oetf(1.0) - 1.0).abs() < 1e-6);
    }
}
