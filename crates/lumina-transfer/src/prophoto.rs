//! ProPhoto RGB (ROMM) transfer function.
//!
//! A 1.8 power with a short linear segment of slope 16 near black.

/// Encoded breakpoint.
pub const ENCODED_BREAK: f32 = 0.03125;
/// Linear breakpoint.
pub const LINEAR_BREAK: f32 = 0.001953;

/// Encoded to linear.
#[inline]
pub fn eotf(v: f32) -> f32 {
    if v > ENCODED_BREAK { v.powf(1.8) } else { v / 16.0 }
}

/// Linear to encoded.
#[inline]
pub fn oetf(l: f32) -> f32 {
    if l >= LINEAR_BREAK { l.powf(1.0 / 1.8) } else { l * 16.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=1000 {
            let v = i as f32 / 1000.0;
            assert!((oetf(eotf(v)) - v).abs() < 1e-5, "v={v}");
        }
    }

    #[test]
    fn test_linear_segment() {
        assert_eq!(eotf(0.016), 0.001);
        assert_eq!(oetf(0.001), 0.016);
    }
}
