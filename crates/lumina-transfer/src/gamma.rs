//! Pure power law curves.
//!
//! Covers gamma 1.8, 2.2 (also the fallback for untagged content), 2.8
//! and BT.1886, which is treated as a pure 2.4 power with a zero black
//! level.

/// BT.1886 exponent.
pub const BT1886: f32 = 2.4;

/// Encoded to linear: `v^gamma`.
///
/// ```rust
/// use lumina_transfer::gamma;
///
/// assert!((gamma::eotf(0.5, 2.0) - 0.25).abs() < 1e-6);
/// ```
#[inline]
pub fn eotf(v: f32, gamma: f32) -> f32 {
    if v <= 0.0 { 0.0 } else { v.powf(gamma) }
}

/// Linear to encoded: `l^(1/gamma)`.
#[inline]
pub fn oetf(l: f32, gamma: f32) -> f32 {
    if l <= 0.0 { 0.0 } else { l.powf(1.0 / gamma) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for g in [1.8, 2.2, BT1886, 2.8] {
            for i in 0..=100 {
                let v = i as f32 / 100.0;
                assert!((oetf(eotf(v, g), g) - v).abs() < 1e-5, "g={g} v={v}");
            }
        }
    }
}
