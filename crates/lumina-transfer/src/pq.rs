//! SMPTE ST 2084 perceptual quantizer (PQ).
//!
//! PQ encodes absolute luminance up to 10 000 cd/m². Linear values here
//! are relative to reference white (100 cd/m²), so the linear range is
//! [0, 100].
//!
//! Evaluated in double precision: the curve's exponents (~79 and ~6.3)
//! amplify single precision rounding beyond round-trip tolerances.
//!
//! ```rust
//! use lumina_transfer::pq;
//!
//! // reference white sits at roughly half signal
//! assert!((pq::oetf(1.0) - 0.508).abs() < 0.001);
//! assert!((pq::eotf(1.0) - 100.0).abs() < 1e-3);
//! ```

use lumina_core::REF_WHITE;

/// Exponent m1 (2610 / 16384).
pub const M1: f64 = 2610.0 / 4096.0 / 4.0;
/// Exponent m2 (2523 / 32).
pub const M2: f64 = 2523.0 / 4096.0 * 128.0;
/// Offset c1.
pub const C1: f64 = 3424.0 / 4096.0;
/// Scale c2.
pub const C2: f64 = 2413.0 / 4096.0 * 32.0;
/// Scale c3.
pub const C3: f64 = 2392.0 / 4096.0 * 32.0;

/// Peak luminance of the PQ container in units of reference white.
pub const PEAK: f64 = 10000.0 / REF_WHITE as f64;

/// Encoded [0, 1] to linear [0, 100].
#[inline]
pub fn eotf(v: f32) -> f32 {
    let x = (v.max(0.0) as f64).powf(1.0 / M2);
    let x = (x - C1).max(0.0) / (C2 - C3 * x);
    (x.powf(1.0 / M1) * PEAK) as f32
}

/// Linear [0, 100] to encoded [0, 1].
#[inline]
pub fn oetf(l: f32) -> f32 {
    let y = (l.max(0.0) as f64 / PEAK).powf(M1);
    ((C1 + C2 * y) / (1.0 + C3 * y)).powf(M2) as f32
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
    fn test_peak() {
        assert!((eotf(1.0) - 100.0).abs() < 1e-3);
        assert!((oetf(100.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_black() {
        assert!(eotf(0.0).abs() < 1e-9);
        // PQ black is not exactly zero signal
        assert!(oetf(0.0) < 1e-6);
    }
}
