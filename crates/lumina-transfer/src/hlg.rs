//! ARIB STD-B67 hybrid log-gamma (HLG).
//!
//! Square root below half signal, logarithmic above. Linear values are
//! scene light with reference white at 1.0 and the encodable peak at 12.
//!
//! ```rust
//! use lumina_transfer::hlg;
//!
//! assert!((hlg::eotf(0.5) - 1.0).abs() < 1e-6);
//! assert!((hlg::eotf(1.0) - 12.0).abs() < 1e-3);
//! ```

/// Curve constant a.
pub const A: f64 = 0.17883277;
/// Curve constant b.
pub const B: f64 = 0.28466892;
/// Curve constant c.
pub const C: f64 = 0.55991073;

/// Encoded [0, 1] to scene linear [0, 12].
#[inline]
pub fn eotf(v: f32) -> f32 {
    let v = v as f64;
    let l = if v > 0.5 {
        ((v - C) / A).exp() + B
    } else {
        4.0 * v * v
    };
    l as f32
}

/// Scene linear [0, 12] to encoded [0, 1].
#[inline]
pub fn oetf(l: f32) -> f32 {
    let l = l as f64;
    let v = if l > 1.0 {
        A * (l - B).ln() + C
    } else {
        0.5 * l.max(0.0).sqrt()
    };
    v as f32
}
