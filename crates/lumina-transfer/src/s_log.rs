//! Sony S-Log1 and S-Log2.
//!
//! Both share the same log10 core. S-Log2 rescales the linear input by
//! 155/219 and adds a linear segment below the black point `Q`.
//!
//! Encoded black sits at about 0.03 rather than zero, so values below
//! [`encode1(0.0)`](encode1) decode to slightly negative light.

/// Log scale a.
pub const A: f64 = 0.432699;
/// Linear offset b.
pub const B: f64 = 0.037584;
/// Log offset c.
pub const C: f64 = 0.616596 + 0.03;
/// S-Log2 linear segment slope.
pub const P: f64 = 3.538813;
/// S-Log2 encoded black point.
pub const Q: f64 = 0.030001;
/// S-Log2 input scale.
pub const K2: f64 = 155.0 / 219.0;

/// S-Log1 encoded to scene linear.
#[inline]
pub fn decode1(v: f32) -> f32 {
    (10f64.powf((v as f64 - C) / A) - B) as f32
}

/// S-Log1 scene linear to encoded.
#[inline]
pub fn encode1(l: f32) -> f32 {
    (A * (l as f64 + B).log10() + C) as f32
}

/// S-Log2 encoded to scene linear.
///
/// ```rust
/// use lumina_transfer::s_log;
///
/// let black = s_log::encode2(0.0);
/// assert!(s_log::decode2(black).abs() < 1e-5);
/// ```
#[inline]
pub fn decode2(v: f32) -> f32 {
    let v = v as f64;
    let l = if v >= Q {
        (10f64.powf((v - C) / A) - B) / K2
    } else {
        (v - Q) / P
    };
    l as f32
}

/// S-Log2 scene linear to encoded.
///
/// Negative light uses the linear segment.
#[inline]
pub fn encode2(l: f32) -> f32 {
    let l = l as f64;
    let v = if l >= 0.0 {
        A * (K2 * l + B).log10() + C
    } else {
        P * l + Q
    };
    v as f32
}
