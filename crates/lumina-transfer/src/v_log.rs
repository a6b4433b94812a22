//! Panasonic V-Log.
//!
//! Linear segment near black, log10 above. Nominal peak is 46.0855 times
//! reference white.

/// Log offset b.
pub const B: f64 = 0.00873;
/// Log scale c.
pub const C: f64 = 0.241514;
/// Log offset d.
pub const D: f64 = 0.598206;

/// Encoded breakpoint.
pub const ENCODED_BREAK: f64 = 0.181;
/// Linear breakpoint.
pub const LINEAR_BREAK: f64 = 0.01;

/// Encoded to scene linear.
///
/// ```rust
/// use lumina_transfer::v_log;
///
/// assert!((v_log::decode(0.125)).abs() < 1e-6);
/// ```
#[inline]
pub fn decode(v: f32) -> f32 {
    let v = v as f64;
    let l = if v >= ENCODED_BREAK {
        10f64.powf((v - D) / C) - B
    } else {
        (v - 0.125) / 5.6
    };
    l as f32
}

/// Scene linear to encoded.
#[inline]
pub fn encode(l: f32) -> f32 {
    let l = l as f64;
    let v = if l >= LINEAR_BREAK {
        C * (l + B).log10() + D
    } else {
        5.6 * l + 0.125
    };
    v as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for i in 0..=1000 {
            let v = i as f32 / 1000.0;
            let back = encode(decode(v));
            assert!((v - back).abs() < 1e-5, "v={v}, back={back}");
        }
    }

    #[test]
    fn test_segments_agree_at_break() {
        let lin = (ENCODED_BREAK - 0.125) / 5.6;
        let log = 10f64.powf((ENCODED_BREAK - D) / C) - B;
        assert!((lin - log).abs() < 1e-5);
    }
}
