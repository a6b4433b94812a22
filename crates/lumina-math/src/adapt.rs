//! Chromatic adaptation between white points.
//!
//! White points are given as CIE xy chromaticities, the form in which
//! every primaries table publishes them. [`adapt_matrix`] converts XYZ
//! values seen under one white into XYZ values under another using a
//! von Kries style scaling in a cone response space ([`BRADFORD`] by
//! default).
//!
//! ```rust
//! use lumina_math::{adapt_matrix, xy_to_xyz, BRADFORD, D50, D65};
//!
//! let m = adapt_matrix(BRADFORD, D65, D50);
//! let white = m * xy_to_xyz(D65);
//! let d50 = xy_to_xyz(D50);
//! assert!((white.x - d50.x).abs() < 1e-4);
//! assert!((white.z - d50.z).abs() < 1e-4);
//! ```

use crate::{Mat3, Vec3};

/// CIE xy chromaticity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Chromaticity {
    /// x coordinate
    pub x: f32,
    /// y coordinate
    pub y: f32,
}

impl Chromaticity {
    /// Creates a chromaticity.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// CIE Standard Illuminant D65.
pub const D65: Chromaticity = Chromaticity::new(0.31271, 0.32902);
/// CIE Standard Illuminant D50.
pub const D50: Chromaticity = Chromaticity::new(0.34577, 0.35850);
/// CIE Standard Illuminant C.
pub const ILLUMINANT_C: Chromaticity = Chromaticity::new(0.31006, 0.31616);
/// Equal energy illuminant E.
pub const ILLUMINANT_E: Chromaticity = Chromaticity::new(1.0 / 3.0, 1.0 / 3.0);
/// DCI theatrical white.
pub const DCI_WHITE: Chromaticity = Chromaticity::new(0.31400, 0.35100);

/// Bradford cone response matrix.
pub const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Converts an xy chromaticity to XYZ with Y = 1.
#[inline]
pub fn xy_to_xyz(c: Chromaticity) -> Vec3 {
    if c.y == 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(c.x / c.y, 1.0, (1.0 - c.x - c.y) / c.y)
}

/// Adaptation matrix from `src` white to `dst` white.
///
/// `method` maps XYZ into the cone space where the per-channel scaling
/// happens; the result is `method⁻¹ · diag(dst/src) · method`. A singular
/// `method` degrades to plain XYZ scaling.
pub fn adapt_matrix(method: Mat3, src: Chromaticity, dst: Chromaticity) -> Mat3 {
    let (method, method_inv) = match method.inverse() {
        Some(inv) => (method, inv),
        None => (Mat3::IDENTITY, Mat3::IDENTITY),
    };

    let src_cone = method * xy_to_xyz(src);
    let dst_cone = method * xy_to_xyz(dst);
    let scale = Mat3::diagonal(
        dst_cone.x / src_cone.x,
        dst_cone.y / src_cone.y,
        dst_cone.z / src_cone.z,
    );

    method_inv * scale * method
}
