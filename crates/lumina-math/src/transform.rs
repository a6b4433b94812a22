//! Affine 3x3 transform with a constant offset.

use crate::{Mat3, Vec3};

/// `v -> mat * v + c`.
///
/// Decode matrices for YCbCr systems are of this shape: the offset folds
/// in the level range and chroma midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform3x3 {
    /// Linear part.
    pub mat: Mat3,
    /// Constant offset added after the matrix.
    pub c: Vec3,
}

impl Transform3x3 {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        mat: Mat3::IDENTITY,
        c: Vec3::ZERO,
    };

    /// Creates a transform.
    #[inline]
    pub const fn new(mat: Mat3, c: Vec3) -> Self {
        Self { mat, c }
    }

    /// Applies the transform.
    #[inline]
    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.mat * v + self.c
    }

    /// Inverse transform, `None` if the linear part is singular.
    ///
    /// ```rust
    /// use lumina_math::{Mat3, Transform3x3, Vec3};
    ///
    /// let t = Transform3x3::new(Mat3::scale(4.0), Vec3::splat(1.0));
    /// let inv = t.inverse().unwrap();
    /// let v = Vec3::new(0.1, 0.2, 0.3);
    /// let back = inv.apply(t.apply(v));
    /// let d = back - v;
    /// assert!(d.dot(d) < 1e-12);
    /// ```
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.mat.inverse()?;
        Some(Self::new(inv, -(inv * self.c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_undoes_offset() {
        let t = Transform3x3::new(Mat3::scale(2.0), Vec3::splat(1.0));
        let inv = t.inverse().unwrap();
        assert_eq!(inv.apply(Vec3::new(3.0, 5.0, 7.0)), Vec3::new(1.0, 2.0, 3.0));
    }
}
