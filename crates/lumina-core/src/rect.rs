//! Rectangles for crops and render targets.
//!
//! - [`Rect2D`] - integer pixel rectangle (destination crops, texture regions)
//! - [`Rect2DF`] - floating point rectangle (sub-pixel source crops)
//!
//! Origin is the top-left corner, X grows right, Y grows down.
//!
//! ```rust
//! use lumina_core::Rect2D;
//!
//! let a = Rect2D::new(10, 20, 100, 50);
//! let b = Rect2D::new(50, 40, 100, 50);
//! let overlap = a.intersect(&b).unwrap();
//! assert_eq!((overlap.width, overlap.height), (60, 30));
//! ```

/// Integer rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect2D {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect2D {
    /// Creates a rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Overlap of two rectangles, `None` if they are disjoint.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Floating point rectangle defined by origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect2DF {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect2DF {
    /// Creates a rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<Rect2D> for Rect2DF {
    fn from(r: Rect2D) -> Self {
        Self::new(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_clips_to_overlap() {
        let tex = Rect2D::new(0, 0, 16, 16);
        let crop = Rect2D::new(-4, 8, 10, 20);
        assert_eq!(crop.intersect(&tex), Some(Rect2D::new(0, 8, 6, 8)));
        assert_eq!(tex.intersect(&tex), Some(tex));
    }

    #[test]
    fn test_disjoint() {
        let a = Rect2D::new(0, 0, 10, 10);
        let b = Rect2D::new(10, 0, 10, 10);
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn test_from_integer_rect() {
        let r: Rect2DF = Rect2D::new(-2, 3, 4, 5).into();
        assert_eq!(r, Rect2DF::new(-2.0, 3.0, 4.0, 5.0));
    }
}
