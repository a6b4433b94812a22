//! # lumina-math
//!
//! Linear algebra for color conversions.
//!
//! - [`Vec3`] - RGB/XYZ triplets
//! - [`Mat3`] - 3x3 matrices (row-major storage, column vectors)
//! - [`Transform3x3`] - affine transform `M * v + c`, the shape of every
//!   decode matrix
//! - Chromatic adaptation ([`adapt_matrix`], [`BRADFORD`])
//!
//! Inversion goes through [`glam`], which is also the interchange type for
//! callers that already use it.
//!
//! ```rust
//! use lumina_math::{Mat3, Transform3x3, Vec3};
//!
//! let t = Transform3x3::new(Mat3::scale(2.0), Vec3::splat(-1.0));
//! assert_eq!(t.apply(Vec3::ONE), Vec3::ONE);
//! ```

#![warn(missing_docs)]

mod adapt;
mod mat3;
mod transform;
mod vec3;

pub use adapt::*;
pub use mat3::*;
pub use transform::*;
pub use vec3::*;
