//! # lumina-core
//!
//! Core types shared by every lumina crate.
//!
//! This crate is the plain data model of the color pipeline:
//!
//! - [`ColorSpace`] - primaries, transfer characteristic, light mode, signal peak
//! - [`ColorRepr`] - how pixel values are encoded (system, levels, alpha, bits)
//! - [`ColorAdjustment`] - user brightness/contrast/saturation/hue controls
//! - [`Rect2D`], [`Rect2DF`] - integer and floating point rectangles
//! - [`PlaneData`] - per-plane memory layout derived from a pixel format
//!
//! ## Crate Structure
//!
//! ```text
//! lumina-core (this crate)
//!    ^
//!    |
//!    +-- lumina-math (matrices, chromatic adaptation)
//!    +-- lumina-transfer (transfer curves)
//!    +-- lumina-primaries (gamuts and gamut mapping)
//!    +-- lumina-shaders (program IR, color stages, hooks)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - derive `Serialize`/`Deserialize` for the configuration enums

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod error;
pub mod plane;
pub mod rect;
pub mod repr;

pub use colorspace::*;
pub use error::*;
pub use plane::*;
pub use rect::*;
pub use repr::*;

/// Prelude module for convenient imports.
///
/// ```
/// use lumina_core::prelude::*;
///
/// let space = ColorSpace::SRGB;
/// assert_eq!(space.transfer, ColorTransfer::Srgb);
/// ```
pub mod prelude {
    pub use crate::colorspace::{ColorLight, ColorPrimaries, ColorSpace, ColorTransfer, REF_WHITE};
    pub use crate::error::{Error, Result};
    pub use crate::plane::{ComponentType, PlaneData, PixelFormatDescriptor, PixelFormatMapper};
    pub use crate::rect::{Rect2D, Rect2DF};
    pub use crate::repr::{
        AlphaMode, BitEncoding, ColorAdjustment, ColorLevels, ColorRepr, ColorSystem,
    };
}
