//! Color stages.
//!
//! Each stage appends to a [`ShaderProgram`](crate::ShaderProgram) whose
//! output is [`Signature::Color`](crate::Signature::Color) and leaves it at
//! that signature:
//!
//! | Stage | Effect |
//! |-------|--------|
//! | [`decode_color`] | stored representation to RGB, premultiplied alpha |
//! | [`linearize`] / [`delinearize`] | transfer curve, normalized to nominal peak |
//! | [`ootf`] / [`inverse_ootf`] | scene light to display light and back |
//! | [`tone_map`] | compress a signal peak above 1.0 |
//! | [`color_map`] | the whole chain between two [`ColorSpace`](lumina_core::ColorSpace)s |
//!
//! A stage entered with the wrong signature returns
//! [`ShaderError::ContractViolation`](crate::ShaderError::ContractViolation)
//! and leaves the program untouched.
//!
//! ```rust
//! use lumina_core::ColorSpace;
//! use lumina_shaders::colorspace::{color_map, ColorMapParams};
//! use lumina_shaders::{ShaderProgram, Signature};
//!
//! let mut prog = ShaderProgram::new(Signature::Color);
//! color_map(&mut prog, &ColorMapParams::default(), &ColorSpace::BT2020_PQ, &ColorSpace::SRGB, false).unwrap();
//! assert!(prog.glsl(Default::default()).contains("cms_matrix"));
//! ```

mod color_map;
mod decode;
mod linearize;
mod ootf;
mod params;
mod tone_map;

pub use color_map::{color_map, resolve_destination};
pub use decode::{XYZ_GAMMA, decode_color, decoding_transform};
pub use linearize::{delinearize, linearize};
pub use ootf::{inverse_ootf, ootf};
pub use params::ColorMapParams;
pub use tone_map::{ToneMapping, tone_map};
