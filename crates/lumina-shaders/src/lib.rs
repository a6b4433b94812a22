//! # lumina-shaders
//!
//! Shader generation for the lumina color pipeline.
//!
//! Programs are assembled as a typed IR ([`ShaderProgram`]) by a fixed chain
//! of color stages, then emitted as GLSL for the GPU or evaluated on the CPU
//! for verification.
//!
//! # Architecture
//!
//! ```text
//!                  Renderer
//!                     |
//!        +------------+------------+
//!        |            |            |
//!   colorspace     custom        gpu
//!  (color stages)  (hooks)   (collaborator)
//!        |            |            |
//!        +------------+------------+
//!                     |
//!               ShaderProgram
//!                     |
//!        +------------+------------+
//!        |            |            |
//!       ir          glsl         eval
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use lumina_core::{ColorRepr, ColorSpace};
//! use lumina_shaders::colorspace::{ColorMapParams, color_map, decode_color};
//! use lumina_shaders::{ShaderProgram, Signature};
//!
//! let mut prog = ShaderProgram::new(Signature::Color);
//! let mut repr = ColorRepr::BT709_TV;
//! decode_color(&mut prog, &mut repr, &Default::default()).unwrap();
//! color_map(&mut prog, &ColorMapParams::default(), &ColorSpace::BT709, &ColorSpace::SRGB, false).unwrap();
//!
//! let glsl = prog.glsl(Default::default());
//! assert!(glsl.contains("cmat"));
//!
//! // TV-range white decodes to white
//! let white = prog.eval([235.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0]).unwrap();
//! assert!((white[0] - 1.0).abs() < 1e-3);
//! ```
//!
//! # Modules
//!
//! - [`ir`] - expressions, statements and constants
//! - [`program`] - the [`ShaderProgram`] accumulator and its [`Signature`]
//! - [`glsl`] - GLSL emission
//! - [`eval`] - CPU evaluator
//! - [`colorspace`] - decode, linearize, OOTF, tone mapping, color mapping
//! - [`custom`] - user hooks and the hook runner
//! - [`gpu`] - GPU collaborator trait and a software device
//! - [`config`] - YAML render parameters
//! - [`renderer`] - the full render pass

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod colorspace;
pub mod config;
pub mod custom;
pub mod error;
pub mod eval;
pub mod glsl;
pub mod gpu;
pub mod ir;
pub mod program;
pub mod renderer;

pub use config::RenderParams;
pub use custom::{Hook, HookParams, HookStage, HookStatus};
pub use error::{ConfigError, EvalError, GpuError, HookError, RenderError, Result, ShaderError};
pub use glsl::GlslVersion;
pub use program::{ShaderProgram, Signature};
pub use renderer::{Image, Plane, RenderReport, RenderTarget, Renderer};
