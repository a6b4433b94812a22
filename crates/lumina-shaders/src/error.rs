//! Error types for shader assembly, evaluation, hooks, GPU access,
//! rendering and configuration.

use crate::program::Signature;
use lumina_core::Rect2D;
use thiserror::Error;

/// Result alias for shader assembly.
pub type Result<T> = std::result::Result<T, ShaderError>;

/// Errors raised while assembling a [`ShaderProgram`](crate::ShaderProgram).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    /// A stage was entered with the wrong working value type.
    #[error("illegal sequence of shader operations: expected {expected:?}, found {found:?}")]
    ContractViolation {
        /// Signature the stage needs.
        expected: Signature,
        /// Signature the program currently outputs.
        found: Signature,
    },

    /// A stage fixed a different output size than an earlier one.
    #[error("incompatible output size: requested {requested:?}, program is {current:?}")]
    SizeMismatch {
        /// Size the stage needs.
        requested: (u32, u32),
        /// Size already fixed by the program.
        current: (u32, u32),
    },
}

/// Errors raised by the CPU evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Operand types do not fit the operation.
    #[error("type mismatch in {op}")]
    TypeMismatch {
        /// Operation that failed.
        op: &'static str,
    },

    /// Reference to a symbol that was never bound.
    #[error("unknown identifier: {0}")]
    UnknownIdent(String),

    /// A texture was sampled without a bound test color.
    #[error("no color bound for texture {0}")]
    UnboundTexture(String),

    /// Raw fragments carry no semantics the evaluator understands.
    #[error("raw shader fragments cannot be evaluated")]
    Opaque,
}

/// Failure reported by a [`Hook`](crate::Hook).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The hook could not run.
    #[error("hook failed: {0}")]
    Failed(String),

    /// The hook tried to extend the program and was refused.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// Materializing or sampling the hook's input failed.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

impl HookError {
    /// Creates a generic failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Errors from the GPU collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpuError {
    /// Texture creation was refused.
    #[error("texture allocation failed: {width}x{height}")]
    AllocationFailed {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Requested size exceeds device limits.
    #[error("image too large: {width}x{height} (max {max})")]
    ImageTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },

    /// A program could not be dispatched.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),

    /// Program failed to assemble.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// Invalid input image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors from [`Renderer::render_image`](crate::Renderer::render_image).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The image has nothing to sample.
    #[error("image contains no planes")]
    NoPlanes,

    /// The image is larger than the device can hold.
    #[error("image too large: {width}x{height} (max {max})")]
    ImageTooLarge {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Maximum supported dimension.
        max: u32,
    },

    /// A plane or the image description is unusable.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The destination rectangle does not overlap the target texture.
    #[error("destination rect {0:?} lies outside the target texture")]
    TargetOutOfBounds(Rect2D),

    /// A fixed stage refused the program.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The GPU collaborator failed.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Errors loading [`RenderParams`](crate::RenderParams).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid YAML for the parameters.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
