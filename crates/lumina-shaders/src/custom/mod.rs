//! User hooks.
//!
//! A [`Hook`] observes or replaces the working image at fixed points of the
//! render pipeline. Each point is a [`HookStage`]; a hook declares the
//! stages it wants and the [`Signature`] it wants the image in:
//!
//! - [`Signature::Color`]: the hook receives the in-flight program and
//!   appends to it.
//! - [`Signature::None`]: the hook receives a fresh program plus the image
//!   as a [`HookTexture`] and has to sample it itself.
//!
//! The pipeline drives hooks through a [`HookRunner`].
//!
//! ```rust
//! use lumina_shaders::custom::{Hook, HookParams, HookStage, HookStatus};
//! use lumina_shaders::ir::{Expr, Stmt};
//! use lumina_shaders::{HookError, Signature};
//!
//! struct Invert;
//!
//! impl Hook for Invert {
//!     fn stages(&self) -> HookStage {
//!         HookStage::OUTPUT
//!     }
//!
//!     fn input(&self) -> Signature {
//!         Signature::Color
//!     }
//!
//!     fn hook(&mut self, params: &mut HookParams<'_>) -> Result<HookStatus, HookError> {
//!         params.program.push(Stmt::SetRgb(Expr::splat(1.0) - Expr::rgb()));
//!         Ok(HookStatus::NONE)
//!     }
//! }
//! ```

mod runner;

pub use runner::{Frame, FrameImage, HookFailure, HookRunner, MAX_PASSES};

use crate::error::HookError;
use crate::gpu::{Gpu, Texture};
use crate::program::{ShaderProgram, Signature};
use lumina_core::{ColorRepr, ColorSpace, Rect2D, Rect2DF};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of pipeline stages.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HookStage(u16);

impl HookStage {
    /// Input plane of an RGB image.
    pub const RGB_INPUT: Self = Self(1 << 0);
    /// Luma plane.
    pub const LUMA_INPUT: Self = Self(1 << 1);
    /// Chroma plane.
    pub const CHROMA_INPUT: Self = Self(1 << 2);
    /// Alpha plane.
    pub const ALPHA_INPUT: Self = Self(1 << 3);
    /// Input plane of an XYZ image.
    pub const XYZ_INPUT: Self = Self(1 << 4);
    /// Chroma plane after upscaling to the luma size.
    pub const CHROMA_SCALED: Self = Self(1 << 5);
    /// Alpha plane after upscaling to the luma size.
    pub const ALPHA_SCALED: Self = Self(1 << 6);
    /// Merged planes, still in the source representation.
    pub const NATIVE: Self = Self(1 << 7);
    /// Decoded RGB.
    pub const RGB: Self = Self(1 << 8);
    /// Decoded RGB, meant for overlays drawn on the source.
    pub const RGB_OVERLAY: Self = Self(1 << 9);
    /// Linear light.
    pub const LINEAR: Self = Self(1 << 10);
    /// Sigmoidized light.
    pub const SIGMOID: Self = Self(1 << 11);
    /// Before the main scaler.
    pub const PREKERNEL: Self = Self(1 << 12);
    /// After the main scaler.
    pub const POSTKERNEL: Self = Self(1 << 13);
    /// Scaled image, back in the source color space.
    pub const SCALED: Self = Self(1 << 14);
    /// Final image in the target color space.
    pub const OUTPUT: Self = Self(1 << 15);

    /// No stage.
    pub const NONE: Self = Self(0);

    const NAMES: [&'static str; 16] = [
        "RGB_INPUT",
        "LUMA_INPUT",
        "CHROMA_INPUT",
        "ALPHA_INPUT",
        "XYZ_INPUT",
        "CHROMA_SCALED",
        "ALPHA_SCALED",
        "NATIVE",
        "RGB",
        "RGB_OVERLAY",
        "LINEAR",
        "SIGMOID",
        "PREKERNEL",
        "POSTKERNEL",
        "SCALED",
        "OUTPUT",
    ];

    /// Stages without a fixed output size.
    pub const RESIZABLE: Self = Self(
        Self::RGB_INPUT.0
            | Self::LUMA_INPUT.0
            | Self::CHROMA_INPUT.0
            | Self::ALPHA_INPUT.0
            | Self::XYZ_INPUT.0
            | Self::RGB.0
            | Self::RGB_OVERLAY.0,
    );

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Builds a set from raw bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Whether every stage in `other` is in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the two sets share a stage.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Stages in `self` but not in `other`.
    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether hooks at this stage may change the image size.
    ///
    /// ```rust
    /// use lumina_shaders::custom::HookStage;
    ///
    /// assert!(HookStage::LUMA_INPUT.is_resizable());
    /// assert!(!HookStage::OUTPUT.is_resizable());
    /// ```
    #[inline]
    pub const fn is_resizable(self) -> bool {
        !self.is_empty() && Self::RESIZABLE.contains(self)
    }

    /// Single stages contained in the set, in pipeline order.
    pub fn iter(self) -> impl Iterator<Item = HookStage> {
        (0..16).map(|i| Self(1 << i)).filter(move |s| self.contains(*s))
    }

    /// Name of a single stage.
    pub fn name(self) -> Option<&'static str> {
        if self.0.count_ones() != 1 {
            return None;
        }
        Some(Self::NAMES[self.0.trailing_zeros() as usize])
    }
}

impl BitOr for HookStage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for HookStage {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("HookStage(NONE)");
        }
        let names: Vec<&str> = self.iter().filter_map(HookStage::name).collect();
        write!(f, "HookStage({})", names.join(" | "))
    }
}

/// Flags returned by a successful hook invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HookStatus(u8);

impl HookStatus {
    /// Done with this stage.
    pub const NONE: Self = Self(0);
    /// Invoke the same hook again on the result.
    pub const AGAIN: Self = Self(1 << 0);
    /// Materialize the result and hand it to [`Hook::save`].
    pub const SAVE: Self = Self(1 << 1);

    /// Whether every flag in `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for HookStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A texture together with the region and representation of its content.
#[derive(Debug, Clone, PartialEq)]
pub struct HookTexture {
    /// The texture.
    pub texture: Texture,
    /// Region holding the image.
    pub src_rect: Rect2DF,
    /// How the texels are encoded.
    pub repr: ColorRepr,
}

/// Arguments of [`Hook::hook`].
pub struct HookParams<'a> {
    /// GPU collaborator, for hooks that allocate their own textures.
    pub gpu: &'a mut dyn Gpu,
    /// Stage being run.
    pub stage: HookStage,
    /// Invocation counter for this hook at this stage, from 0.
    pub count: u32,
    /// Program to extend. For [`Signature::None`] hooks this is a fresh
    /// program that still has to sample [`HookParams::texture`].
    pub program: &'a mut ShaderProgram,
    /// Current image, for [`Signature::None`] hooks.
    pub texture: Option<HookTexture>,
    /// Representation of the working value.
    pub repr: ColorRepr,
    /// Color space of the working value.
    pub color: ColorSpace,
    /// Number of meaningful components.
    pub components: u8,
    /// Source crop.
    pub src_rect: Rect2DF,
    /// Destination crop.
    pub dst_rect: Rect2D,
}

/// Arguments of [`Hook::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveParams {
    /// Stage the image was produced at.
    pub stage: HookStage,
    /// Invocation counter of the pass that asked for the save.
    pub count: u32,
    /// The materialized image. The hook owns it from here on.
    pub texture: HookTexture,
}

/// A user hook.
pub trait Hook {
    /// Stages this hook runs at.
    fn stages(&self) -> HookStage;

    /// Form the image is wanted in: [`Signature::Color`] or
    /// [`Signature::None`].
    fn input(&self) -> Signature;

    /// Called once per frame before any stage.
    fn reset(&mut self) {}

    /// Runs the hook.
    fn hook(&mut self, params: &mut HookParams<'_>) -> Result<HookStatus, HookError>;

    /// Receives the image after a pass returned [`HookStatus::SAVE`].
    fn save(&mut self, _params: &SaveParams) {}
}
