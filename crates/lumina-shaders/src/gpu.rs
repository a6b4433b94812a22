//! GPU collaborator interface.
//!
//! The pipeline never talks to a graphics API itself. It asks a [`Gpu`]
//! implementation for device limits and the GLSL dialect, allocates
//! intermediate textures through it and hands finished programs to
//! [`Gpu::dispatch`].
//!
//! [`SoftGpu`] is a software device for tests and tooling: every texture
//! holds a single flat color and dispatching evaluates the program on the
//! CPU.

use crate::error::GpuError;
use crate::eval::Evaluator;
use crate::glsl::GlslVersion;
use crate::program::{ShaderProgram, Signature};
use lumina_core::{ComponentType, Rect2D};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Result alias for GPU operations.
pub type GpuResult<T> = std::result::Result<T, GpuError>;

/// Device limits relevant to program generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuLimits {
    /// Maximum 1D texture size.
    pub max_tex_1d_dim: u32,
    /// Maximum 2D texture width/height.
    pub max_tex_2d_dim: u32,
    /// Maximum 3D texture size.
    pub max_tex_3d_dim: u32,
    /// Maximum uniform buffer size in bytes.
    pub max_ubo_size: usize,
    /// Shared memory per work group in bytes (0 = no compute).
    pub max_shmem_size: usize,
    /// Maximum threads per compute work group.
    pub max_group_threads: u32,
    /// Maximum work groups per dispatch, per dimension.
    pub max_dispatch: [u32; 3],
}

impl Default for GpuLimits {
    fn default() -> Self {
        Self {
            max_tex_1d_dim: 16384,
            max_tex_2d_dim: 16384,
            max_tex_3d_dim: 2048,
            max_ubo_size: 65536,
            max_shmem_size: 32768,
            max_group_threads: 1024,
            max_dispatch: [65535; 3],
        }
    }
}

impl GpuLimits {
    /// Whether a `w`x`h` 2D texture can be created.
    #[inline]
    pub fn fits_texture(&self, w: u32, h: u32) -> bool {
        w <= self.max_tex_2d_dim && h <= self.max_tex_2d_dim
    }

    /// Whether compute shaders are usable at all.
    #[inline]
    pub fn supports_compute(&self) -> bool {
        self.max_shmem_size > 0 && self.max_group_threads > 0
    }
}

/// Texel format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFormat {
    /// Number of components (1-4).
    pub components: u8,
    /// Bits per component.
    pub depth: u8,
    /// Numeric type.
    pub ty: ComponentType,
}

impl TextureFormat {
    /// 8-bit RGBA.
    pub const RGBA8: Self = Self {
        components: 4,
        depth: 8,
        ty: ComponentType::Unorm,
    };
    /// 16-bit float RGBA, the usual intermediate format.
    pub const RGBA16F: Self = Self {
        components: 4,
        depth: 16,
        ty: ComponentType::Float,
    };
    /// 8-bit single channel.
    pub const R8: Self = Self {
        components: 1,
        depth: 8,
        ty: ComponentType::Unorm,
    };
    /// 8-bit two channel.
    pub const RG8: Self = Self {
        components: 2,
        depth: 8,
        ty: ComponentType::Unorm,
    };
}

/// Texture creation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureParams {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Can be bound as a sampler.
    pub sampleable: bool,
    /// Can be rendered to.
    pub renderable: bool,
}

impl TextureParams {
    /// Sampleable and renderable texture.
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            sampleable: true,
            renderable: true,
        }
    }
}

/// Handle to a texture owned by the GPU collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Device-specific identifier.
    pub id: u64,
    /// Parameters the texture was created with.
    pub params: TextureParams,
}

impl Texture {
    /// Wraps a device texture.
    pub fn new(id: u64, params: TextureParams) -> Self {
        Self { id, params }
    }

    /// Full texture as a rectangle.
    pub fn rect(&self) -> Rect2D {
        Rect2D::from_size(self.params.width, self.params.height)
    }
}

/// GPU resource provider.
pub trait Gpu {
    /// Device limits.
    fn limits(&self) -> &GpuLimits;

    /// GLSL dialect programs must be emitted in.
    fn glsl(&self) -> GlslVersion;

    /// Allocates a texture.
    fn create_texture(&mut self, params: &TextureParams) -> GpuResult<Texture>;

    /// Runs `program` and writes its output into `target` (restricted to
    /// `rect` if given).
    fn dispatch(&mut self, program: &ShaderProgram, target: &Texture, rect: Option<Rect2D>) -> GpuResult<()>;
}

/// Software device holding one flat color per texture.
///
/// ```rust
/// use lumina_shaders::gpu::{Gpu, SoftGpu, TextureFormat, TextureParams};
/// use lumina_shaders::{ShaderProgram, Signature};
///
/// let mut gpu = SoftGpu::new();
/// let src = gpu.upload(TextureParams::new(4, 4, TextureFormat::RGBA8), [0.25, 0.5, 0.75, 1.0]);
/// let dst = gpu.create_texture(&TextureParams::new(4, 4, TextureFormat::RGBA8)).unwrap();
///
/// let mut prog = ShaderProgram::new(Signature::None);
/// prog.sample(&src, src.rect().into()).unwrap();
/// gpu.dispatch(&prog, &dst, None).unwrap();
/// assert_eq!(gpu.read(&dst), Some([0.25, 0.5, 0.75, 1.0]));
/// ```
#[derive(Debug, Clone)]
pub struct SoftGpu {
    limits: GpuLimits,
    glsl: GlslVersion,
    next_id: u64,
    contents: HashMap<u64, [f32; 4]>,
    dispatches: Vec<String>,
}

impl Default for SoftGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftGpu {
    /// Creates a device with default limits and GLSL 4.50.
    pub fn new() -> Self {
        Self::with_limits(GpuLimits::default())
    }

    /// Creates a device with explicit limits.
    pub fn with_limits(limits: GpuLimits) -> Self {
        Self {
            limits,
            glsl: GlslVersion::default(),
            next_id: 1,
            contents: HashMap::new(),
            dispatches: Vec::new(),
        }
    }

    /// Changes the reported GLSL dialect.
    pub fn set_glsl(&mut self, glsl: GlslVersion) {
        self.glsl = glsl;
    }

    /// Creates a texture filled with `color`.
    pub fn upload(&mut self, params: TextureParams, color: [f32; 4]) -> Texture {
        let tex = self.alloc(params);
        self.contents.insert(tex.id, color);
        tex
    }

    /// Current color of a texture.
    pub fn read(&self, tex: &Texture) -> Option<[f32; 4]> {
        self.contents.get(&tex.id).copied()
    }

    /// GLSL of every program dispatched so far.
    pub fn dispatched(&self) -> &[String] {
        &self.dispatches
    }

    fn alloc(&mut self, params: TextureParams) -> Texture {
        let id = self.next_id;
        self.next_id += 1;
        Texture::new(id, params)
    }
}

impl Gpu for SoftGpu {
    fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    fn glsl(&self) -> GlslVersion {
        self.glsl
    }

    fn create_texture(&mut self, params: &TextureParams) -> GpuResult<Texture> {
        if params.width == 0 || params.height == 0 {
            return Err(GpuError::AllocationFailed {
                width: params.width,
                height: params.height,
            });
        }
        if !self.limits.fits_texture(params.width, params.height) {
            return Err(GpuError::ImageTooLarge {
                width: params.width,
                height: params.height,
                max: self.limits.max_tex_2d_dim,
            });
        }

        let tex = self.alloc(*params);
        trace!(id = tex.id, width = params.width, height = params.height, "create_texture");
        self.contents.insert(tex.id, [0.0; 4]);
        Ok(tex)
    }

    fn dispatch(&mut self, program: &ShaderProgram, target: &Texture, rect: Option<Rect2D>) -> GpuResult<()> {
        if !target.params.renderable {
            return Err(GpuError::DispatchFailed(format!("texture {} is not renderable", target.id)));
        }
        if program.input() != Signature::None || program.output() != Signature::Color {
            return Err(GpuError::DispatchFailed(format!(
                "cannot dispatch a {:?} -> {:?} program",
                program.input(),
                program.output()
            )));
        }

        let mut eval = Evaluator::new(program);
        for binding in program.textures() {
            let color = self
                .read(&binding.texture)
                .ok_or_else(|| GpuError::DispatchFailed(format!("unknown texture {}", binding.texture.id)))?;
            eval = eval.with_texture(&binding.ident, color);
        }

        let out = eval
            .run([0.0, 0.0, 0.0, 1.0])
            .map_err(|e| GpuError::DispatchFailed(e.to_string()))?;

        debug!(target = target.id, ?rect, vars = program.vars().len(), "dispatch");
        self.dispatches.push(program.glsl(self.glsl));
        self.contents.insert(target.id, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        let limits = GpuLimits {
            max_tex_2d_dim: 4096,
            ..Default::default()
        };
        assert!(limits.fits_texture(4096, 2160));
        assert!(!limits.fits_texture(8192, 2160));
        assert!(limits.supports_compute());

        let no_compute = GpuLimits {
            max_shmem_size: 0,
            ..Default::default()
        };
        assert!(!no_compute.supports_compute());
    }

    #[test]
    fn test_create_texture_rejects_oversize() {
        let mut gpu = SoftGpu::with_limits(GpuLimits {
            max_tex_2d_dim: 256,
            ..Default::default()
        });
        let err = gpu
            .create_texture(&TextureParams::new(512, 16, TextureFormat::RGBA8))
            .unwrap_err();
        assert!(matches!(err, GpuError::ImageTooLarge { max: 256, .. }));
    }

    #[test]
    fn test_dispatch_requires_color() {
        let mut gpu = SoftGpu::new();
        let dst = gpu
            .create_texture(&TextureParams::new(1, 1, TextureFormat::RGBA8))
            .unwrap();
        let prog = ShaderProgram::new(Signature::None);
        assert!(gpu.dispatch(&prog, &dst, None).is_err());
    }
}
