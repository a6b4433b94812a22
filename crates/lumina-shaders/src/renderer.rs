//! Full render pass from source planes to a target texture.
//!
//! [`Renderer::render_image`] assembles one program per frame:
//!
//! ```text
//! planes --input hooks--> merge --NATIVE--> decode --RGB, RGB_OVERLAY-->
//!   [linearize --LINEAR-->] --PREKERNEL--> scaler --POSTKERNEL, SCALED-->
//!   color map --OUTPUT--> dispatch into target
//! ```
//!
//! Scaling itself belongs to the GPU collaborator and is a pass-through
//! here; CHROMA_SCALED, ALPHA_SCALED and SIGMOID never fire and show up in
//! [`RenderReport::skipped`] when a hook asks for them.

use crate::colorspace::{color_map, decode_color, linearize, resolve_destination};
use crate::config::RenderParams;
use crate::custom::{Frame, Hook, HookFailure, HookRunner, HookStage, HookTexture};
use crate::error::RenderError;
use crate::gpu::{Gpu, Texture};
use crate::ir::{Channel, Expr, Stmt};
use crate::program::{ShaderProgram, Signature};
use lumina_core::{ColorRepr, ColorSpace, ColorSystem, ColorTransfer, Rect2D, Rect2DF};
use tracing::{debug, trace};

/// One texture of a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Texture holding the plane.
    pub texture: Texture,
    /// Number of components read from the texture.
    pub components: usize,
    /// Channel each component lands in; `None` drops it.
    pub component_mapping: [Option<Channel>; 4],
    /// Horizontal offset relative to the image, in plane texels.
    pub shift_x: f32,
    /// Vertical offset relative to the image, in plane texels.
    pub shift_y: f32,
}

impl Plane {
    /// Plane whose components map to `channels` in order.
    pub fn new(texture: Texture, channels: &[Channel]) -> Self {
        let mut component_mapping = [None; 4];
        for (slot, c) in component_mapping.iter_mut().zip(channels) {
            *slot = Some(*c);
        }
        Self {
            texture,
            components: channels.len().min(4),
            component_mapping,
            shift_x: 0.0,
            shift_y: 0.0,
        }
    }

    /// Sets the chroma siting offset.
    pub fn with_shift(mut self, shift_x: f32, shift_y: f32) -> Self {
        self.shift_x = shift_x;
        self.shift_y = shift_y;
        self
    }

    /// Channels this plane writes.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.component_mapping[..self.components].iter().flatten().copied()
    }

    /// Input stage this plane is hooked at.
    ///
    /// For YCbCr-like systems the R, G and B channels carry Y, Cb and Cr.
    pub fn stage(&self, sys: ColorSystem) -> HookStage {
        if sys == ColorSystem::Xyz {
            return HookStage::XYZ_INPUT;
        }
        let has = |c: Channel| self.channels().any(|x| x == c);
        if sys.is_ycbcr_like() {
            if has(Channel::R) {
                HookStage::LUMA_INPUT
            } else if has(Channel::G) || has(Channel::B) {
                HookStage::CHROMA_INPUT
            } else {
                HookStage::ALPHA_INPUT
            }
        } else if has(Channel::R) || has(Channel::G) || has(Channel::B) {
            HookStage::RGB_INPUT
        } else {
            HookStage::ALPHA_INPUT
        }
    }
}

/// A source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Planes, in any order.
    pub planes: Vec<Plane>,
    /// How the samples are encoded.
    pub repr: ColorRepr,
    /// Color space of the content.
    pub color: ColorSpace,
    /// Nominal width in pixels.
    pub width: u32,
    /// Nominal height in pixels.
    pub height: u32,
    /// Source crop; the whole image if `None`.
    pub src_rect: Option<Rect2DF>,
}

/// Where the image is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    /// Renderable texture.
    pub texture: Texture,
    /// Destination crop; the whole texture if `None`.
    pub dst_rect: Option<Rect2D>,
    /// Color space the texture expects.
    pub color: ColorSpace,
}

/// Outcome of a successful render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Hooks that failed, in the order they failed.
    pub failures: Vec<HookFailure>,
    /// Stages the pipeline passed through.
    pub stages_run: HookStage,
    /// Stages some hook asked for that never ran.
    pub skipped: HookStage,
}

#[derive(Clone, Copy)]
struct Crops {
    src: Rect2DF,
    dst: Rect2D,
}

/// Drives decoding, color mapping and hooks for one GPU.
///
/// ```rust
/// use lumina_core::{ColorRepr, ColorSpace};
/// use lumina_shaders::gpu::{Gpu, SoftGpu, TextureFormat, TextureParams};
/// use lumina_shaders::ir::Channel;
/// use lumina_shaders::{Image, Plane, RenderParams, RenderTarget, Renderer};
///
/// let mut gpu = SoftGpu::new();
/// let tex = gpu.upload(TextureParams::new(16, 16, TextureFormat::RGBA8), [0.5, 0.5, 0.5, 1.0]);
/// let out = gpu.create_texture(&TextureParams::new(16, 16, TextureFormat::RGBA8)).unwrap();
///
/// let image = Image {
///     planes: vec![Plane::new(tex, &[Channel::R, Channel::G, Channel::B])],
///     repr: ColorRepr::RGB,
///     color: ColorSpace::SRGB,
///     width: 16,
///     height: 16,
///     src_rect: None,
/// };
/// let target = RenderTarget { texture: out.clone(), dst_rect: None, color: ColorSpace::SRGB };
///
/// let mut renderer = Renderer::new(gpu);
/// let report = renderer.render_image(&image, &target, &RenderParams::default(), &mut []).unwrap();
/// assert!(report.failures.is_empty());
/// let px = renderer.gpu().read(&out).unwrap();
/// assert!((px[0] - 0.5).abs() < 1e-5 && px[3] == 1.0);
/// ```
#[derive(Debug)]
pub struct Renderer<G: Gpu> {
    gpu: G,
    runner: HookRunner,
}

impl<G: Gpu> Renderer<G> {
    /// Creates a renderer on top of `gpu`.
    pub fn new(gpu: G) -> Self {
        Self {
            gpu,
            runner: HookRunner::new(),
        }
    }

    /// The GPU collaborator.
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    /// The GPU collaborator, mutably.
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// Gives the GPU collaborator back.
    pub fn into_gpu(self) -> G {
        self.gpu
    }

    /// Renders `image` into `target`.
    ///
    /// Hook failures do not abort the frame; they are listed in the
    /// returned report. Errors from the fixed stages or the GPU do.
    pub fn render_image(
        &mut self,
        image: &Image,
        target: &RenderTarget,
        params: &RenderParams,
        hooks: &mut [Box<dyn Hook>],
    ) -> Result<RenderReport, RenderError> {
        if image.planes.is_empty() {
            return Err(RenderError::NoPlanes);
        }
        let max = self.gpu.limits().max_tex_2d_dim;
        if image.width > max || image.height > max {
            return Err(RenderError::ImageTooLarge {
                width: image.width,
                height: image.height,
                max,
            });
        }
        if let Some(p) = image.planes.iter().find(|p| p.components == 0 || p.components > 4) {
            return Err(RenderError::InvalidImage(format!(
                "plane with {} components",
                p.components
            )));
        }

        let full = target.texture.rect();
        let dst = target.dst_rect.unwrap_or(full);
        let crops = Crops {
            src: image
                .src_rect
                .unwrap_or_else(|| Rect2DF::new(0.0, 0.0, image.width as f32, image.height as f32)),
            dst: dst.intersect(&full).ok_or(RenderError::TargetOutOfBounds(dst))?,
        };
        let requested = HookRunner::requested(hooks);
        debug!(
            planes = image.planes.len(),
            sys = ?image.repr.sys,
            src = ?image.color.transfer,
            dst = ?target.color.transfer,
            ?requested,
            "render_image"
        );

        self.runner.begin_frame(hooks);

        let planes = self.hook_planes(image, hooks, crops)?;
        let mut frame = self.merge_planes(image, &planes)?;
        self.hook(hooks, HookStage::NATIVE, &mut frame, crops);

        let mut repr = frame.repr;
        decode_color(frame.program_mut()?, &mut repr, &params.color_adjustment)?;
        frame.repr = repr;
        self.hook(hooks, HookStage::RGB, &mut frame, crops);
        self.hook(hooks, HookStage::RGB_OVERLAY, &mut frame, crops);

        let src_color = frame.color;
        let mut prelinearized = false;
        if requested.contains(HookStage::LINEAR) {
            linearize(frame.program_mut()?, src_color.transfer)?;
            frame.color.transfer = ColorTransfer::Linear;
            prelinearized = true;
            self.hook(hooks, HookStage::LINEAR, &mut frame, crops);
        }

        self.hook(hooks, HookStage::PREKERNEL, &mut frame, crops);
        trace!(width = frame.width, height = frame.height, "main scaler pass-through");
        self.hook(hooks, HookStage::POSTKERNEL, &mut frame, crops);
        self.hook(hooks, HookStage::SCALED, &mut frame, crops);

        color_map(
            frame.program_mut()?,
            &params.color_map,
            &src_color,
            &target.color,
            prelinearized,
        )?;
        frame.color = resolve_destination(&src_color, &target.color);
        self.hook(hooks, HookStage::OUTPUT, &mut frame, crops);

        let prog = frame.program_mut()?;
        self.gpu.dispatch(prog, &target.texture, Some(crops.dst))?;

        let stages_run = self.runner.stages_run();
        let report = RenderReport {
            failures: self.runner.take_failures(),
            stages_run,
            skipped: requested.difference(stages_run),
        };
        debug!(failures = report.failures.len(), skipped = ?report.skipped, "render_image done");
        Ok(report)
    }

    fn hook(&mut self, hooks: &mut [Box<dyn Hook>], stage: HookStage, frame: &mut Frame, crops: Crops) {
        self.runner.run(hooks, stage, &mut self.gpu, frame, crops.src, crops.dst);
    }

    /// Runs the input stage of every plane, materializing hooked planes.
    fn hook_planes(&mut self, image: &Image, hooks: &mut [Box<dyn Hook>], crops: Crops) -> Result<Vec<Plane>, RenderError> {
        let mut planes = Vec::with_capacity(image.planes.len());
        for plane in &image.planes {
            let stage = plane.stage(image.repr.sys);
            let mut frame = Frame::from_texture(
                HookTexture {
                    texture: plane.texture.clone(),
                    src_rect: plane.texture.rect().into(),
                    repr: image.repr,
                },
                image.color,
                plane.components as u8,
            );
            self.hook(hooks, stage, &mut frame, crops);

            let mut plane = plane.clone();
            plane.texture = frame.texture(&mut self.gpu)?.texture;
            planes.push(plane);
        }
        Ok(planes)
    }

    /// Samples every plane into one program at the size of the plane
    /// closest to the image size.
    fn merge_planes(&self, image: &Image, planes: &[Plane]) -> Result<Frame, RenderError> {
        let diff = |p: &Plane| {
            let dw = p.texture.params.width.abs_diff(image.width);
            let dh = p.texture.params.height.abs_diff(image.height);
            (dw.max(dh), p.shift_x.max(p.shift_y))
        };
        let refplane = planes
            .iter()
            .min_by(|a, b| diff(a).partial_cmp(&diff(b)).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or(RenderError::NoPlanes)?;

        let target_w = refplane.texture.params.width;
        let target_h = refplane.texture.params.height;

        let mut prog = ShaderProgram::new(Signature::None);
        prog.require(Signature::None, target_w, target_h)?;
        prog.push(Stmt::comment("read_image"));
        if image.repr.sys.is_ycbcr_like() {
            prog.extend([
                Stmt::SetChannel(Channel::G, Expr::float(0.5)),
                Stmt::SetChannel(Channel::B, Expr::float(0.5)),
            ]);
        }

        let mut has_alpha = false;
        for plane in planes {
            let pw = plane.texture.params.width as f32;
            let ph = plane.texture.params.height as f32;
            let rx = target_w as f32 / pw;
            let ry = target_h as f32 / ph;
            let sx = plane.shift_x - refplane.shift_x;
            let sy = plane.shift_y - refplane.shift_y;

            let tex = prog.bind_texture("plane", &plane.texture, Rect2DF::new(sx / rx, sy / ry, pw, ph));
            prog.push(Stmt::Sample {
                texture: tex,
                mapping: plane.component_mapping,
            });
            has_alpha |= plane.channels().any(|c| c == Channel::A);
        }

        Ok(Frame::from_program(
            prog,
            target_w,
            target_h,
            image.repr,
            image.color,
            if has_alpha { 4 } else { 3 },
        ))
    }
}
