//! Hook invocation.

use super::{Hook, HookParams, HookStage, HookStatus, HookTexture, SaveParams};
use crate::error::{GpuError, HookError, ShaderError};
use crate::gpu::{Gpu, TextureFormat, TextureParams};
use crate::program::{ShaderProgram, Signature};
use lumina_core::{ColorRepr, ColorSpace, Rect2D, Rect2DF};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Passes a single hook may request at one stage before it is cut off.
pub const MAX_PASSES: u32 = 64;

/// Where the working image currently lives.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameImage {
    /// A program that still has to be dispatched.
    Program(ShaderProgram),
    /// A materialized texture.
    Texture(HookTexture),
}

/// Working image plus what is known about its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The image.
    pub image: FrameImage,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Representation of the working value.
    pub repr: ColorRepr,
    /// Color space of the working value.
    pub color: ColorSpace,
    /// Number of meaningful components.
    pub components: u8,
}

impl Frame {
    /// Wraps an in-flight program.
    pub fn from_program(program: ShaderProgram, width: u32, height: u32, repr: ColorRepr, color: ColorSpace, components: u8) -> Self {
        Self {
            image: FrameImage::Program(program),
            width,
            height,
            repr,
            color,
            components,
        }
    }

    /// Wraps a texture; the size is taken from its source rectangle.
    pub fn from_texture(texture: HookTexture, color: ColorSpace, components: u8) -> Self {
        Self {
            width: texture.src_rect.width.round() as u32,
            height: texture.src_rect.height.round() as u32,
            repr: texture.repr,
            image: FrameImage::Texture(texture),
            color,
            components,
        }
    }

    /// The image as a program, sampling the texture first if needed.
    pub fn program_mut(&mut self) -> Result<&mut ShaderProgram, ShaderError> {
        match self.image {
            FrameImage::Program(ref mut prog) => Ok(prog),
            FrameImage::Texture(ref tex) => {
                let mut prog = ShaderProgram::new(Signature::None);
                prog.sample(&tex.texture, tex.src_rect)?;
                self.image = FrameImage::Program(prog);
                self.program_mut()
            }
        }
    }

    /// The image as a texture, dispatching the program first if needed.
    pub fn texture(&mut self, gpu: &mut dyn Gpu) -> Result<HookTexture, GpuError> {
        match &self.image {
            FrameImage::Texture(tex) => Ok(tex.clone()),
            FrameImage::Program(prog) => {
                let hooked = materialize(gpu, prog, self.width, self.height, self.repr)?;
                self.image = FrameImage::Texture(hooked.clone());
                Ok(hooked)
            }
        }
    }
}

/// Dispatches `prog` into a new `width`x`height` texture.
fn materialize(gpu: &mut dyn Gpu, prog: &ShaderProgram, width: u32, height: u32, repr: ColorRepr) -> Result<HookTexture, GpuError> {
    let texture = gpu.create_texture(&TextureParams::new(width, height, TextureFormat::RGBA16F))?;
    gpu.dispatch(prog, &texture, None)?;
    debug!(id = texture.id, width, height, "materialized frame");

    Ok(HookTexture {
        src_rect: texture.rect().into(),
        texture,
        repr,
    })
}

/// A hook error, tagged with where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct HookFailure {
    /// Index of the hook in the list handed to the runner.
    pub hook: usize,
    /// Stage it failed at.
    pub stage: HookStage,
    /// What went wrong.
    pub error: HookError,
}

/// Drives hooks through the stages of one frame at a time.
///
/// Counters, failures and the set of stages run are per frame and cleared
/// by [`HookRunner::begin_frame`].
#[derive(Debug, Default)]
pub struct HookRunner {
    counters: HashMap<(usize, HookStage), u32>,
    failed: HashSet<(usize, HookStage)>,
    failures: Vec<HookFailure>,
    ran: HookStage,
}

impl HookRunner {
    /// Creates a runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a frame: clears per-frame state and resets every hook.
    pub fn begin_frame(&mut self, hooks: &mut [Box<dyn Hook>]) {
        self.counters.clear();
        self.failed.clear();
        self.failures.clear();
        self.ran = HookStage::NONE;
        for hook in hooks.iter_mut() {
            hook.reset();
        }
    }

    /// Union of the stages the hooks want.
    pub fn requested(hooks: &[Box<dyn Hook>]) -> HookStage {
        hooks.iter().fold(HookStage::NONE, |acc, h| acc | h.stages())
    }

    /// Runs every hook registered for `stage` against `frame`.
    ///
    /// A hook returning [`HookStatus::AGAIN`] is re-run on its own result,
    /// at most [`MAX_PASSES`] times. A failing hook, or one whose result
    /// cannot be saved, leaves `frame` as it was before the failing pass and
    /// is skipped at this stage for the rest of the frame.
    pub fn run(
        &mut self,
        hooks: &mut [Box<dyn Hook>],
        stage: HookStage,
        gpu: &mut dyn Gpu,
        frame: &mut Frame,
        src_rect: Rect2DF,
        dst_rect: Rect2D,
    ) {
        trace!(?stage, "hook stage");
        self.ran |= stage;

        for (idx, hook) in hooks.iter_mut().enumerate() {
            if !hook.stages().intersects(stage) || self.failed.contains(&(idx, stage)) {
                continue;
            }

            let mut passes = 0;
            loop {
                if passes == MAX_PASSES {
                    warn!(hook = idx, ?stage, passes, "hook keeps asking for more passes, stopping");
                    break;
                }
                passes += 1;

                match self.invoke(hook.as_mut(), idx, stage, gpu, frame, src_rect, dst_rect) {
                    Ok(status) if status.contains(HookStatus::AGAIN) => {}
                    Ok(_) => break,
                    Err(error) => {
                        warn!(hook = idx, ?stage, %error, "hook failed");
                        self.failed.insert((idx, stage));
                        self.failures.push(HookFailure { hook: idx, stage, error });
                        break;
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn invoke(
        &mut self,
        hook: &mut dyn Hook,
        idx: usize,
        stage: HookStage,
        gpu: &mut dyn Gpu,
        frame: &mut Frame,
        src_rect: Rect2DF,
        dst_rect: Rect2D,
    ) -> Result<HookStatus, HookError> {
        let counter = self.counters.entry((idx, stage)).or_insert(0);
        let count = *counter;
        *counter += 1;

        let (mut program, texture) = match hook.input() {
            Signature::None => (ShaderProgram::new(Signature::None), Some(frame.texture(gpu)?)),
            Signature::Color | Signature::Sampler => (frame.program_mut()?.clone(), None),
        };

        let mut params = HookParams {
            gpu: &mut *gpu,
            stage,
            count,
            program: &mut program,
            texture,
            repr: frame.repr,
            color: frame.color,
            components: frame.components,
            src_rect,
            dst_rect,
        };
        let status = hook.hook(&mut params)?;

        if program.output() != Signature::Color {
            return Err(HookError::failed("hook produced no output"));
        }
        let (w, h) = program.output_size().unwrap_or((frame.width, frame.height));
        if (w, h) != (frame.width, frame.height) && !stage.is_resizable() {
            return Err(HookError::failed(format!(
                "hook resized the image to {w}x{h} at fixed-size stage {stage:?}"
            )));
        }

        // commit only once nothing else can fail
        let image = if status.contains(HookStatus::SAVE) {
            let texture = materialize(gpu, &program, w, h, frame.repr)?;
            hook.save(&SaveParams {
                stage,
                count,
                texture: texture.clone(),
            });
            FrameImage::Texture(texture)
        } else {
            FrameImage::Program(program)
        };
        frame.image = image;
        frame.width = w;
        frame.height = h;
        Ok(status)
    }

    /// Errors collected during the current frame.
    pub fn failures(&self) -> &[HookFailure] {
        &self.failures
    }

    /// Takes the errors collected during the current frame.
    pub fn take_failures(&mut self) -> Vec<HookFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Stages run so far in the current frame.
    pub fn stages_run(&self) -> HookStage {
        self.ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::SoftGpu;
    use crate::ir::{Expr, Stmt};

    struct Scale {
        stage: HookStage,
        passes: u32,
    }

    impl Hook for Scale {
        fn stages(&self) -> HookStage {
            self.stage
        }

        fn input(&self) -> Signature {
            Signature::Color
        }

        fn hook(&mut self, params: &mut HookParams<'_>) -> Result<HookStatus, HookError> {
            params.program.push(Stmt::SetRgb(Expr::rgb() * Expr::splat(0.5)));
            if params.count + 1 < self.passes {
                Ok(HookStatus::AGAIN)
            } else {
                Ok(HookStatus::NONE)
            }
        }
    }

    fn frame(gpu: &mut SoftGpu, color: [f32; 4]) -> Frame {
        let tex = gpu.upload(TextureParams::new(8, 8, TextureFormat::RGBA8), color);
        Frame::from_texture(
            HookTexture {
                src_rect: tex.rect().into(),
                texture: tex,
                repr: ColorRepr::RGB,
            },
            ColorSpace::SRGB,
            4,
        )
    }

    fn eval(frame: &mut Frame, gpu: &SoftGpu) -> [f32; 4] {
        match &frame.image {
            FrameImage::Program(p) => {
                let tex = &p.textures()[0];
                let color = gpu.read(&tex.texture).unwrap();
                crate::eval::Evaluator::new(p)
                    .with_texture(&tex.ident, color)
                    .run([0.0, 0.0, 0.0, 1.0])
                    .unwrap()
            }
            FrameImage::Texture(t) => gpu.read(&t.texture).unwrap(),
        }
    }

    #[test]
    fn test_program_mut_samples_texture() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [0.2, 0.4, 0.6, 1.0]);
        let prog = f.program_mut().unwrap();
        assert_eq!(prog.output(), Signature::Color);
        assert_eq!(prog.output_size(), Some((8, 8)));
        assert_eq!(eval(&mut f, &gpu), [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn test_texture_dispatches_program() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [0.2, 0.4, 0.6, 1.0]);
        f.program_mut().unwrap().push(Stmt::SetRgb(Expr::rgb() * Expr::splat(2.0)));
        let tex = f.texture(&mut gpu).unwrap();
        assert_eq!(tex.texture.params.format, TextureFormat::RGBA16F);
        assert_eq!(gpu.read(&tex.texture), Some([0.4, 0.8, 1.2, 1.0]));
        assert!(matches!(f.image, FrameImage::Texture(_)));
    }

    #[test]
    fn test_again_reinvokes_with_counter() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [0.8, 0.8, 0.8, 1.0]);
        let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Scale {
            stage: HookStage::RGB,
            passes: 3,
        })];

        let mut runner = HookRunner::new();
        runner.begin_frame(&mut hooks);
        runner.run(&mut hooks, HookStage::RGB, &mut gpu, &mut f, Rect2DF::default(), Rect2D::default());
        assert!(runner.failures().is_empty());
        assert_eq!(runner.stages_run(), HookStage::RGB);
        approx::assert_abs_diff_eq!(eval(&mut f, &gpu)[0], 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_runaway_hook_is_capped() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [1.0, 1.0, 1.0, 1.0]);
        let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Scale {
            stage: HookStage::OUTPUT,
            passes: u32::MAX,
        })];

        let mut runner = HookRunner::new();
        runner.begin_frame(&mut hooks);
        runner.run(&mut hooks, HookStage::OUTPUT, &mut gpu, &mut f, Rect2DF::default(), Rect2D::default());
        match &f.image {
            FrameImage::Program(p) => assert_eq!(p.body().len(), 1 + MAX_PASSES as usize),
            FrameImage::Texture(_) => panic!("expected a program"),
        }
    }

    struct SaveLarger;

    impl Hook for SaveLarger {
        fn stages(&self) -> HookStage {
            HookStage::RGB
        }

        fn input(&self) -> Signature {
            Signature::None
        }

        fn hook(&mut self, params: &mut HookParams<'_>) -> Result<HookStatus, HookError> {
            let tex = params.texture.clone().ok_or_else(|| HookError::failed("no texture"))?;
            params.program.sample(&tex.texture, Rect2DF::new(0.0, 0.0, 32.0, 32.0))?;
            Ok(HookStatus::SAVE)
        }
    }

    #[test]
    fn test_failed_save_leaves_frame_untouched() {
        let mut gpu = SoftGpu::with_limits(crate::gpu::GpuLimits {
            max_tex_2d_dim: 16,
            ..Default::default()
        });
        let mut f = frame(&mut gpu, [0.5, 0.5, 0.5, 1.0]);
        let before = f.clone();
        let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(SaveLarger)];

        let mut runner = HookRunner::new();
        runner.begin_frame(&mut hooks);
        runner.run(&mut hooks, HookStage::RGB, &mut gpu, &mut f, Rect2DF::default(), Rect2D::default());

        assert_eq!(runner.failures().len(), 1);
        assert!(matches!(runner.failures()[0].error, HookError::Gpu(GpuError::ImageTooLarge { .. })));
        assert_eq!(f, before);
    }

    #[test]
    fn test_program_mut_keeps_program() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [0.2, 0.4, 0.6, 1.0]);
        f.program_mut().unwrap().push(Stmt::SetChannel(crate::ir::Channel::R, Expr::float(1.0)));
        let prog = f.program_mut().unwrap();
        assert_eq!(prog.body().len(), 2);
        assert_eq!(eval(&mut f, &gpu), [1.0, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn test_unmatched_stage_skips_hook() {
        let mut gpu = SoftGpu::new();
        let mut f = frame(&mut gpu, [1.0, 1.0, 1.0, 1.0]);
        let before = f.clone();
        let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Scale {
            stage: HookStage::OUTPUT,
            passes: 1,
        })];

        let mut runner = HookRunner::new();
        runner.run(&mut hooks, HookStage::LINEAR, &mut gpu, &mut f, Rect2DF::default(), Rect2D::default());
        assert_eq!(f, before);
        assert_eq!(HookRunner::requested(&hooks), HookStage::OUTPUT);
    }
}
