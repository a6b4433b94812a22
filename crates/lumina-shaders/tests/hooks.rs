//! Hook invocation semantics through the renderer.

use approx::assert_abs_diff_eq;
use lumina_core::{ColorRepr, ColorSpace, ColorTransfer, Rect2D, Rect2DF};
use lumina_shaders::custom::{Hook, HookParams, HookStage, HookStatus, SaveParams};
use lumina_shaders::gpu::{Gpu, SoftGpu, Texture, TextureFormat, TextureParams};
use lumina_shaders::ir::{Channel, Expr, Stmt};
use lumina_shaders::{HookError, Image, Plane, RenderParams, RenderTarget, Renderer, Signature};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<(HookStage, u32)>>>;

struct FnHook<F> {
    stages: HookStage,
    input: Signature,
    calls: Calls,
    resets: Rc<Cell<u32>>,
    saved: Rc<RefCell<Vec<SaveParams>>>,
    f: F,
}

impl<F> Hook for FnHook<F>
where
    F: FnMut(&mut HookParams<'_>) -> Result<HookStatus, HookError>,
{
    fn stages(&self) -> HookStage {
        self.stages
    }

    fn input(&self) -> Signature {
        self.input
    }

    fn reset(&mut self) {
        self.resets.set(self.resets.get() + 1);
    }

    fn hook(&mut self, params: &mut HookParams<'_>) -> Result<HookStatus, HookError> {
        self.calls.borrow_mut().push((params.stage, params.count));
        (self.f)(params)
    }

    fn save(&mut self, params: &SaveParams) {
        self.saved.borrow_mut().push(params.clone());
    }
}

fn fn_hook<F>(stages: HookStage, input: Signature, f: F) -> FnHook<F>
where
    F: FnMut(&mut HookParams<'_>) -> Result<HookStatus, HookError>,
{
    FnHook {
        stages,
        input,
        calls: Calls::default(),
        resets: Rc::default(),
        saved: Rc::default(),
        f,
    }
}

fn halve(params: &mut HookParams<'_>) {
    params.program.push(Stmt::SetRgb(Expr::rgb() * Expr::splat(0.5)));
}

struct Setup {
    renderer: Renderer<SoftGpu>,
    image: Image,
    target: RenderTarget,
}

impl Setup {
    fn new(color: [f32; 4]) -> Self {
        let mut gpu = SoftGpu::new();
        let tex = gpu.upload(TextureParams::new(16, 16, TextureFormat::RGBA8), color);
        let out = gpu
            .create_texture(&TextureParams::new(16, 16, TextureFormat::RGBA8))
            .unwrap();
        Self {
            renderer: Renderer::new(gpu),
            image: Image {
                planes: vec![Plane::new(tex, &[Channel::R, Channel::G, Channel::B])],
                repr: ColorRepr::RGB,
                color: ColorSpace::SRGB,
                width: 16,
                height: 16,
                src_rect: None,
            },
            target: RenderTarget {
                texture: out,
                dst_rect: None,
                color: ColorSpace::SRGB,
            },
        }
    }

    fn render(&mut self, hooks: &mut [Box<dyn Hook>]) -> lumina_shaders::RenderReport {
        self.renderer
            .render_image(&self.image, &self.target, &RenderParams::default(), hooks)
            .unwrap()
    }

    fn output(&self) -> [f32; 4] {
        self.read(&self.target.texture)
    }

    fn read(&self, tex: &Texture) -> [f32; 4] {
        self.renderer.gpu().read(tex).unwrap()
    }
}

#[test]
fn test_again_invokes_twice_with_counter() {
    let mut setup = Setup::new([0.8, 0.8, 0.8, 1.0]);
    let hook = fn_hook(HookStage::RGB, Signature::Color, |p| {
        halve(p);
        Ok(if p.count == 0 { HookStatus::AGAIN } else { HookStatus::NONE })
    });
    let calls = hook.calls.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert!(report.failures.is_empty());
    assert_eq!(*calls.borrow(), vec![(HookStage::RGB, 0), (HookStage::RGB, 1)]);
    assert_abs_diff_eq!(setup.output()[0], 0.2, epsilon = 1e-4);
}

#[test]
fn test_counter_resets_per_frame() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::OUTPUT, Signature::Color, |_| Ok(HookStatus::NONE));
    let calls = hook.calls.clone();
    let resets = hook.resets.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    setup.render(&mut hooks);
    setup.render(&mut hooks);
    assert_eq!(resets.get(), 2);
    assert_eq!(*calls.borrow(), vec![(HookStage::OUTPUT, 0), (HookStage::OUTPUT, 0)]);
}

#[test]
fn test_failure_is_local_to_stage() {
    let mut setup = Setup::new([0.6, 0.6, 0.6, 1.0]);
    let failing = fn_hook(HookStage::RGB | HookStage::OUTPUT, Signature::Color, |p| {
        if p.stage == HookStage::RGB {
            halve(p);
            return Err(HookError::failed("boom"));
        }
        Ok(HookStatus::NONE)
    });
    let other = fn_hook(HookStage::RGB, Signature::Color, |_| Ok(HookStatus::NONE));
    let failing_calls = failing.calls.clone();
    let other_calls = other.calls.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(failing), Box::new(other)];

    let report = setup.render(&mut hooks);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].hook, 0);
    assert_eq!(report.failures[0].stage, HookStage::RGB);
    assert_eq!(report.failures[0].error, HookError::failed("boom"));

    assert_eq!(*failing_calls.borrow(), vec![(HookStage::RGB, 0), (HookStage::OUTPUT, 0)]);
    assert_eq!(*other_calls.borrow(), vec![(HookStage::RGB, 0)]);

    // the failed pass left no trace in the image
    assert_abs_diff_eq!(setup.output()[0], 0.6, epsilon = 1e-4);
}

#[test]
fn test_failure_halts_again_loop() {
    let mut setup = Setup::new([0.8, 0.8, 0.8, 1.0]);
    let hook = fn_hook(HookStage::SCALED, Signature::Color, |p| {
        halve(p);
        match p.count {
            0 => Ok(HookStatus::AGAIN),
            _ => Err(HookError::failed("second pass")),
        }
    });
    let calls = hook.calls.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(calls.borrow().len(), 2);
    // first pass kept, second rolled back
    assert_abs_diff_eq!(setup.output()[0], 0.4, epsilon = 1e-4);
}

#[test]
fn test_save_hands_over_texture() {
    let mut setup = Setup::new([0.8, 0.4, 0.2, 1.0]);
    let hook = fn_hook(HookStage::POSTKERNEL, Signature::Color, |p| {
        halve(p);
        Ok(HookStatus::SAVE)
    });
    let saved = hook.saved.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    setup.render(&mut hooks);
    let saved = saved.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].stage, HookStage::POSTKERNEL);
    assert_eq!(saved[0].count, 0);
    assert_eq!(saved[0].texture.texture.params.width, 16);

    let kept = setup.read(&saved[0].texture.texture);
    assert_abs_diff_eq!(kept[0], 0.4, epsilon = 1e-4);
    assert_abs_diff_eq!(kept[1], 0.2, epsilon = 1e-4);
    assert_abs_diff_eq!(setup.output()[0], 0.4, epsilon = 1e-4);
}

#[test]
fn test_texture_input_hook_samples_itself() {
    let mut setup = Setup::new([0.3, 0.6, 0.9, 1.0]);
    let hook = fn_hook(HookStage::NATIVE, Signature::None, |p| {
        let tex = p.texture.clone().ok_or_else(|| HookError::failed("no texture"))?;
        assert_eq!(p.program.output(), Signature::None);
        p.program.sample(&tex.texture, tex.src_rect)?;
        p.program.push(Stmt::SetChannel(Channel::R, Expr::float(0.0)));
        Ok(HookStatus::NONE)
    });
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert!(report.failures.is_empty());
    let px = setup.output();
    assert_abs_diff_eq!(px[0], 0.0, epsilon = 1e-5);
    assert_abs_diff_eq!(px[1], 0.6, epsilon = 1e-4);
    assert_abs_diff_eq!(px[2], 0.9, epsilon = 1e-4);
}

#[test]
fn test_texture_hook_without_output_fails() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::RGB, Signature::None, |_| Ok(HookStatus::NONE));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert_eq!(report.failures.len(), 1);
    assert_abs_diff_eq!(setup.output()[0], 0.5, epsilon = 1e-4);
}

#[test]
fn test_fixed_stage_rejects_resize() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::OUTPUT, Signature::None, |p| {
        let tex = p.texture.clone().ok_or_else(|| HookError::failed("no texture"))?;
        p.program.sample(&tex.texture, Rect2DF::new(0.0, 0.0, 8.0, 8.0))?;
        Ok(HookStatus::NONE)
    });
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, HookStage::OUTPUT);
}

#[test]
fn test_input_plane_hook() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::RGB_INPUT, Signature::Color, |p| {
        assert_eq!(p.components, 3);
        halve(p);
        Ok(HookStatus::NONE)
    });
    let calls = hook.calls.clone();
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert!(report.failures.is_empty());
    assert_eq!(*calls.borrow(), vec![(HookStage::RGB_INPUT, 0)]);
    assert_abs_diff_eq!(setup.output()[0], 0.25, epsilon = 1e-3);
}

#[test]
fn test_linear_hook_linearizes() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::LINEAR, Signature::Color, |p| {
        assert_eq!(p.color.transfer, ColorTransfer::Linear);
        Ok(HookStatus::NONE)
    });
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_by_hook = seen.clone();
    let later = fn_hook(HookStage::SCALED | HookStage::OUTPUT, Signature::Color, move |p| {
        seen_by_hook.borrow_mut().push((p.stage, p.color.transfer));
        Ok(HookStatus::NONE)
    });
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook), Box::new(later)];

    let report = setup.render(&mut hooks);
    assert!(report.stages_run.contains(HookStage::LINEAR));
    let glsl = setup.renderer.gpu().dispatched().last().unwrap();
    assert!(glsl.contains("// linearize"));
    assert!(glsl.contains("// delinearize"));
    assert_abs_diff_eq!(setup.output()[0], 0.5, epsilon = 1e-3);
    assert_eq!(
        *seen.borrow(),
        vec![
            (HookStage::SCALED, ColorTransfer::Linear),
            (HookStage::OUTPUT, ColorTransfer::Srgb),
        ]
    );
}

#[test]
fn test_destination_rect_is_clipped_to_target() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    setup.target.dst_rect = Some(Rect2D::new(8, -4, 16, 16));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_by_hook = seen.clone();
    let hook = fn_hook(HookStage::OUTPUT, Signature::Color, move |p| {
        seen_by_hook.borrow_mut().push(p.dst_rect);
        Ok(HookStatus::NONE)
    });
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert!(report.failures.is_empty());
    assert_eq!(*seen.borrow(), vec![Rect2D::new(8, 0, 8, 12)]);
}

#[test]
fn test_unreachable_stages_are_reported() {
    let mut setup = Setup::new([0.5, 0.5, 0.5, 1.0]);
    let hook = fn_hook(HookStage::SIGMOID | HookStage::OUTPUT, Signature::Color, |_| Ok(HookStatus::NONE));
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(hook)];

    let report = setup.render(&mut hooks);
    assert_eq!(report.skipped, HookStage::SIGMOID);
}
