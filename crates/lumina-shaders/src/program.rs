//! The shader program being assembled.
//!
//! A [`ShaderProgram`] is a typed accumulator: every stage checks the
//! program's current output [`Signature`] with [`ShaderProgram::require`]
//! before appending to it, binds whatever constants it needs into the
//! append-only symbol table, and pushes statements onto the body.

use crate::error::{Result, ShaderError};
use crate::eval::Evaluator;
use crate::glsl::{self, GlslVersion};
use crate::gpu::Texture;
use crate::ir::{Channel, ConstValue, Expr, Ident, Stmt};
use lumina_core::Rect2DF;
use tracing::error;

/// Type of the value a program produces (or consumes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signature {
    /// Nothing yet; the next stage has to sample something.
    #[default]
    None,
    /// An RGBA working value in `color`.
    Color,
    /// Raw texture sample. Input only: the program is a sampling function
    /// and begins with the sample already in `color`.
    Sampler,
}

/// A texture referenced by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    /// Sampler identifier.
    pub ident: Ident,
    /// Identifier of the `vec4` holding the normalized source rectangle
    /// (offset in `xy`, size in `zw`).
    pub rect_ident: Ident,
    /// The texture itself.
    pub texture: Texture,
    /// Source rectangle in texels.
    pub rect: Rect2DF,
}

/// Helper function `float name(float x) { return body; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperFn {
    /// Function identifier.
    pub ident: Ident,
    /// Body, with [`Expr::Param`] standing for `x`.
    pub body: Expr,
}

/// A shader program under construction.
///
/// ```rust
/// use lumina_shaders::{ShaderProgram, Signature};
/// use lumina_shaders::ir::{Expr, Stmt};
///
/// let mut prog = ShaderProgram::new(Signature::Color);
/// prog.require(Signature::Color, 0, 0).unwrap();
/// prog.push(Stmt::SetRgb(Expr::rgb() * Expr::splat(0.5)));
///
/// let out = prog.eval([1.0, 0.5, 0.25, 1.0]).unwrap();
/// assert_eq!(out, [0.5, 0.25, 0.125, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    name: Ident,
    input: Signature,
    output: Signature,
    size: Option<(u32, u32)>,
    fresh: u32,
    vars: Vec<(Ident, ConstValue)>,
    textures: Vec<TextureBinding>,
    functions: Vec<HelperFn>,
    body: Vec<Stmt>,
}

impl ShaderProgram {
    /// Creates an empty program taking `input`.
    pub fn new(input: Signature) -> Self {
        let output = match input {
            Signature::None => Signature::None,
            Signature::Color | Signature::Sampler => Signature::Color,
        };
        Self {
            name: Ident::new("main".to_string()),
            input,
            output,
            size: None,
            fresh: 0,
            vars: Vec::new(),
            textures: Vec::new(),
            functions: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Checks that the program currently outputs `sig` and, if non-zero,
    /// that its output size is compatible with `w`x`h`.
    ///
    /// On success the output becomes [`Signature::Color`] and the size is
    /// fixed. On failure the program is left untouched.
    pub fn require(&mut self, sig: Signature, w: u32, h: u32) -> Result<()> {
        if self.output != sig {
            error!(expected = ?sig, found = ?self.output, "illegal sequence of shader operations");
            return Err(ShaderError::ContractViolation {
                expected: sig,
                found: self.output,
            });
        }

        let (cur_w, cur_h) = self.size.unwrap_or((0, 0));
        let w = if w == 0 { cur_w } else { w };
        let h = if h == 0 { cur_h } else { h };
        if (cur_w != 0 && cur_w != w) || (cur_h != 0 && cur_h != h) {
            error!(requested_w = w, requested_h = h, cur_w, cur_h, "incompatible shader output size");
            return Err(ShaderError::SizeMismatch {
                requested: (w, h),
                current: (cur_w, cur_h),
            });
        }

        if w != 0 || h != 0 {
            self.size = Some((w, h));
        }
        self.output = Signature::Color;
        Ok(())
    }

    /// Generates a unique identifier `<name>_<n>`.
    pub fn fresh(&mut self, name: &str) -> Ident {
        self.fresh += 1;
        Ident::new(format!("{name}_{}", self.fresh))
    }

    /// Binds a constant and returns its identifier.
    pub fn bind(&mut self, name: &str, value: ConstValue) -> Ident {
        let id = self.fresh(name);
        self.vars.push((id.clone(), value));
        id
    }

    /// Binds a texture and the normalized `rect` it is read from.
    pub fn bind_texture(&mut self, name: &str, texture: &Texture, rect: Rect2DF) -> Ident {
        let ident = self.fresh(name);
        let w = texture.params.width.max(1) as f32;
        let h = texture.params.height.max(1) as f32;
        let rect_ident = self.bind(
            &format!("{name}_rect"),
            ConstValue::Vec4([rect.x / w, rect.y / h, rect.width / w, rect.height / h]),
        );
        self.textures.push(TextureBinding {
            ident: ident.clone(),
            rect_ident,
            texture: texture.clone(),
            rect,
        });
        ident
    }

    /// Defines a `float -> float` helper function.
    pub fn define(&mut self, name: &str, body: Expr) -> Ident {
        let ident = self.fresh(name);
        self.functions.push(HelperFn {
            ident: ident.clone(),
            body,
        });
        ident
    }

    /// Appends a statement.
    pub fn push(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }

    /// Appends several statements.
    pub fn extend(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        self.body.extend(stmts);
    }

    /// Samples `texture` over `rect` straight into `color`.
    ///
    /// Requires [`Signature::None`]; the program outputs
    /// [`Signature::Color`] afterwards.
    pub fn sample(&mut self, texture: &Texture, rect: Rect2DF) -> Result<()> {
        self.require(Signature::None, rect.width as u32, rect.height as u32)?;
        let tex = self.bind_texture("src_tex", texture, rect);
        self.push(Stmt::Sample {
            texture: tex,
            mapping: Channel::ALL.map(Some),
        });
        Ok(())
    }

    /// Entry point identifier.
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// Signature the program was created with.
    pub fn input(&self) -> Signature {
        self.input
    }

    /// Signature the program currently produces.
    pub fn output(&self) -> Signature {
        self.output
    }

    /// Output size, if any stage fixed one.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Bound constants, in bind order.
    pub fn vars(&self) -> &[(Ident, ConstValue)] {
        &self.vars
    }

    /// Looks up a bound constant.
    pub fn var(&self, ident: &Ident) -> Option<&ConstValue> {
        self.vars.iter().find(|(id, _)| id == ident).map(|(_, v)| v)
    }

    /// Bound textures, in bind order.
    pub fn textures(&self) -> &[TextureBinding] {
        &self.textures
    }

    /// Helper functions.
    pub fn functions(&self) -> &[HelperFn] {
        &self.functions
    }

    /// Program body.
    pub fn body(&self) -> &[Stmt] {
        &self.body
    }

    /// Whether no statements were appended.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Emits GLSL source.
    pub fn glsl(&self, version: GlslVersion) -> String {
        glsl::emit(self, version)
    }

    /// Evaluates the program for one pixel on the CPU.
    pub fn eval(&self, color: [f32; 4]) -> std::result::Result<[f32; 4], crate::EvalError> {
        Evaluator::new(self).run(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{TextureFormat, TextureParams};

    #[test]
    fn test_require_transitions_to_color() {
        let mut prog = ShaderProgram::new(Signature::None);
        assert_eq!(prog.output(), Signature::None);
        assert!(prog.require(Signature::Color, 0, 0).is_err());
        prog.require(Signature::None, 0, 0).unwrap();
        assert_eq!(prog.output(), Signature::Color);
    }

    #[test]
    fn test_contract_violation_leaves_program() {
        let mut prog = ShaderProgram::new(Signature::Color);
        prog.push(Stmt::comment("x"));
        let before = prog.clone();
        let err = prog.require(Signature::None, 16, 16).unwrap_err();
        assert_eq!(
            err,
            ShaderError::ContractViolation {
                expected: Signature::None,
                found: Signature::Color
            }
        );
        assert_eq!(prog, before);
    }

    #[test]
    fn test_size_mismatch() {
        let mut prog = ShaderProgram::new(Signature::Color);
        prog.require(Signature::Color, 64, 32).unwrap();
        prog.require(Signature::Color, 0, 0).unwrap();
        prog.require(Signature::Color, 64, 0).unwrap();
        let err = prog.require(Signature::Color, 32, 32).unwrap_err();
        assert!(matches!(err, ShaderError::SizeMismatch { .. }));
        assert_eq!(prog.output_size(), Some((64, 32)));
    }

    #[test]
    fn test_fresh_identifiers_unique() {
        let mut prog = ShaderProgram::new(Signature::Color);
        let a = prog.bind("cmat", ConstValue::Float(1.0));
        let b = prog.bind("cmat", ConstValue::Float(2.0));
        assert_ne!(a, b);
        assert_eq!(prog.vars().len(), 2);
        assert_eq!(prog.var(&b), Some(&ConstValue::Float(2.0)));
    }

    #[test]
    fn test_sample_binds_rect() {
        let tex = Texture::new(
            7,
            TextureParams::new(100, 50, TextureFormat::RGBA16F),
        );
        let mut prog = ShaderProgram::new(Signature::None);
        prog.sample(&tex, Rect2DF::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert_eq!(prog.output(), Signature::Color);
        assert_eq!(prog.output_size(), Some((100, 50)));
        let binding = &prog.textures()[0];
        assert_eq!(prog.var(&binding.rect_ident), Some(&ConstValue::Vec4([0.0, 0.0, 1.0, 1.0])));
    }
}
