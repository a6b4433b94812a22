//! CPU interpreter for shader programs.
//!
//! Runs a [`ShaderProgram`] for a single pixel in `f32`, with the same
//! semantics the emitted GLSL has. Textures are modelled as flat colors
//! bound with [`Evaluator::with_texture`].

use crate::error::EvalError;
use crate::ir::{BinaryOp, CmpOp, ConstValue, Expr, Ident, Stmt, UnaryOp};
use crate::program::{ShaderProgram, Signature};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, EvalError>;

/// Runtime value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec3`
    Vec3([f32; 3]),
    /// `vec4`
    Vec4([f32; 4]),
    /// `mat3`, row-major
    Mat3([[f32; 3]; 3]),
    /// `bool`
    Bool(bool),
    /// `bvec3`
    BVec3([bool; 3]),
}

impl From<ConstValue> for Value {
    fn from(v: ConstValue) -> Self {
        match v {
            ConstValue::Float(f) => Value::Float(f),
            ConstValue::Vec2(v) => Value::Vec2(v),
            ConstValue::Vec3(v) => Value::Vec3(v),
            ConstValue::Vec4(v) => Value::Vec4(v),
            ConstValue::Mat3(m) => Value::Mat3(m.m),
        }
    }
}

impl Value {
    fn as_float(self, op: &'static str) -> Result<f32> {
        match self {
            Value::Float(f) => Ok(f),
            _ => Err(EvalError::TypeMismatch { op }),
        }
    }

    fn as_vec3(self, op: &'static str) -> Result<[f32; 3]> {
        match self {
            Value::Vec3(v) => Ok(v),
            Value::Float(f) => Ok([f; 3]),
            _ => Err(EvalError::TypeMismatch { op }),
        }
    }

    fn as_bool(self, op: &'static str) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(b),
            _ => Err(EvalError::TypeMismatch { op }),
        }
    }

    /// Applies `f` per component, broadcasting scalars against vectors.
    fn zip(self, other: Value, op: &'static str, f: impl Fn(f32, f32) -> f32) -> Result<Value> {
        Ok(match (self, other) {
            (Value::Float(a), Value::Float(b)) => Value::Float(f(a, b)),
            (Value::Vec3(_), _) | (_, Value::Vec3(_)) => {
                let (a, b) = (self.as_vec3(op)?, other.as_vec3(op)?);
                Value::Vec3([f(a[0], b[0]), f(a[1], b[1]), f(a[2], b[2])])
            }
            _ => return Err(EvalError::TypeMismatch { op }),
        })
    }

    fn map(self, op: &'static str, f: impl Fn(f32) -> f32) -> Result<Value> {
        Ok(match self {
            Value::Float(a) => Value::Float(f(a)),
            Value::Vec3(v) => Value::Vec3(v.map(f)),
            _ => return Err(EvalError::TypeMismatch { op }),
        })
    }
}

/// Interpreter state for one program.
///
/// ```rust
/// use lumina_shaders::eval::Evaluator;
/// use lumina_shaders::ir::{Expr, Stmt};
/// use lumina_shaders::{ShaderProgram, Signature};
///
/// let mut prog = ShaderProgram::new(Signature::Color);
/// prog.push(Stmt::SetRgb(Expr::rgb().pow(Expr::splat(2.0))));
/// let out = Evaluator::new(&prog).run([0.5, 0.5, 0.5, 1.0]).unwrap();
/// assert_eq!(out[0], 0.25);
/// ```
pub struct Evaluator<'a> {
    prog: &'a ShaderProgram,
    textures: HashMap<Ident, [f32; 4]>,
    scopes: Vec<HashMap<String, f32>>,
    param: Option<f32>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator with no textures bound.
    pub fn new(prog: &'a ShaderProgram) -> Self {
        Self {
            prog,
            textures: HashMap::new(),
            scopes: Vec::new(),
            param: None,
        }
    }

    /// Binds a flat color to a sampled texture.
    pub fn with_texture(mut self, ident: &Ident, color: [f32; 4]) -> Self {
        self.textures.insert(ident.clone(), color);
        self
    }

    /// Runs the program. `input` is the incoming color for
    /// [`Signature::Color`] programs and the sample for
    /// [`Signature::Sampler`]; [`Signature::None`] programs ignore it.
    pub fn run(mut self, input: [f32; 4]) -> Result<[f32; 4]> {
        let mut color = match self.prog.input() {
            Signature::None => [0.0, 0.0, 0.0, 1.0],
            Signature::Color | Signature::Sampler => input,
        };
        self.scopes.clear();
        self.scopes.push(HashMap::new());
        let prog = self.prog;
        self.stmts(prog.body(), &mut color)?;
        Ok(color)
    }

    fn stmts(&mut self, body: &[Stmt], color: &mut [f32; 4]) -> Result<()> {
        for stmt in body {
            self.stmt(stmt, color)?;
        }
        Ok(())
    }

    fn scoped(&mut self, body: &[Stmt], color: &mut [f32; 4]) -> Result<()> {
        self.scopes.push(HashMap::new());
        let res = self.stmts(body, color);
        self.scopes.pop();
        res
    }

    fn stmt(&mut self, stmt: &Stmt, color: &mut [f32; 4]) -> Result<()> {
        match stmt {
            Stmt::Comment(_) => {}
            Stmt::SetRgb(e) => {
                let v = self.expr(e, color)?.as_vec3("color.rgb =")?;
                color[..3].copy_from_slice(&v);
            }
            Stmt::SetChannel(c, e) => {
                color[c.index()] = self.expr(e, color)?.as_float("color.x =")?;
            }
            Stmt::Let { name, value, .. } => {
                let v = self.expr(value, color)?.as_float("let")?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), v);
                }
            }
            Stmt::Assign { name, value } => {
                let v = self.expr(value, color)?.as_float("assign")?;
                let slot = self
                    .scopes
                    .iter_mut()
                    .rev()
                    .find_map(|s| s.get_mut(name))
                    .ok_or_else(|| EvalError::UnknownIdent(name.clone()))?;
                *slot = v;
            }
            Stmt::Sample { texture, mapping } => {
                let sample = *self
                    .textures
                    .get(texture)
                    .ok_or_else(|| EvalError::UnboundTexture(texture.to_string()))?;
                for (i, ch) in mapping.iter().enumerate() {
                    if let Some(ch) = ch {
                        color[ch.index()] = sample[i];
                    }
                }
            }
            Stmt::If { cond, then } => {
                if self.expr(cond, color)?.as_bool("if")? {
                    self.scoped(then, color)?;
                }
            }
            Stmt::Block(body) => self.scoped(body, color)?,
            Stmt::Raw(_) => return Err(EvalError::Opaque),
        }
        Ok(())
    }

    fn expr(&mut self, e: &Expr, color: &[f32; 4]) -> Result<Value> {
        Ok(match e {
            Expr::Float(v) => Value::Float(*v),
            Expr::Splat(a) => Value::Vec3([self.expr(a, color)?.as_float("vec3()")?; 3]),
            Expr::Var(id) => self
                .prog
                .var(id)
                .map(|v| Value::from(*v))
                .ok_or_else(|| EvalError::UnknownIdent(id.to_string()))?,
            Expr::Local(name) => Value::Float(
                self.scopes
                    .iter()
                    .rev()
                    .find_map(|s| s.get(name).copied())
                    .ok_or_else(|| EvalError::UnknownIdent(name.clone()))?,
            ),
            Expr::Param => Value::Float(self.param.ok_or_else(|| EvalError::UnknownIdent("x".into()))?),
            Expr::Color => Value::Vec4(*color),
            Expr::Rgb => Value::Vec3([color[0], color[1], color[2]]),
            Expr::Channel(c) => Value::Float(color[c.index()]),
            Expr::Unary(op, a) => {
                let a = self.expr(a, color)?;
                match op {
                    UnaryOp::Neg => a.map("-", |x| -x)?,
                    UnaryOp::Exp => a.map("exp", f32::exp)?,
                    UnaryOp::Log => a.map("log", f32::ln)?,
                    UnaryOp::Sqrt => a.map("sqrt", f32::sqrt)?,
                }
            }
            Expr::Binary(op, a, b) => {
                let (a, b) = (self.expr(a, color)?, self.expr(b, color)?);
                match (op, a) {
                    (BinaryOp::Mul, Value::Mat3(m)) => {
                        let v = b.as_vec3("mat3 * vec3")?;
                        let row = |r: [f32; 3]| r[0] * v[0] + r[1] * v[1] + r[2] * v[2];
                        Value::Vec3([row(m[0]), row(m[1]), row(m[2])])
                    }
                    (BinaryOp::Add, _) => a.zip(b, "+", |x, y| x + y)?,
                    (BinaryOp::Sub, _) => a.zip(b, "-", |x, y| x - y)?,
                    (BinaryOp::Mul, _) => a.zip(b, "*", |x, y| x * y)?,
                    (BinaryOp::Div, _) => a.zip(b, "/", |x, y| x / y)?,
                    (BinaryOp::Pow, _) => a.zip(b, "pow", f32::powf)?,
                    (BinaryOp::Max, _) => a.zip(b, "max", f32::max)?,
                    (BinaryOp::Min, _) => a.zip(b, "min", f32::min)?,
                }
            }
            Expr::Clamp(x, lo, hi) => {
                let x = self.expr(x, color)?;
                let lo = self.expr(lo, color)?;
                let hi = self.expr(hi, color)?;
                x.zip(lo, "clamp", f32::max)?.zip(hi, "clamp", f32::min)?
            }
            Expr::Dot(a, b) => {
                let a = self.expr(a, color)?.as_vec3("dot")?;
                let b = self.expr(b, color)?.as_vec3("dot")?;
                Value::Float(a[0] * b[0] + a[1] * b[1] + a[2] * b[2])
            }
            Expr::Mix(a, b, t) => {
                let (a, b, t) = (self.expr(a, color)?, self.expr(b, color)?, self.expr(t, color)?);
                match t {
                    Value::BVec3(sel) => {
                        let (a, b) = (a.as_vec3("mix")?, b.as_vec3("mix")?);
                        Value::Vec3([0, 1, 2].map(|i| if sel[i] { b[i] } else { a[i] }))
                    }
                    Value::Bool(sel) => {
                        if sel {
                            b
                        } else {
                            a
                        }
                    }
                    Value::Float(t) => a.zip(b, "mix", |x, y| x + (y - x) * t)?,
                    Value::Vec3(t) => {
                        let (a, b) = (a.as_vec3("mix")?, b.as_vec3("mix")?);
                        Value::Vec3([0, 1, 2].map(|i| a[i] + (b[i] - a[i]) * t[i]))
                    }
                    _ => return Err(EvalError::TypeMismatch { op: "mix" }),
                }
            }
            Expr::Compare(op, a, b) => {
                let (a, b) = (self.expr(a, color)?, self.expr(b, color)?);
                compare(*op, a, b)?
            }
            Expr::Any(a) => match self.expr(a, color)? {
                Value::BVec3(v) => Value::Bool(v.iter().any(|&b| b)),
                Value::Bool(b) => Value::Bool(b),
                _ => return Err(EvalError::TypeMismatch { op: "any" }),
            },
            Expr::Or(a, b) => {
                let a = self.expr(a, color)?.as_bool("||")?;
                let b = self.expr(b, color)?.as_bool("||")?;
                Value::Bool(a || b)
            }
            Expr::Select(c, a, b) => {
                if self.expr(c, color)?.as_bool("?:")? {
                    self.expr(a, color)?
                } else {
                    self.expr(b, color)?
                }
            }
            Expr::Call(f, arg) => {
                let arg = self.expr(arg, color)?.as_float("call")?;
                let prog = self.prog;
                let func = prog
                    .functions()
                    .iter()
                    .find(|h| &h.ident == f)
                    .ok_or_else(|| EvalError::UnknownIdent(f.to_string()))?;
                let saved = self.param.replace(arg);
                let out = self.expr(&func.body, color);
                self.param = saved;
                out?
            }
        })
    }
}

fn compare(op: CmpOp, a: Value, b: Value) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Bool(op.test(x, y)),
        _ => {
            let (x, y) = (a.as_vec3("compare")?, b.as_vec3("compare")?);
            Value::BVec3([0, 1, 2].map(|i| op.test(x[i], y[i])))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Channel, ConstValue};
    use approx::assert_abs_diff_eq;
    use lumina_math::Mat3;

    #[test]
    fn test_matrix_and_offset() {
        let mut prog = ShaderProgram::new(Signature::Color);
        let m = prog.bind("m", ConstValue::Mat3(Mat3::from_rows([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 2.0]])));
        let c = prog.bind("c", ConstValue::Vec3([0.1, 0.0, 0.0]));
        prog.push(Stmt::SetRgb(Expr::var(&m) * Expr::rgb() + Expr::var(&c)));
        let out = prog.eval([0.2, 0.4, 0.3, 1.0]).unwrap();
        assert_abs_diff_eq!(out[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[1], 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_bool_mix_selects_per_component() {
        let mut prog = ShaderProgram::new(Signature::Color);
        // the unselected branch is NaN for negative inputs
        prog.push(Stmt::SetRgb(Expr::mix(
            Expr::splat(-1.0),
            Expr::rgb().log(),
            Expr::cmp(CmpOp::Lt, Expr::splat(0.0), Expr::rgb()),
        )));
        let out = prog.eval([-1.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(out[0], -1.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], -1.0);
    }

    #[test]
    fn test_block_scoping() {
        let mut prog = ShaderProgram::new(Signature::Color);
        prog.push(Stmt::Block(vec![
            Stmt::let_float("sig", Expr::max_rgb()),
            Stmt::assign("sig", Expr::local("sig") * Expr::float(2.0)),
            Stmt::SetChannel(Channel::A, Expr::local("sig")),
        ]));
        let out = prog.eval([0.1, 0.3, 0.2, 1.0]).unwrap();
        assert_abs_diff_eq!(out[3], 0.6, epsilon = 1e-6);

        prog.push(Stmt::SetChannel(Channel::R, Expr::local("sig")));
        assert_eq!(prog.eval([0.0; 4]), Err(EvalError::UnknownIdent("sig".into())));
    }

    #[test]
    fn test_if_and_any() {
        let mut prog = ShaderProgram::new(Signature::Color);
        prog.push(Stmt::If {
            cond: Expr::cmp(CmpOp::Gt, Expr::rgb(), Expr::splat(1.0)).any(),
            then: vec![Stmt::SetRgb(Expr::splat(1.0) - Expr::rgb())],
        });
        assert_eq!(prog.eval([0.5, 0.5, 0.5, 1.0]).unwrap(), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(prog.eval([2.0, 0.5, 0.0, 1.0]).unwrap(), [-1.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_raw_is_opaque() {
        let mut prog = ShaderProgram::new(Signature::Color);
        prog.push(Stmt::Raw("color.rgb = vec3(1.0);".into()));
        assert_eq!(prog.eval([0.0; 4]), Err(EvalError::Opaque));
    }

    #[test]
    fn test_helper_call() {
        let mut prog = ShaderProgram::new(Signature::Color);
        let f = prog.define("sq", Expr::Param * Expr::Param);
        prog.push(Stmt::SetChannel(Channel::R, Expr::call(&f, Expr::channel(Channel::G))));
        let out = prog.eval([0.0, 3.0, 0.0, 1.0]).unwrap();
        assert_eq!(out[0], 9.0);
    }

    #[test]
    fn test_unbound_texture() {
        use crate::gpu::{Texture, TextureFormat, TextureParams};
        let tex = Texture::new(1, TextureParams::new(2, 2, TextureFormat::RGBA8));
        let mut prog = ShaderProgram::new(Signature::None);
        prog.sample(&tex, tex.rect().into()).unwrap();
        assert!(matches!(prog.eval([0.0; 4]), Err(EvalError::UnboundTexture(_))));

        let id = prog.textures()[0].ident.clone();
        let out = Evaluator::new(&prog).with_texture(&id, [0.1, 0.2, 0.3, 0.4]).run([0.0; 4]).unwrap();
        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }
}
