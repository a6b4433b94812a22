//! Expression and statement tree of a shader program.
//!
//! Stages build [`Expr`] trees over the working value `color` (a `vec4`),
//! bound constants and block-local floats, and append [`Stmt`]s to a
//! [`ShaderProgram`](crate::ShaderProgram). The same tree is printed as GLSL
//! by [`crate::glsl`] and interpreted by [`crate::eval`].
//!
//! Arithmetic operators are overloaded so stage code reads close to the
//! shader it produces:
//!
//! ```rust
//! use lumina_shaders::ir::Expr;
//!
//! // pow(color.rgb, vec3(2.4))
//! let e = Expr::rgb().pow(Expr::splat(2.4));
//! // color.rgb * vec3(1.0/12.92)
//! let f = Expr::rgb() * Expr::splat(1.0 / 12.92);
//! # let _ = (e, f);
//! ```

use lumina_math::Mat3;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Unique name of a bound constant, texture or helper function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type of a value in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ty {
    /// `float`
    Float,
    /// `vec2`
    Vec2,
    /// `vec3`
    Vec3,
    /// `vec4`
    Vec4,
    /// `mat3`
    Mat3,
    /// `bool`
    Bool,
    /// `bvec3`
    BVec3,
}

impl Ty {
    /// GLSL type name.
    pub fn glsl(self) -> &'static str {
        match self {
            Ty::Float => "float",
            Ty::Vec2 => "vec2",
            Ty::Vec3 => "vec3",
            Ty::Vec4 => "vec4",
            Ty::Mat3 => "mat3",
            Ty::Bool => "bool",
            Ty::BVec3 => "bvec3",
        }
    }

    /// Whether this is a vector (or matrix) type.
    pub fn is_vector(self) -> bool {
        !matches!(self, Ty::Float | Ty::Bool)
    }
}

/// Value of a bound constant, copied at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    /// Scalar.
    Float(f32),
    /// 2-vector.
    Vec2([f32; 2]),
    /// 3-vector.
    Vec3([f32; 3]),
    /// 4-vector.
    Vec4([f32; 4]),
    /// 3x3 matrix, applied as `mat * v`.
    Mat3(Mat3),
}

impl ConstValue {
    /// Type of the constant.
    pub fn ty(&self) -> Ty {
        match self {
            ConstValue::Float(_) => Ty::Float,
            ConstValue::Vec2(_) => Ty::Vec2,
            ConstValue::Vec3(_) => Ty::Vec3,
            ConstValue::Vec4(_) => Ty::Vec4,
            ConstValue::Mat3(_) => Ty::Mat3,
        }
    }

    /// Flat upload data. Matrices are column-major, as GLSL expects.
    pub fn data(&self) -> Vec<f32> {
        match self {
            ConstValue::Float(v) => vec![*v],
            ConstValue::Vec2(v) => v.to_vec(),
            ConstValue::Vec3(v) => v.to_vec(),
            ConstValue::Vec4(v) => v.to_vec(),
            ConstValue::Mat3(m) => m.to_cols_array().to_vec(),
        }
    }
}

/// Component of the working value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red (or luma before decoding)
    R,
    /// Green
    G,
    /// Blue
    B,
    /// Alpha
    A,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    /// Index into a `vec4`.
    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }

    /// Channel for a `vec4` index.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// GLSL swizzle letter.
    pub fn swizzle(self) -> char {
        ['r', 'g', 'b', 'a'][self.index()]
    }
}

/// Binary operators and two-argument builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b` (matrix product when `a` is a `mat3`)
    Mul,
    /// `a / b`
    Div,
    /// `pow(a, b)`
    Pow,
    /// `max(a, b)`
    Max,
    /// `min(a, b)`
    Min,
}

/// One-argument builtins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-a`
    Neg,
    /// `exp(a)`
    Exp,
    /// `log(a)` (natural)
    Log,
    /// `sqrt(a)`
    Sqrt,
}

/// Comparisons; component-wise on vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    /// Scalar comparison.
    pub fn test(self, a: f32, b: f32) -> bool {
        match self {
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }
    }
}

/// Expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Float literal.
    Float(f32),
    /// `vec3(x)` from a scalar.
    Splat(Box<Expr>),
    /// Bound constant.
    Var(Ident),
    /// Block-local float.
    Local(String),
    /// Parameter of a helper function.
    Param,
    /// `color`
    Color,
    /// `color.rgb`
    Rgb,
    /// `color.<c>`
    Channel(Channel),
    /// Unary operator or builtin.
    Unary(UnaryOp, Box<Expr>),
    /// Binary operator or builtin.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `clamp(x, lo, hi)`
    Clamp(Box<Expr>, Box<Expr>, Box<Expr>),
    /// `dot(a, b)`
    Dot(Box<Expr>, Box<Expr>),
    /// `mix(a, b, t)`; `t` may be a float or a boolean selector.
    Mix(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Comparison.
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    /// `any(bvec)`
    Any(Box<Expr>),
    /// `a || b`
    Or(Box<Expr>, Box<Expr>),
    /// `cond ? a : b`
    Select(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Call of a helper function.
    Call(Ident, Box<Expr>),
}

impl Expr {
    /// Float literal.
    pub fn float(v: f32) -> Self {
        Expr::Float(v)
    }

    /// `vec3(v)`
    pub fn splat(v: f32) -> Self {
        Expr::Splat(Box::new(Expr::Float(v)))
    }

    /// `vec3(e)`
    pub fn splat_expr(e: Expr) -> Self {
        Expr::Splat(Box::new(e))
    }

    /// Bound constant.
    pub fn var(id: &Ident) -> Self {
        Expr::Var(id.clone())
    }

    /// Block-local float.
    pub fn local(name: &str) -> Self {
        Expr::Local(name.to_string())
    }

    /// `color.rgb`
    pub fn rgb() -> Self {
        Expr::Rgb
    }

    /// `color.<c>`
    pub fn channel(c: Channel) -> Self {
        Expr::Channel(c)
    }

    /// `max(max(color.r, color.g), color.b)`
    pub fn max_rgb() -> Self {
        Expr::channel(Channel::R)
            .max(Expr::channel(Channel::G))
            .max(Expr::channel(Channel::B))
    }

    fn binary(op: BinaryOp, a: Expr, b: Expr) -> Self {
        Expr::Binary(op, Box::new(a), Box::new(b))
    }

    fn unary(op: UnaryOp, a: Expr) -> Self {
        Expr::Unary(op, Box::new(a))
    }

    /// `pow(self, e)`
    pub fn pow(self, e: Expr) -> Self {
        Self::binary(BinaryOp::Pow, self, e)
    }

    /// `max(self, e)`
    pub fn max(self, e: Expr) -> Self {
        Self::binary(BinaryOp::Max, self, e)
    }

    /// `min(self, e)`
    pub fn min(self, e: Expr) -> Self {
        Self::binary(BinaryOp::Min, self, e)
    }

    /// `exp(self)`
    pub fn exp(self) -> Self {
        Self::unary(UnaryOp::Exp, self)
    }

    /// `log(self)`
    pub fn log(self) -> Self {
        Self::unary(UnaryOp::Log, self)
    }

    /// `sqrt(self)`
    pub fn sqrt(self) -> Self {
        Self::unary(UnaryOp::Sqrt, self)
    }

    /// `clamp(self, lo, hi)`
    pub fn clamp(self, lo: Expr, hi: Expr) -> Self {
        Expr::Clamp(Box::new(self), Box::new(lo), Box::new(hi))
    }

    /// `dot(self, e)`
    pub fn dot(self, e: Expr) -> Self {
        Expr::Dot(Box::new(self), Box::new(e))
    }

    /// `mix(a, b, t)`
    pub fn mix(a: Expr, b: Expr, t: Expr) -> Self {
        Expr::Mix(Box::new(a), Box::new(b), Box::new(t))
    }

    /// Comparison.
    pub fn cmp(op: CmpOp, a: Expr, b: Expr) -> Self {
        Expr::Compare(op, Box::new(a), Box::new(b))
    }

    /// `any(self)`
    pub fn any(self) -> Self {
        Expr::Any(Box::new(self))
    }

    /// `self || e`
    pub fn or(self, e: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(e))
    }

    /// `cond ? a : b`
    pub fn select(cond: Expr, a: Expr, b: Expr) -> Self {
        Expr::Select(Box::new(cond), Box::new(a), Box::new(b))
    }

    /// Call of a helper function.
    pub fn call(f: &Ident, arg: Expr) -> Self {
        Expr::Call(f.clone(), Box::new(arg))
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

/// Statement of a program body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `// text`
    Comment(String),
    /// `color.rgb = e;`
    SetRgb(Expr),
    /// `color.<c> = e;`
    SetChannel(Channel, Expr),
    /// `[const] float name = e;`
    Let {
        /// Local name.
        name: String,
        /// Initial value.
        value: Expr,
        /// Emitted with the `const` qualifier.
        constant: bool,
    },
    /// `name = e;` for an existing local.
    Assign {
        /// Local name.
        name: String,
        /// New value.
        value: Expr,
    },
    /// Reads a texture and routes its components into `color`.
    ///
    /// `mapping[i]` is the channel that texture component `i` lands in,
    /// `None` drops the component.
    Sample {
        /// Bound texture.
        texture: Ident,
        /// Component to channel mapping.
        mapping: [Option<Channel>; 4],
    },
    /// `if (cond) { ... }`
    If {
        /// Boolean condition.
        cond: Expr,
        /// Body.
        then: Vec<Stmt>,
    },
    /// `{ ... }` scope for locals.
    Block(Vec<Stmt>),
    /// Verbatim GLSL injected by a hook.
    Raw(String),
}

impl Stmt {
    /// `// text`
    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment(text.into())
    }

    /// `float name = e;`
    pub fn let_float(name: &str, value: Expr) -> Self {
        Stmt::Let {
            name: name.to_string(),
            value,
            constant: false,
        }
    }

    /// `const float name = e;`
    pub fn let_const(name: &str, value: Expr) -> Self {
        Stmt::Let {
            name: name.to_string(),
            value,
            constant: true,
        }
    }

    /// `name = e;`
    pub fn assign(name: &str, value: Expr) -> Self {
        Stmt::Assign {
            name: name.to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_build_tree() {
        let e = Expr::rgb() * Expr::splat(2.0) + Expr::splat(1.0);
        match e {
            Expr::Binary(BinaryOp::Add, lhs, _) => {
                assert!(matches!(*lhs, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {other:?}"),
        }
    }

    #[test]
    fn test_mat3_data_is_column_major() {
        let m = Mat3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let data = ConstValue::Mat3(m).data();
        assert_eq!(&data[..3], &[1.0, 4.0, 7.0]);
    }

    #[test]
    fn test_channel_index() {
        for (i, c) in Channel::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Channel::from_index(i), Some(*c));
        }
        assert_eq!(Channel::from_index(4), None);
    }
}
