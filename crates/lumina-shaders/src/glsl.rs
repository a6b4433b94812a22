//! GLSL source emission.
//!
//! The output is a self-contained fragment: version line, precision
//! qualifiers, uniform declarations for every bound constant and
//! texture, helper functions and the entry point. A program created with
//! [`Signature::Color`] becomes `vec4 main(vec4 color)`; one created with
//! [`Signature::None`] becomes `vec4 main()` starting from opaque black.

use crate::ir::{BinaryOp, CmpOp, Expr, Stmt, Ty, UnaryOp};
use crate::program::{ShaderProgram, Signature};
use std::fmt::Write;

/// GLSL dialect of the target device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslVersion {
    /// `#version` number (e.g. 110, 330, 450, or 100/300 for GLES).
    pub version: u32,
    /// OpenGL ES dialect.
    pub gles: bool,
}

impl Default for GlslVersion {
    fn default() -> Self {
        Self::desktop(450)
    }
}

impl GlslVersion {
    /// Desktop GLSL.
    pub const fn desktop(version: u32) -> Self {
        Self { version, gles: false }
    }

    /// GLSL ES.
    pub const fn es(version: u32) -> Self {
        Self { version, gles: true }
    }

    /// Whether this dialect has 1.30-level features (`in`/`out`,
    /// `texture()`, boolean `mix`).
    pub fn is_modern(&self) -> bool {
        if self.gles { self.version >= 300 } else { self.version >= 130 }
    }

    /// Default float precision qualifier, `None` on desktop.
    pub fn precision(&self) -> Option<&'static str> {
        match (self.gles, self.version >= 300) {
            (false, _) => None,
            (true, true) => Some("highp"),
            (true, false) => Some("mediump"),
        }
    }

    /// Name of the 2D sampling builtin.
    pub fn texture_fn(&self) -> &'static str {
        if self.is_modern() { "texture" } else { "texture2D" }
    }
}

/// Emits the complete GLSL source of `prog`.
pub fn emit(prog: &ShaderProgram, version: GlslVersion) -> String {
    let mut e = Emitter {
        prog,
        version,
        out: String::new(),
        depth: 0,
    };
    e.header();
    e.main();
    e.out
}

/// Formats a float so GLSL parses it as a float constant.
pub fn float_lit(v: f32) -> String {
    if !v.is_finite() {
        return "0.0".to_string();
    }
    let s = format!("{v:?}");
    if s.contains('.') || s.contains('e') || s.contains("inf") {
        s
    } else {
        format!("{s}.0")
    }
}

struct Emitter<'a> {
    prog: &'a ShaderProgram,
    version: GlslVersion,
    out: String,
    depth: usize,
}

impl Emitter<'_> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn header(&mut self) {
        let v = self.version;
        let line = if v.gles && v.version >= 300 {
            format!("#version {} es", v.version)
        } else {
            format!("#version {}", v.version)
        };
        self.line(&line);
        if let Some(prec) = v.precision() {
            self.line(&format!("precision {prec} float;"));
        }

        for (id, value) in self.prog.vars() {
            self.line(&format!("uniform {} {id};", value.ty().glsl()));
        }
        for binding in self.prog.textures() {
            self.line(&format!("uniform sampler2D {};", binding.ident));
        }
        if !self.prog.textures().is_empty() {
            let qualifier = if v.is_modern() { "in" } else { "varying" };
            self.line(&format!("{qualifier} vec2 pos;"));
        }

        for f in self.prog.functions() {
            let body = self.expr(&f.body, true);
            self.line(&format!("float {}(float x) {{", f.ident));
            self.depth += 1;
            self.line(&format!("return {body};"));
            self.depth -= 1;
            self.line("}");
        }
    }

    fn main(&mut self) {
        let name = self.prog.name().clone();
        match self.prog.input() {
            Signature::Color => {
                self.line(&format!("vec4 {name}(vec4 color) {{"));
                self.depth += 1;
            }
            Signature::None => {
                self.line(&format!("vec4 {name}() {{"));
                self.depth += 1;
                self.line("vec4 color = vec4(0.0, 0.0, 0.0, 1.0);");
            }
            Signature::Sampler => {
                let tex = self.version.texture_fn();
                self.line(&format!("vec4 {name}(sampler2D src_tex, vec2 pos) {{"));
                self.depth += 1;
                self.line(&format!("vec4 color = {tex}(src_tex, pos);"));
            }
        }

        for stmt in self.prog.body() {
            self.stmt(stmt);
        }

        self.line("return color;");
        self.depth -= 1;
        self.line("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Comment(text) => self.line(&format!("// {text}")),
            Stmt::SetRgb(e) => {
                let v = self.expr(e, true);
                self.line(&format!("color.rgb = {v};"));
            }
            Stmt::SetChannel(c, e) => {
                let v = self.expr(e, true);
                self.line(&format!("color.{} = {v};", c.swizzle()));
            }
            Stmt::Let { name, value, constant } => {
                let v = self.expr(value, true);
                let q = if *constant { "const " } else { "" };
                self.line(&format!("{q}float {name} = {v};"));
            }
            Stmt::Assign { name, value } => {
                let v = self.expr(value, true);
                self.line(&format!("{name} = {v};"));
            }
            Stmt::Sample { texture, mapping } => {
                let rect = self
                    .prog
                    .textures()
                    .iter()
                    .find(|b| &b.ident == texture)
                    .map(|b| b.rect_ident.to_string());
                let coord = match rect {
                    Some(r) => format!("{r}.xy + pos * {r}.zw"),
                    None => "pos".to_string(),
                };
                let tex_fn = self.version.texture_fn();
                self.line("{");
                self.depth += 1;
                self.line(&format!("vec4 tmp = {tex_fn}({texture}, {coord});"));
                for (i, ch) in mapping.iter().enumerate() {
                    if let Some(ch) = ch {
                        let comp = ['r', 'g', 'b', 'a'][i];
                        self.line(&format!("color.{} = tmp.{comp};", ch.swizzle()));
                    }
                }
                self.depth -= 1;
                self.line("}");
            }
            Stmt::If { cond, then } => {
                let c = self.expr(cond, true);
                self.line(&format!("if ({c}) {{"));
                self.block(then);
                self.line("}");
            }
            Stmt::Block(body) => {
                self.line("{");
                self.block(body);
                self.line("}");
            }
            Stmt::Raw(text) => {
                for l in text.lines() {
                    self.line(l);
                }
            }
        }
    }

    fn block(&mut self, body: &[Stmt]) {
        self.depth += 1;
        for s in body {
            self.stmt(s);
        }
        self.depth -= 1;
    }

    fn ty(&self, e: &Expr) -> Ty {
        fn wider(a: Ty, b: Ty) -> Ty {
            if a.is_vector() { a } else { b }
        }

        match e {
            Expr::Float(_) | Expr::Local(_) | Expr::Param | Expr::Channel(_) => Ty::Float,
            Expr::Dot(..) | Expr::Call(..) => Ty::Float,
            Expr::Splat(_) | Expr::Rgb => Ty::Vec3,
            Expr::Color => Ty::Vec4,
            Expr::Var(id) => self.prog.var(id).map_or(Ty::Float, |v| v.ty()),
            Expr::Unary(_, a) | Expr::Clamp(a, _, _) => self.ty(a),
            Expr::Binary(op, a, b) => {
                let (ta, tb) = (self.ty(a), self.ty(b));
                if *op == BinaryOp::Mul && ta == Ty::Mat3 { Ty::Vec3 } else { wider(ta, tb) }
            }
            Expr::Mix(a, b, _) | Expr::Select(_, a, b) => wider(self.ty(a), self.ty(b)),
            Expr::Compare(_, a, b) => {
                if wider(self.ty(a), self.ty(b)).is_vector() { Ty::BVec3 } else { Ty::Bool }
            }
            Expr::Any(_) | Expr::Or(..) => Ty::Bool,
        }
    }

    /// Emits `e` as a vector operand, splatting scalars.
    fn vec_operand(&self, e: &Expr) -> String {
        let s = self.expr(e, true);
        if self.ty(e).is_vector() { s } else { format!("vec3({s})") }
    }

    fn expr(&self, e: &Expr, top: bool) -> String {
        match e {
            Expr::Float(v) => float_lit(*v),
            Expr::Splat(a) => format!("vec3({})", self.expr(a, true)),
            Expr::Var(id) => id.to_string(),
            Expr::Local(name) => name.clone(),
            Expr::Param => "x".to_string(),
            Expr::Color => "color".to_string(),
            Expr::Rgb => "color.rgb".to_string(),
            Expr::Channel(c) => format!("color.{}", c.swizzle()),
            Expr::Unary(op, a) => match op {
                UnaryOp::Neg => format!("(-{})", self.expr(a, false)),
                UnaryOp::Exp => format!("exp({})", self.expr(a, true)),
                UnaryOp::Log => format!("log({})", self.expr(a, true)),
                UnaryOp::Sqrt => format!("sqrt({})", self.expr(a, true)),
            },
            Expr::Binary(op, a, b) => {
                let sym = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    BinaryOp::Pow | BinaryOp::Max | BinaryOp::Min => {
                        let name = match op {
                            BinaryOp::Pow => "pow",
                            BinaryOp::Max => "max",
                            _ => "min",
                        };
                        // pow() has no vector/scalar overload
                        let (sa, sb) = if *op == BinaryOp::Pow && self.ty(a).is_vector() {
                            (self.expr(a, true), self.vec_operand(b))
                        } else {
                            (self.expr(a, true), self.expr(b, true))
                        };
                        return format!("{name}({sa}, {sb})");
                    }
                };
                let s = format!("{} {sym} {}", self.expr(a, false), self.expr(b, false));
                if top { s } else { format!("({s})") }
            }
            Expr::Clamp(a, lo, hi) => format!(
                "clamp({}, {}, {})",
                self.expr(a, true),
                self.expr(lo, true),
                self.expr(hi, true)
            ),
            Expr::Dot(a, b) => format!("dot({}, {})", self.expr(a, true), self.expr(b, true)),
            Expr::Mix(a, b, t) => {
                let vector = self.ty(a).is_vector() || self.ty(b).is_vector();
                let (sa, sb) = if vector {
                    (self.vec_operand(a), self.vec_operand(b))
                } else {
                    (self.expr(a, true), self.expr(b, true))
                };
                let st = self.expr(t, true);
                let st = match self.ty(t) {
                    Ty::BVec3 if !self.version.is_modern() => format!("vec3({st})"),
                    Ty::Bool if !self.version.is_modern() => format!("float({st})"),
                    _ => st,
                };
                format!("mix({sa}, {sb}, {st})")
            }
            Expr::Compare(op, a, b) => {
                let vector = self.ty(a).is_vector() || self.ty(b).is_vector();
                if vector {
                    let name = match op {
                        CmpOp::Lt => "lessThan",
                        CmpOp::Le => "lessThanEqual",
                        CmpOp::Gt => "greaterThan",
                        CmpOp::Ge => "greaterThanEqual",
                    };
                    format!("{name}({}, {})", self.vec_operand(a), self.vec_operand(b))
                } else {
                    let sym = match op {
                        CmpOp::Lt => "<",
                        CmpOp::Le => "<=",
                        CmpOp::Gt => ">",
                        CmpOp::Ge => ">=",
                    };
                    let s = format!("{} {sym} {}", self.expr(a, false), self.expr(b, false));
                    if top { s } else { format!("({s})") }
                }
            }
            Expr::Any(a) => format!("any({})", self.expr(a, true)),
            Expr::Or(a, b) => {
                let s = format!("{} || {}", self.expr(a, false), self.expr(b, false));
                if top { s } else { format!("({s})") }
            }
            Expr::Select(c, a, b) => {
                let s = format!(
                    "{} ? {} : {}",
                    self.expr(c, false),
                    self.expr(a, false),
                    self.expr(b, false)
                );
                if top { s } else { format!("({s})") }
            }
            Expr::Call(f, a) => {
                let mut s = String::new();
                let _ = write!(s, "{f}({})", self.expr(a, true));
                s
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Channel, ConstValue};
    use lumina_math::Mat3;

    fn srgb_like() -> ShaderProgram {
        let mut prog = ShaderProgram::new(Signature::Color);
        let m = prog.bind("cmat", ConstValue::Mat3(Mat3::IDENTITY));
        prog.push(Stmt::SetRgb(Expr::var(&m) * Expr::rgb()));
        prog.push(Stmt::SetRgb(Expr::mix(
            Expr::rgb() * Expr::splat(1.0 / 12.92),
            Expr::rgb().pow(Expr::splat(2.4)),
            Expr::cmp(CmpOp::Lt, Expr::splat(0.04045), Expr::rgb()),
        )));
        prog
    }

    #[test]
    fn test_float_lit() {
        assert_eq!(float_lit(1.0), "1.0");
        assert_eq!(float_lit(0.5), "0.5");
        assert_eq!(float_lit(-2.0), "-2.0");
        assert_eq!(float_lit(1e-6), "1e-6");
    }

    #[test]
    fn test_desktop_header() {
        let src = srgb_like().glsl(GlslVersion::desktop(450));
        assert!(src.starts_with("#version 450\n"));
        assert!(!src.contains("precision"));
        assert!(src.contains("uniform mat3 cmat_1;"));
        assert!(src.contains("vec4 main(vec4 color) {"));
        assert!(src.contains("color.rgb = cmat_1 * color.rgb;"));
        assert!(src.contains("lessThan(vec3(0.04045), color.rgb))"));
        assert!(src.trim_end().ends_with("return color;\n}"));
    }

    #[test]
    fn test_gles_precision() {
        let src = srgb_like().glsl(GlslVersion::es(300));
        assert!(src.starts_with("#version 300 es\nprecision highp float;"));

        let src = srgb_like().glsl(GlslVersion::es(100));
        assert!(src.starts_with("#version 100\nprecision mediump float;"));
    }

    #[test]
    fn test_legacy_bool_mix() {
        let src = srgb_like().glsl(GlslVersion::desktop(120));
        assert!(src.contains(", vec3(lessThan("));
        let src = srgb_like().glsl(GlslVersion::desktop(130));
        assert!(!src.contains("vec3(lessThan("));
    }

    #[test]
    fn test_none_signature_starts_black() {
        let mut prog = ShaderProgram::new(Signature::None);
        prog.require(Signature::None, 0, 0).unwrap();
        prog.push(Stmt::SetChannel(Channel::G, Expr::float(0.5)));
        let src = prog.glsl(GlslVersion::default());
        assert!(src.contains("vec4 main() {"));
        assert!(src.contains("vec4 color = vec4(0.0, 0.0, 0.0, 1.0);"));
        assert!(src.contains("color.g = 0.5;"));
    }

    #[test]
    fn test_texture_fn_by_version() {
        use crate::gpu::{Texture, TextureFormat, TextureParams};
        let tex = Texture::new(1, TextureParams::new(8, 8, TextureFormat::RGBA8));
        let mut prog = ShaderProgram::new(Signature::None);
        prog.sample(&tex, tex.rect().into()).unwrap();

        let modern = prog.glsl(GlslVersion::desktop(330));
        assert!(modern.contains("uniform sampler2D src_tex_1;"));
        assert!(modern.contains("in vec2 pos;"));
        assert!(modern.contains("texture(src_tex_1, src_tex_rect_2.xy + pos * src_tex_rect_2.zw)"));

        let legacy = prog.glsl(GlslVersion::desktop(120));
        assert!(legacy.contains("varying vec2 pos;"));
        assert!(legacy.contains("texture2D(src_tex_1,"));
    }

    #[test]
    fn test_helper_function() {
        let mut prog = ShaderProgram::new(Signature::Color);
        let f = prog.define("hable", Expr::Param * Expr::float(2.0));
        prog.push(Stmt::SetChannel(Channel::R, Expr::call(&f, Expr::channel(Channel::R))));
        let src = prog.glsl(GlslVersion::default());
        assert!(src.contains("float hable_1(float x) {\n    return x * 2.0;\n}"));
        assert!(src.contains("color.r = hable_1(color.r);"));
    }
}
