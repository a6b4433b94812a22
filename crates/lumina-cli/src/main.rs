//! lumina - inspect generated color pipeline shaders
//!
//! Prints the GLSL program for a source/target configuration, or runs a
//! pixel through it on the CPU.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lumina_core::{ColorLevels, ColorRepr, ColorSpace, ColorSystem};
use lumina_primaries::RenderingIntent;
use lumina_shaders::RenderParams;
use lumina_shaders::colorspace::ToneMapping;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lumina")]
#[command(author, version, about = "Inspect generated color pipeline shaders")]
#[command(long_about = "
Builds the decode + color map program the renderer would generate and
prints it or evaluates it.

Examples:
  lumina glsl --src bt2020-pq --dst srgb
  lumina glsl --src bt709 --dst srgb --repr bt709-tv --gles --glsl-version 300
  lumina eval --src bt2020-pq --dst bt709 --tone-mapping hable 0.58 0.58 0.58
  lumina eval --repr bt709-tv --src bt709 --dst srgb 0.5 0.5 0.5 0.8
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the generated GLSL
    #[command(visible_alias = "g")]
    Glsl(GlslArgs),

    /// Evaluate one pixel through the program
    #[command(visible_alias = "e")]
    Eval(EvalArgs),
}

/// Color space presets.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Space {
    Unknown,
    Srgb,
    Bt709,
    LinearBt709,
    Bt2020Pq,
    Bt2020Hlg,
    Vlog,
}

impl Space {
    fn color_space(self) -> ColorSpace {
        match self {
            Space::Unknown => ColorSpace::UNKNOWN,
            Space::Srgb => ColorSpace::SRGB,
            Space::Bt709 => ColorSpace::BT709,
            Space::LinearBt709 => ColorSpace::LINEAR_BT709,
            Space::Bt2020Pq => ColorSpace::BT2020_PQ,
            Space::Bt2020Hlg => ColorSpace::BT2020_HLG,
            Space::Vlog => ColorSpace::VLOG,
        }
    }
}

/// Sample representation presets.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Repr {
    Rgb,
    Bt601Tv,
    Bt709Tv,
    Bt709Pc,
    Bt2020NcTv,
    Bt2020CTv,
    Ycgco,
    Xyz,
}

impl Repr {
    fn color_repr(self, depth: u32) -> ColorRepr {
        let (sys, levels) = match self {
            Repr::Rgb => (ColorSystem::Rgb, ColorLevels::Pc),
            Repr::Bt601Tv => (ColorSystem::Bt601, ColorLevels::Tv),
            Repr::Bt709Tv => (ColorSystem::Bt709, ColorLevels::Tv),
            Repr::Bt709Pc => (ColorSystem::Bt709, ColorLevels::Pc),
            Repr::Bt2020NcTv => (ColorSystem::Bt2020Nc, ColorLevels::Tv),
            Repr::Bt2020CTv => (ColorSystem::Bt2020C, ColorLevels::Tv),
            Repr::Ycgco => (ColorSystem::YCgCo, ColorLevels::Tv),
            Repr::Xyz => (ColorSystem::Xyz, ColorLevels::Pc),
        };
        ColorRepr {
            bits: lumina_core::BitEncoding::new(depth),
            ..ColorRepr::new(sys, levels)
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Curve {
    Clip,
    Mobius,
    Reinhard,
    Hable,
    Gamma,
    Linear,
}

impl From<Curve> for ToneMapping {
    fn from(c: Curve) -> Self {
        match c {
            Curve::Clip => ToneMapping::Clip,
            Curve::Mobius => ToneMapping::Mobius,
            Curve::Reinhard => ToneMapping::Reinhard,
            Curve::Hable => ToneMapping::Hable,
            Curve::Gamma => ToneMapping::Gamma,
            Curve::Linear => ToneMapping::Linear,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Intent {
    Perceptual,
    Relative,
    Saturation,
    Absolute,
}

impl From<Intent> for RenderingIntent {
    fn from(i: Intent) -> Self {
        match i {
            Intent::Perceptual => RenderingIntent::Perceptual,
            Intent::Relative => RenderingIntent::RelativeColorimetric,
            Intent::Saturation => RenderingIntent::Saturation,
            Intent::Absolute => RenderingIntent::AbsoluteColorimetric,
        }
    }
}

/// Source/target configuration shared by every command.
#[derive(Args)]
struct PipelineArgs {
    /// Source color space
    #[arg(long, value_enum, default_value = "bt709")]
    src: Space,

    /// Target color space
    #[arg(long, value_enum, default_value = "srgb")]
    dst: Space,

    /// Source signal peak, relative to reference white (0 = nominal)
    #[arg(long, default_value = "0")]
    src_peak: f32,

    /// Decode from this sample representation first
    #[arg(long, value_enum)]
    repr: Option<Repr>,

    /// Bit depth of the samples
    #[arg(long, default_value = "8")]
    depth: u32,

    /// Render parameters (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tone mapping curve (overrides the config)
    #[arg(long, value_enum)]
    tone_mapping: Option<Curve>,

    /// Tone mapping curve parameter
    #[arg(long)]
    tone_param: Option<f32>,

    /// Rendering intent (overrides the config)
    #[arg(long, value_enum)]
    intent: Option<Intent>,

    /// Invert out-of-gamut colors
    #[arg(long)]
    gamut_warning: bool,
}

impl PipelineArgs {
    fn params(&self) -> Result<RenderParams> {
        let mut params = match &self.config {
            Some(path) => RenderParams::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => RenderParams::default(),
        };
        if let Some(c) = self.tone_mapping {
            params.color_map.tone_mapping = c.into();
        }
        if let Some(p) = self.tone_param {
            params.color_map.tone_mapping_param = Some(p);
        }
        if let Some(i) = self.intent {
            params.color_map.intent = i.into();
        }
        params.color_map.gamut_warning |= self.gamut_warning;
        Ok(params)
    }

    fn src(&self) -> ColorSpace {
        self.src.color_space().with_sig_peak(self.src_peak)
    }

    fn dst(&self) -> ColorSpace {
        self.dst.color_space()
    }

    fn repr(&self) -> Option<ColorRepr> {
        self.repr.map(|r| r.color_repr(self.depth))
    }
}

#[derive(Args)]
struct GlslArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// GLSL version
    #[arg(long, default_value = "450")]
    glsl_version: u32,

    /// Emit GLSL ES
    #[arg(long)]
    gles: bool,
}

#[derive(Args)]
struct EvalArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Input pixel: R G B [A]
    #[arg(required = true, num_args = 3..=4, allow_negative_numbers = true)]
    pixel: Vec<f32>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Glsl(args) => commands::glsl::run(args),
        Commands::Eval(args) => commands::eval::run(args, cli.verbose),
    }
}
