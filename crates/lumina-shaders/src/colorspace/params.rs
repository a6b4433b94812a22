//! Color mapping options.

use super::ToneMapping;
use lumina_primaries::RenderingIntent;
use serde::{Deserialize, Serialize};

/// Options for [`color_map`](super::color_map).
///
/// Deserializes from YAML with every field optional:
///
/// ```rust
/// use lumina_shaders::colorspace::{ColorMapParams, ToneMapping};
///
/// let p: ColorMapParams = serde_yaml::from_str("tone_mapping: hable").unwrap();
/// assert_eq!(p.tone_mapping, ToneMapping::Hable);
/// assert_eq!(p.tone_mapping_desaturate, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMapParams {
    /// Gamut mapping intent.
    pub intent: RenderingIntent,
    /// Tone mapping curve.
    pub tone_mapping: ToneMapping,
    /// Curve parameter; `None` (or zero) selects the curve's default.
    pub tone_mapping_param: Option<f32>,
    /// Luminance above which bright colors are desaturated toward white
    /// before tone mapping. Zero disables desaturation.
    pub tone_mapping_desaturate: f32,
    /// Invert colors that are still out of range after mapping.
    /// Debugging aid only.
    pub gamut_warning: bool,
}

impl Default for ColorMapParams {
    fn default() -> Self {
        Self {
            intent: RenderingIntent::RelativeColorimetric,
            tone_mapping: ToneMapping::Mobius,
            tone_mapping_param: None,
            tone_mapping_desaturate: 2.0,
            gamut_warning: false,
        }
    }
}

impl ColorMapParams {
    /// Effective curve parameter.
    pub fn tone_param(&self) -> f32 {
        match self.tone_mapping_param {
            Some(p) if p != 0.0 => p,
            _ => self.tone_mapping.default_param(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_param_defaults() {
        let mut p = ColorMapParams::default();
        assert_eq!(p.tone_param(), 0.3);
        p.tone_mapping_param = Some(0.0);
        assert_eq!(p.tone_param(), 0.3);
        p.tone_mapping = ToneMapping::Gamma;
        p.tone_mapping_param = Some(2.4);
        assert_eq!(p.tone_param(), 2.4);
    }

    #[test]
    fn test_yaml() {
        let yaml = "intent: absolute_colorimetric\ntone_mapping: linear\ntone_mapping_param: 0.8\ngamut_warning: true\n";
        let p: ColorMapParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(p.intent, RenderingIntent::AbsoluteColorimetric);
        assert_eq!(p.tone_mapping, ToneMapping::Linear);
        assert_eq!(p.tone_param(), 0.8);
        assert!(p.gamut_warning);
        assert_eq!(p.tone_mapping_desaturate, 2.0);
    }
}
