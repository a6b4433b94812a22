//! Render configuration.
//!
//! [`RenderParams`] is read from YAML. Every key is optional; omitted keys
//! keep their defaults:
//!
//! ```yaml
//! color_adjustment:
//!   brightness: 0.0
//!   contrast: 1.0
//!   saturation: 1.0
//!   hue: 0.0
//! color_map:
//!   intent: relative_colorimetric
//!   tone_mapping: mobius
//!   tone_mapping_param: 0.3
//!   tone_mapping_desaturate: 2.0
//!   gamut_warning: false
//! ```

use crate::colorspace::ColorMapParams;
use crate::error::ConfigError;
use lumina_core::ColorAdjustment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Options for [`Renderer::render_image`](crate::Renderer::render_image).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// User controls applied while decoding.
    pub color_adjustment: ColorAdjustment,
    /// Mapping into the target color space.
    pub color_map: ColorMapParams,
}

impl RenderParams {
    /// Parses parameters from a YAML document.
    ///
    /// ```rust
    /// use lumina_shaders::RenderParams;
    /// use lumina_shaders::colorspace::ToneMapping;
    ///
    /// let params = RenderParams::from_yaml("color_map:\n  tone_mapping: reinhard\n").unwrap();
    /// assert_eq!(params.color_map.tone_mapping, ToneMapping::Reinhard);
    /// assert_eq!(params.color_adjustment.contrast, 1.0);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads parameters from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading render params");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorspace::ToneMapping;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(RenderParams::from_yaml("").unwrap(), RenderParams::default());
        assert_eq!(RenderParams::from_yaml("{}").unwrap(), RenderParams::default());
    }

    #[test]
    fn test_partial_document() {
        let yaml = "color_adjustment:\n  saturation: 0.0\ncolor_map:\n  gamut_warning: true\n";
        let p = RenderParams::from_yaml(yaml).unwrap();
        assert_eq!(p.color_adjustment.saturation, 0.0);
        assert_eq!(p.color_adjustment.contrast, 1.0);
        assert!(p.color_map.gamut_warning);
        assert_eq!(p.color_map.tone_mapping, ToneMapping::Mobius);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut p = RenderParams::default();
        p.color_map.tone_mapping = ToneMapping::Hable;
        p.color_adjustment.hue = 0.25;
        let back = RenderParams::from_yaml(&p.to_yaml().unwrap()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_bad_yaml() {
        let err = RenderParams::from_yaml("color_map:\n  tone_mapping: sigmoid\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderParams::from_file("/nonexistent/lumina.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
