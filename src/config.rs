use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReportError;

/// Everything the generator needs that is not fixed report vocabulary.
/// All fields have defaults; a config file only needs to name what it changes.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Destination of `report.json`. Must be supplied by the caller.
    pub output: Option<PathBuf>,
    pub canvas: CanvasSize,
    pub theme: ThemeSettings,
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct CanvasSize {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

fn default_width() -> f64 { 1920.0 }
fn default_height() -> f64 { 1080.0 }

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThemeSettings {
    /// Report config schema version
    pub config_version: String,
    /// Theme engine version both themes are tagged with
    pub theme_version: String,
    pub base_theme: String,
    /// File name of the registered custom theme
    pub custom_theme: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            config_version: "5.44".to_string(),
            theme_version: "5.46".to_string(),
            base_theme: "CY23SU08".to_string(),
            custom_theme: "Digital_Agency_Dashboard_Desig3362615343750506.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Palette {
    /// "complete" slices, header band
    pub accent: String,
    /// "incomplete" slices
    pub neutral: String,
    pub header_text: String,
    pub page_background: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: "#0017C1".to_string(),
            neutral: "#D9D9D9".to_string(),
            header_text: "#FFFFFF".to_string(),
            page_background: "#F8F8FB".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(text: &str) -> Result<Self, ReportError> {
        serde_json::from_str(text).map_err(|e| ReportError::Config(format!("invalid config: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, ReportError> {
        let text = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn output_path(&self) -> Result<&Path, ReportError> {
        self.output
            .as_deref()
            .ok_or_else(|| ReportError::Config("no output path configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.canvas.width, 1920.0);
        assert_eq!(config.canvas.height, 1080.0);
        assert_eq!(config.theme.config_version, "5.44");
        assert_eq!(config.theme.theme_version, "5.46");
        assert!(config.output.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json(
            r##"{ "output": "/tmp/out/report.json", "palette": { "accent": "#112233" } }"##,
        )
        .unwrap();
        assert_eq!(config.output_path().unwrap(), Path::new("/tmp/out/report.json"));
        assert_eq!(config.palette.accent, "#112233");
        assert_eq!(config.palette.neutral, "#D9D9D9");
        assert_eq!(config.theme.base_theme, "CY23SU08");
        assert_eq!(config.canvas, CanvasSize::default());
    }

    #[test]
    fn test_missing_output_is_error() {
        let err = GeneratorConfig::default().output_path().unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = GeneratorConfig::from_json("{ output: ").unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_with_output_overrides() {
        let config = GeneratorConfig::from_json(r#"{ "output": "a.json" }"#)
            .unwrap()
            .with_output("b.json");
        assert_eq!(config.output_path().unwrap(), Path::new("b.json"));
    }
}
