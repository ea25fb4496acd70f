use crate::core_modules::annotator::{AnnotationRequest, StrokeColor};
use crate::core_modules::color_spec::{ColorSpec, DEFAULT_TOLERANCE};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::rectangle::OverlapRule;
use crate::error::MarkupError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Markup configuration, usually loaded from a YAML file.
///
/// ```yaml
/// tolerance: 30
/// overlap: touching
/// requests:
///   - color: "#eb808a"
///     comment: Structural Slab greater than architectural slab
///     stroke: [255, 0, 0]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Per-channel tolerance applied to requests that do not set their own.
    #[serde(default = "default_tolerance")]
    pub tolerance: i64,

    /// Which rectangle contacts are merged.
    #[serde(default)]
    pub overlap: OverlapRule,

    /// Outline width handed to the annotation writer, in points.
    #[serde(default = "default_border_width")]
    pub border_width: f32,

    /// Upper bound on concurrent detection tasks in the parallel pipeline.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Markup passes, applied in order.
    #[serde(default = "default_requests")]
    pub requests: Vec<RequestConfig>,
}

/// A color written either as a hex string or as `[r, g, b]` in 0-255.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Rgb([u8; 3]),
}

impl ColorValue {
    pub fn to_pixel(&self) -> Result<Pixel, MarkupError> {
        match self {
            ColorValue::Hex(hex) => Pixel::from_hex(hex),
            ColorValue::Rgb(rgb) => Ok(Pixel::from(*rgb)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub color: ColorValue,

    /// Overrides the top-level tolerance for this pass.
    #[serde(default)]
    pub tolerance: Option<i64>,

    pub comment: String,

    pub stroke: ColorValue,
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE as i64
}

fn default_border_width() -> f32 {
    2.0
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_requests() -> Vec<RequestConfig> {
    vec![
        RequestConfig {
            color: ColorValue::Rgb([235, 128, 138]),
            tolerance: None,
            comment: "Structural Slab greater than architectural slab".to_string(),
            stroke: ColorValue::Rgb([255, 0, 0]),
        },
        RequestConfig {
            color: ColorValue::Rgb([128, 253, 128]),
            tolerance: None,
            comment: "Arch Slab greater then Structure".to_string(),
            stroke: ColorValue::Rgb([0, 255, 0]),
        },
    ]
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            overlap: OverlapRule::default(),
            border_width: default_border_width(),
            workers: default_workers(),
            requests: default_requests(),
        }
    }
}

impl MarkupConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, MarkupError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, MarkupError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            requests = config.requests.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks every value that can be out of range before any page is scanned.
    pub fn validate(&self) -> Result<(), MarkupError> {
        if !(0..=255).contains(&self.tolerance) {
            return Err(MarkupError::InvalidTolerance(self.tolerance));
        }
        if self.workers == 0 {
            return Err(MarkupError::Config("workers must be at least 1".to_string()));
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(MarkupError::Config(format!(
                "border_width {} must be a non-negative number",
                self.border_width
            )));
        }
        self.annotation_requests().map(|_| ())
    }

    /// Resolves colors and tolerances into validated requests, in configured order.
    pub fn annotation_requests(&self) -> Result<Vec<AnnotationRequest>, MarkupError> {
        self.requests
            .iter()
            .map(|request| {
                let tolerance = request.tolerance.unwrap_or(self.tolerance);
                let color = ColorSpec::new(request.color.to_pixel()?, tolerance)?;
                let stroke = StrokeColor::from(request.stroke.to_pixel()?);
                Ok(AnnotationRequest::new(color, request.comment.clone(), stroke))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_has_reference_passes() {
        let requests = MarkupConfig::default().annotation_requests().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].color.target, Pixel::new(235, 128, 138));
        assert_eq!(requests[0].color.tolerance, 30);
        assert_eq!(requests[0].stroke, StrokeColor::RED);
        assert_eq!(requests[1].color.target, Pixel::new(128, 253, 128));
        assert_eq!(requests[1].stroke, StrokeColor::GREEN);
    }

    #[test]
    fn parses_yaml_with_mixed_color_forms() {
        let yaml = r##"
tolerance: 12
overlap: interior
workers: 3
requests:
  - color: "#eb808a"
    comment: Slab
    stroke: [255, 0, 0]
  - color: [0, 0, 255]
    tolerance: 0
    comment: Exact blue
    stroke: "#00f"
"##;
        let config = MarkupConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.overlap, OverlapRule::Interior);
        assert_eq!(config.workers, 3);
        assert_eq!(config.border_width, 2.0);

        let requests = config.annotation_requests().unwrap();
        assert_eq!(requests[0].color, ColorSpec::new(Pixel::new(235, 128, 138), 12).unwrap());
        assert_eq!(requests[1].color, ColorSpec::exact(Pixel::new(0, 0, 255)));
        assert_eq!(requests[1].stroke, StrokeColor::BLUE);
        assert_eq!(requests[1].comment, "Exact blue");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = MarkupConfig::from_yaml_str("tolerance: 5").unwrap();
        assert_eq!(config.overlap, OverlapRule::Touching);
        assert_eq!(config.requests.len(), 2);
        assert!(config.workers >= 1);
    }

    #[test]
    fn rejects_out_of_range_tolerance() {
        let result = MarkupConfig::from_yaml_str("tolerance: 256");
        assert!(matches!(result, Err(MarkupError::InvalidTolerance(256))));

        let yaml = r#"
requests:
  - color: [1, 2, 3]
    tolerance: -4
    comment: Bad
    stroke: [0, 0, 0]
"#;
        assert!(matches!(
            MarkupConfig::from_yaml_str(yaml),
            Err(MarkupError::InvalidTolerance(-4))
        ));
    }

    #[test]
    fn rejects_bad_hex_and_zero_workers() {
        let yaml = r##"
requests:
  - color: "#zzzzzz"
    comment: Bad
    stroke: [0, 0, 0]
"##;
        assert!(matches!(
            MarkupConfig::from_yaml_str(yaml),
            Err(MarkupError::InvalidColor(_))
        ));
        assert!(matches!(
            MarkupConfig::from_yaml_str("workers: 0"),
            Err(MarkupError::Config(_))
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            MarkupConfig::from_yaml_str("tolerance: [oops"),
            Err(MarkupError::Config(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markup.yaml");
        std::fs::write(&path, "tolerance: 7\nrequests: []\n").unwrap();
        let config = MarkupConfig::load(&path).unwrap();
        assert_eq!(config.tolerance, 7);
        assert!(config.annotation_requests().unwrap().is_empty());
    }
}
