//! Configuration management for the face joystick application

use crate::constants::{
    DEFAULT_CASCADE_MIN_NEIGHBORS, DEFAULT_CASCADE_MIN_SIZE, DEFAULT_CASCADE_SCALE_FACTOR,
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_CURSOR_SPEED, DEFAULT_EXPANSION_ATTEMPTS, DEFAULT_EXPANSION_GROWTH,
    DEFAULT_FLOW_PYRAMID_LEVELS, DEFAULT_FLOW_WINDOW, DEFAULT_NMS_THRESHOLD, DEFAULT_TRACKED_BOX_SIZE,
};
use crate::joystick::JoystickConfig;
use crate::output::OutputMode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model configuration
    pub models: ModelConfig,

    /// Detector parameters
    pub detection: DetectionConfig,

    /// Tracking state machine parameters
    pub tracking: TrackingConfig,

    /// Joystick mapping (live-adjustable)
    pub joystick: JoystickConfig,

    /// Display configuration
    pub display: DisplayConfig,

    /// Output sink configuration
    pub output: OutputConfig,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the SCRFD face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to the Haar cascade XML
    pub face_cascade: PathBuf,
}

/// Detector parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Confidence threshold for the primary detector (0.0-1.0)
    pub confidence_threshold: f32,

    /// IOU threshold for non-maximum suppression (0.0-1.0)
    pub nms_threshold: f32,

    /// Cascade image pyramid scale step (> 1.0)
    pub cascade_scale_factor: f64,

    /// Neighbouring rectangles a cascade hit needs to be kept
    pub cascade_min_neighbors: i32,
}

/// Tracking state machine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum face size for the cascade fallback while searching
    pub search_min_size: i32,

    /// Side of the box synthesized around an optical-flow point
    pub tracked_box_size: i32,

    /// Widened re-detection attempts per frame after tracking loss
    pub expansion_attempts: u32,

    /// Minimum face size of the first re-detection attempt
    pub expansion_base_min_size: i32,

    /// Factor applied to the minimum face size on each further attempt
    pub expansion_growth: f64,

    /// Lucas-Kanade search window in pixels
    pub flow_window: i32,

    /// Lucas-Kanade pyramid levels
    pub flow_pyramid_levels: i32,

    /// Equalise the grayscale histogram before detection and tracking
    pub normalize_contrast: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the camera window with overlays and trackbars
    pub enabled: bool,

    /// Window title
    pub window_name: String,

    /// Rotate frames 90 degrees counter-clockwise before processing
    pub rotate_camera: bool,

    /// Mirror frames horizontally before processing
    pub mirror: bool,

    /// Show the window fullscreen
    pub fullscreen: bool,

    /// Gaussian-blur the tracked face region in the displayed frame
    pub blur_face: bool,
}

/// Output sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where joystick values go
    pub mode: OutputMode,

    /// Pointer travel per frame at full deflection (cursor mode)
    pub cursor_speed: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("assets/face_detector.onnx"),
            face_cascade: PathBuf::from("assets/haarcascade_frontalface_default.xml"),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            cascade_scale_factor: DEFAULT_CASCADE_SCALE_FACTOR,
            cascade_min_neighbors: DEFAULT_CASCADE_MIN_NEIGHBORS,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            search_min_size: DEFAULT_CASCADE_MIN_SIZE,
            tracked_box_size: DEFAULT_TRACKED_BOX_SIZE,
            expansion_attempts: DEFAULT_EXPANSION_ATTEMPTS,
            expansion_base_min_size: DEFAULT_CASCADE_MIN_SIZE,
            expansion_growth: DEFAULT_EXPANSION_GROWTH,
            flow_window: DEFAULT_FLOW_WINDOW,
            flow_pyramid_levels: DEFAULT_FLOW_PYRAMID_LEVELS,
            normalize_contrast: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_name: "FaceToJoystick".to_string(),
            rotate_camera: false,
            mirror: false,
            fullscreen: false,
            blur_face: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Cursor,
            cursor_speed: DEFAULT_CURSOR_SPEED,
        }
    }
}

impl TrackingConfig {
    /// Minimum face size for re-detection attempt `attempt` (0-based), growing geometrically
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn expansion_min_size(&self, attempt: u32) -> i32 {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let size = f64::from(self.expansion_base_min_size) * self.expansion_growth.powi(exponent);
        if size.is_finite() {
            size.round().clamp(1.0, f64::from(i32::MAX)) as i32
        } else {
            i32::MAX
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialise to YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration
    ///
    /// Model paths are not checked: a missing model degrades that detector
    /// to "no faces" rather than stopping the application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        if !(0.0..=1.0).contains(&detection.confidence_threshold) {
            return Err(Error::ConfigError(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&detection.nms_threshold) {
            return Err(Error::ConfigError("NMS threshold must be between 0.0 and 1.0".to_string()));
        }
        if detection.cascade_scale_factor <= 1.0 {
            return Err(Error::ConfigError("Cascade scale factor must be greater than 1.0".to_string()));
        }
        if detection.cascade_min_neighbors < 0 {
            return Err(Error::ConfigError("Cascade min neighbors must not be negative".to_string()));
        }

        let tracking = &self.tracking;
        if tracking.search_min_size <= 0 || tracking.expansion_base_min_size <= 0 {
            return Err(Error::ConfigError("Minimum face sizes must be greater than 0".to_string()));
        }
        if tracking.tracked_box_size <= 0 {
            return Err(Error::ConfigError("Tracked box size must be greater than 0".to_string()));
        }
        if tracking.expansion_attempts == 0 {
            return Err(Error::ConfigError("Expansion attempts must be at least 1".to_string()));
        }
        if !(tracking.expansion_growth >= 1.0) {
            return Err(Error::ConfigError("Expansion growth must be at least 1.0".to_string()));
        }
        if tracking.flow_window < 3 {
            return Err(Error::ConfigError("Optical flow window must be at least 3 pixels".to_string()));
        }
        if tracking.flow_pyramid_levels < 0 {
            return Err(Error::ConfigError("Pyramid levels must not be negative".to_string()));
        }

        self.joystick.validate()?;

        if !(self.output.cursor_speed >= 0.0) {
            return Err(Error::ConfigError("Cursor speed must not be negative".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Joystick Configuration

# Model paths
models:
  face_detector: "assets/face_detector.onnx"
  face_cascade: "assets/haarcascade_frontalface_default.xml"

# Detector parameters
detection:
  confidence_threshold: 0.5
  nms_threshold: 0.4
  cascade_scale_factor: 1.3
  cascade_min_neighbors: 5

# Tracking state machine
tracking:
  search_min_size: 30
  tracked_box_size: 100
  expansion_attempts: 3
  expansion_base_min_size: 30
  expansion_growth: 1.5
  flow_window: 21
  flow_pyramid_levels: 3
  normalize_contrast: true

# Joystick mapping (also adjustable live from the window trackbars)
joystick:
  deadzone_x: 20.0
  deadzone_y: 20.0
  sensitivity_x: 5.0
  sensitivity_y: 5.0
  smoothing_factor: 1.0

# Display settings
display:
  enabled: true
  window_name: "FaceToJoystick"
  rotate_camera: false
  mirror: false
  fullscreen: false
  blur_face: false

# Output sink: cursor, log or none
output:
  mode: cursor
  cursor_speed: 15.0
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let parsed: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        parsed.validate().unwrap();

        let defaults = Config::default();
        assert_eq!(parsed.joystick, defaults.joystick);
        assert_eq!(parsed.tracking.expansion_attempts, defaults.tracking.expansion_attempts);
        assert_eq!(parsed.output.mode, defaults.output.mode);
        assert_eq!(parsed.models.face_cascade, defaults.models.face_cascade);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = serde_yaml::from_str("joystick:\n  deadzone_x: 42.0\n").unwrap();
        assert_eq!(parsed.joystick.deadzone_x, 42.0);
        assert_eq!(parsed.joystick.deadzone_y, JoystickConfig::default().deadzone_y);
        assert_eq!(parsed.tracking.tracked_box_size, DEFAULT_TRACKED_BOX_SIZE);
    }

    #[test]
    fn test_expansion_schedule_is_geometric() {
        let tracking = TrackingConfig::default();
        assert_eq!(tracking.expansion_min_size(0), 30);
        assert_eq!(tracking.expansion_min_size(1), 45);
        assert_eq!(tracking.expansion_min_size(2), 68);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.detection.confidence_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));

        let mut config = Config::default();
        config.tracking.expansion_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.detection.cascade_scale_factor = 1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.joystick.smoothing_factor = 0.0;
        assert!(config.validate().is_err());
    }
}
