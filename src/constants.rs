//! Constants used throughout the application

/// Minimum confidence for a primary (SCRFD) detection to count as a face
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// IoU above which overlapping primary detections are suppressed
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.4;

/// SCRFD input normalisation: `(pixel - offset) / scale`
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;

/// Fallback SCRFD input size when the model reports dynamic dimensions
pub const DEFAULT_SCRFD_INPUT_SIZE: i32 = 640;

/// Haar cascade parameters
pub const DEFAULT_CASCADE_SCALE_FACTOR: f64 = 1.3;
pub const DEFAULT_CASCADE_MIN_NEIGHBORS: i32 = 5;
pub const DEFAULT_CASCADE_MIN_SIZE: i32 = 30;

/// Side length of the box synthesized around an optical-flow point
pub const DEFAULT_TRACKED_BOX_SIZE: i32 = 100;

/// Widened re-detection schedule used after motion tracking is lost
pub const DEFAULT_EXPANSION_ATTEMPTS: u32 = 3;
pub const DEFAULT_EXPANSION_GROWTH: f64 = 1.5;

/// Pyramidal Lucas-Kanade parameters
pub const DEFAULT_FLOW_WINDOW: i32 = 21;
pub const DEFAULT_FLOW_PYRAMID_LEVELS: i32 = 3;
pub const FLOW_MAX_ITERATIONS: i32 = 30;
pub const FLOW_EPSILON: f64 = 0.01;
pub const FLOW_MIN_EIGEN_THRESHOLD: f64 = 1e-4;

/// Joystick mapping defaults
pub const DEFAULT_DEADZONE: f64 = 20.0;
pub const DEFAULT_SENSITIVITY: f64 = 5.0;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 1.0;

/// Full joystick deflection on either axis
pub const MAX_JOYSTICK_VALUE: f64 = 1.0;

/// Pointer travel per frame at full deflection
pub const DEFAULT_CURSOR_SPEED: f64 = 15.0;

/// Gaussian kernel and sigma for the optional face blur in the display
pub const FACE_BLUR_KERNEL: i32 = 23;
pub const FACE_BLUR_SIGMA: f64 = 30.0;

/// Well-known install locations of the OpenCV frontal face cascade
pub const CASCADE_SEARCH_PATHS: &[&str] = &[
    "assets/haarcascade_frontalface_default.xml",
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
    "/opt/homebrew/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
];
