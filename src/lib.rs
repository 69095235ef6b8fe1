//! Face tracking virtual joystick.
//!
//! Turns the position of a face in a video stream into a two-axis joystick
//! signal. The pipeline is:
//! 1. Face detection with an SCRFD ONNX model, falling back to a Haar cascade
//! 2. Frame-to-frame tracking with pyramidal Lucas-Kanade optical flow
//! 3. Widened cascade re-detection when tracking is lost
//! 4. Mapping the face centre, relative to a captured reference position, to
//!    a dead-zoned, clipped and smoothed joystick value
//! 5. Sending the value to an output sink (X11 pointer, log, or nothing)
//!
//! # Examples
//!
//! ## Mapping a face position
//!
//! ```
//! use face_joystick::joystick::{map_face_to_joystick, JoystickConfig};
//!
//! let config = JoystickConfig {
//!     deadzone_x: 0.0,
//!     deadzone_y: 0.0,
//!     sensitivity_x: 1.0,
//!     sensitivity_y: 1.0,
//!     smoothing_factor: 1.0,
//! };
//! // 640x480 frame, face 80 px right of and 60 px above the reference
//! let value = map_face_to_joystick(640, 480, Some((400.0, 180.0)), (320.0, 240.0), &config);
//! assert_eq!(value.x, 0.25);
//! assert_eq!(value.y, 0.25);
//! ```
//!
//! ## Tracking faces in a video
//!
//! ```no_run
//! use face_joystick::{
//!     app::{load_primary_detector, load_secondary_detector},
//!     config::Config,
//!     motion::PyramidalLkTracker,
//!     tracking::TrackingController,
//! };
//! use opencv::{core::Mat, prelude::*, videoio};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut controller = TrackingController::new(
//!     load_primary_detector(&config),
//!     load_secondary_detector(&config),
//!     Box::new(PyramidalLkTracker::new(21, 3)),
//!     config.tracking.clone(),
//! );
//!
//! let mut cap = videoio::VideoCapture::from_file("input.mp4", videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//! while cap.read(&mut frame)? && !frame.empty() {
//!     let outcome = controller.process_frame(&frame)?;
//!     println!("{}: {:?}", outcome.phase, outcome.face);
//! }
//! # Ok(())
//! # }
//! ```

/// Main application module
pub mod app;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Face detector adapters
pub mod detection;

/// Error types and result handling
pub mod error;

/// Bounding boxes and point helpers
pub mod geometry;

/// Face position to joystick mapping
pub mod joystick;

/// Optical flow motion tracking
pub mod motion;

/// Output sinks for joystick values
pub mod output;

/// Exponential smoothing
pub mod smoothing;

/// Face tracking state machine
pub mod tracking;

/// Frame preparation helpers
pub mod utils;

pub use error::{Error, Result};
