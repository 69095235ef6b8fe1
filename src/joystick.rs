//! Face position to virtual joystick mapping.
//!
//! [`map_face_to_joystick`] is the pure mapping: displacement from a reference
//! point, normalised by half the frame size, scaled by sensitivity, dead-zoned
//! and clipped to `[-1, 1]`. [`JoystickMapper`] adds the session state around
//! it: the lazily captured reference position and the exponential smoother.

use crate::constants::{DEFAULT_DEADZONE, DEFAULT_SENSITIVITY, DEFAULT_SMOOTHING_FACTOR, MAX_JOYSTICK_VALUE};
use crate::smoothing::ExponentialSmoother;
use crate::{Error, Result};
use log::{debug, info};
use opencv::core::Point2f;
use serde::{Deserialize, Serialize};

/// Live mapping parameters. Read on every call, so they may change between frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    /// Horizontal dead zone in pixels of face displacement
    pub deadzone_x: f64,
    /// Vertical dead zone in pixels of face displacement
    pub deadzone_y: f64,
    /// Horizontal gain
    pub sensitivity_x: f64,
    /// Vertical gain
    pub sensitivity_y: f64,
    /// Weight of the newest sample in `(0, 1]`; `1.0` disables smoothing
    pub smoothing_factor: f64,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            deadzone_x: DEFAULT_DEADZONE,
            deadzone_y: DEFAULT_DEADZONE,
            sensitivity_x: DEFAULT_SENSITIVITY,
            sensitivity_y: DEFAULT_SENSITIVITY,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
        }
    }
}

impl JoystickConfig {
    /// Check ranges
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for negative dead zones or sensitivities,
    /// or a smoothing factor outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.deadzone_x >= 0.0 && self.deadzone_y >= 0.0) {
            return Err(Error::ConfigError("Dead zones must not be negative".to_string()));
        }
        if !(self.sensitivity_x >= 0.0 && self.sensitivity_y >= 0.0) {
            return Err(Error::ConfigError("Sensitivities must not be negative".to_string()));
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(Error::ConfigError(
                "Smoothing factor must be in (0.0, 1.0]".to_string(),
            ));
        }
        Ok(())
    }
}

/// A joystick position, each axis in `[-1, 1]`. Positive `y` is up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JoystickValue {
    /// Horizontal deflection
    pub x: f64,
    /// Vertical deflection
    pub y: f64,
}

impl JoystickValue {
    /// Create a value
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both axes are exactly zero
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// One axis: normalise, apply gain, dead zone (inclusive boundary), clip
fn map_axis(displacement: f64, axis_center: f64, deadzone: f64, sensitivity: f64) -> f64 {
    let raw = displacement / axis_center * MAX_JOYSTICK_VALUE * sensitivity;
    if raw.is_nan() || raw.abs() <= deadzone / axis_center {
        return 0.0;
    }
    raw.clamp(-MAX_JOYSTICK_VALUE, MAX_JOYSTICK_VALUE)
}

/// Map a face centre to a joystick value relative to `reference`.
///
/// The vertical axis is inverted so that moving the face up gives positive
/// `y`. Returns the neutral value when no face is given or the frame is too
/// small to have a centre.
#[must_use]
pub fn map_face_to_joystick(
    frame_width: i32,
    frame_height: i32,
    face: Option<(f64, f64)>,
    reference: (f64, f64),
    config: &JoystickConfig,
) -> JoystickValue {
    let Some((face_x, face_y)) = face else {
        return JoystickValue::default();
    };

    let center_x = f64::from(frame_width / 2);
    let center_y = f64::from(frame_height / 2);
    if center_x <= 0.0 || center_y <= 0.0 {
        debug!("Cannot map face on a {frame_width}x{frame_height} frame, reporting neutral");
        return JoystickValue::default();
    }

    JoystickValue::new(
        map_axis(face_x - reference.0, center_x, config.deadzone_x, config.sensitivity_x),
        map_axis(reference.1 - face_y, center_y, config.deadzone_y, config.sensitivity_y),
    )
}

/// Raw and smoothed value produced for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSample {
    /// Mapped value before smoothing
    pub raw: JoystickValue,
    /// Value after exponential smoothing, the one sent to outputs
    pub smoothed: JoystickValue,
}

/// Session state around [`map_face_to_joystick`]
#[derive(Debug, Clone, Default)]
pub struct JoystickMapper {
    reference: Option<(f64, f64)>,
    smoother: ExponentialSmoother,
}

impl JoystickMapper {
    /// Mapper with no reference captured yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map this frame's face, if any.
    ///
    /// The first valid face after construction or [`Self::reset_reference`]
    /// becomes the reference (zero point). Frames without a face, or with a
    /// frame too small to map, return `None` and leave all state untouched.
    pub fn update(
        &mut self,
        frame_width: i32,
        frame_height: i32,
        face: Option<Point2f>,
        config: &JoystickConfig,
    ) -> Option<JoystickSample> {
        let face = face?;
        let face = (f64::from(face.x), f64::from(face.y));
        if frame_width < 2 || frame_height < 2 || !face.0.is_finite() || !face.1.is_finite() {
            debug!("Ignoring face {face:?} on a {frame_width}x{frame_height} frame");
            return None;
        }

        let reference = *self.reference.get_or_insert_with(|| {
            info!("Reference position set to ({:.1}, {:.1})", face.0, face.1);
            face
        });

        let raw = map_face_to_joystick(frame_width, frame_height, Some(face), reference, config);
        let smoothed = self.smoother.apply(raw, config.smoothing_factor);
        Some(JoystickSample { raw, smoothed })
    }

    /// Forget the reference; the next face seen becomes the new zero point
    pub fn reset_reference(&mut self) {
        if self.reference.take().is_some() {
            info!("Reference position cleared");
        }
    }

    /// Current reference position
    #[must_use]
    pub const fn reference(&self) -> Option<(f64, f64)> {
        self.reference
    }

    /// Latest smoothed value
    #[must_use]
    pub const fn smoothed(&self) -> JoystickValue {
        self.smoother.value()
    }
}
