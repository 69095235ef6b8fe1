//! Exponential moving average over joystick values.

use crate::joystick::JoystickValue;

/// Per-axis exponential smoothing: `smoothed = alpha * raw + (1 - alpha) * previous`.
///
/// Unlike a filter that passes its first sample through, the smoothed value
/// starts at the neutral position and persists across frames, so a face that
/// appears far from the reference eases in rather than jumping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExponentialSmoother {
    value: JoystickValue,
}

impl ExponentialSmoother {
    /// Smoother starting at the neutral position
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Smoother starting at `value`
    #[must_use]
    pub const fn with_initial(value: JoystickValue) -> Self {
        Self { value }
    }

    /// Clamp a smoothing factor into `(0, 1]`; NaN disables smoothing
    #[must_use]
    pub fn clamp_alpha(alpha: f64) -> f64 {
        if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(f64::EPSILON, 1.0)
        }
    }

    /// Fold `raw` into the running average and return the new value.
    ///
    /// `alpha` is read per call so it can change between frames; `1.0` passes
    /// `raw` straight through.
    pub fn apply(&mut self, raw: JoystickValue, alpha: f64) -> JoystickValue {
        let alpha = Self::clamp_alpha(alpha);
        self.value = JoystickValue::new(
            alpha * raw.x + (1.0 - alpha) * self.value.x,
            alpha * raw.y + (1.0 - alpha) * self.value.y,
        );
        self.value
    }

    /// Current smoothed value
    #[must_use]
    pub const fn value(&self) -> JoystickValue {
        self.value
    }

    /// Return to neutral
    pub fn reset(&mut self) {
        self.value = JoystickValue::default();
    }
}
