//! Face detector adapters.
//!
//! Two detectors feed the tracking controller:
//! - a primary deep-learning detector ([`scrfd::ScrfdDetector`]) run on the colour frame
//! - a secondary Haar cascade ([`cascade::HaarCascadeDetector`]) run on the grayscale frame,
//!   used when the primary finds nothing and for widened re-detection
//!
//! Both are treated as untrusted oracles. Inference failures never reach the
//! controller: the adapters log them and report zero candidates.

/// SCRFD face detector on ONNX Runtime
pub mod scrfd;

/// Haar cascade face detector
pub mod cascade;

use crate::geometry::BoundingBox;
use log::warn;
use opencv::core::Mat;

/// Heavyweight, high-precision detector run over a full colour frame.
pub trait PrimaryDetector {
    /// Face candidates above the detector's confidence threshold, best first
    fn detect(&mut self, frame: &Mat) -> Vec<BoundingBox>;

    /// Detector name for diagnostics
    fn name(&self) -> &str;
}

/// Lightweight cascade detector run over a grayscale frame.
pub trait SecondaryDetector {
    /// Face candidates no smaller than `min_size` pixels on either side
    fn detect(&mut self, gray: &Mat, min_size: i32) -> Vec<BoundingBox>;

    /// Detector name for diagnostics
    fn name(&self) -> &str;
}

/// Stand-in for a detector whose model failed to load.
///
/// Always reports zero candidates and warns once.
pub struct UnavailableDetector {
    name: String,
    reason: String,
    warned: bool,
}

impl UnavailableDetector {
    /// Create a placeholder for detector `name`, remembering why it is missing
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
            warned: false,
        }
    }

    fn note_call(&mut self) {
        if !self.warned {
            warn!("{} detector unavailable ({}), reporting no faces", self.name, self.reason);
            self.warned = true;
        }
    }
}

impl PrimaryDetector for UnavailableDetector {
    fn detect(&mut self, _frame: &Mat) -> Vec<BoundingBox> {
        self.note_call();
        Vec::new()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl SecondaryDetector for UnavailableDetector {
    fn detect(&mut self, _gray: &Mat, _min_size: i32) -> Vec<BoundingBox> {
        self.note_call();
        Vec::new()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_detector_reports_nothing() {
        let mut detector = UnavailableDetector::new("primary", "model missing");
        let frame = Mat::default();
        assert!(PrimaryDetector::detect(&mut detector, &frame).is_empty());
        assert!(SecondaryDetector::detect(&mut detector, &frame, 30).is_empty());
        assert_eq!(PrimaryDetector::name(&detector), "primary");
    }
}
