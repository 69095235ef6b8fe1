use super::{FaceSource, TrackState, TrackingOutcome, TrackingPhase};
use crate::config::TrackingConfig;
use crate::detection::{PrimaryDetector, SecondaryDetector};
use crate::geometry::{distance, BoundingBox};
use crate::motion::MotionTracker;
use crate::utils::{ensure_frame_dimensions, frame_size, to_grayscale};
use crate::Result;
use log::debug;
use opencv::core::{Mat, Point2f};

/// Pick exactly one face out of `candidates`.
///
/// With a previous centre the nearest candidate wins (first one on ties);
/// without one the first candidate in detector order is taken.
#[must_use]
pub fn resolve_candidates(candidates: &[BoundingBox], previous: Option<Point2f>) -> Option<BoundingBox> {
    match previous {
        Some(center) => candidates
            .iter()
            .copied()
            .min_by(|a, b| distance(a.center(), center).total_cmp(&distance(b.center(), center))),
        None => candidates.first().copied(),
    }
}

/// Per-session face tracking state machine.
///
/// Owns its [`TrackState`]; independent sessions need independent controllers.
/// Frames must be fed strictly in order.
pub struct TrackingController {
    primary: Box<dyn PrimaryDetector>,
    secondary: Box<dyn SecondaryDetector>,
    motion: Box<dyn MotionTracker>,
    config: TrackingConfig,
    state: TrackState,
    phase: TrackingPhase,
}

impl TrackingController {
    /// Create a controller in the searching phase
    pub fn new(
        primary: Box<dyn PrimaryDetector>,
        secondary: Box<dyn SecondaryDetector>,
        motion: Box<dyn MotionTracker>,
        config: TrackingConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            motion,
            config,
            state: TrackState::new(),
            phase: TrackingPhase::Searching,
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> TrackingPhase {
        self.phase
    }

    /// Current tracking memory
    #[must_use]
    pub const fn state(&self) -> &TrackState {
        &self.state
    }

    /// Tracking parameters in use
    #[must_use]
    pub const fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Drop all tracking memory and go back to searching
    pub fn reset(&mut self) {
        debug!("Tracking reset requested");
        self.state.clear();
        self.phase = TrackingPhase::Searching;
    }

    /// Process one frame and report at most one face.
    ///
    /// Absence of a face is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for a frame with zero width or
    /// height, or an `OpenCV` error if grayscale conversion fails.
    pub fn process_frame(&mut self, frame: &Mat) -> Result<TrackingOutcome> {
        ensure_frame_dimensions(frame)?;
        let gray = to_grayscale(frame, self.config.normalize_contrast)?;

        let outcome = if self.state.has_points() {
            self.follow(&gray)?
        } else {
            self.search(frame, &gray)?
        };

        if outcome.phase != self.phase {
            debug!("Tracking phase {} -> {} ({:?})", self.phase, outcome.phase, outcome.source);
        }
        self.phase = outcome.phase;
        Ok(outcome)
    }

    /// Full-frame detection: primary first, cascade if it finds nothing
    fn search(&mut self, frame: &Mat, gray: &Mat) -> Result<TrackingOutcome> {
        let mut source = FaceSource::Primary;
        let mut candidates = self.primary.detect(frame);
        if candidates.is_empty() {
            source = FaceSource::Secondary;
            candidates = self.secondary.detect(gray, self.config.search_min_size);
        }

        if let Some(face) = self.resolve(&candidates, gray) {
            self.state.replace(face, gray)?;
            return Ok(TrackingOutcome::new(Some(face), TrackingPhase::Tracking, source));
        }

        // `TrackState::replace` always stores points with the face, so a held
        // face reaches here only if a future partial reset keeps it
        Ok(match self.state.face() {
            Some(face) => TrackingOutcome::new(Some(face), TrackingPhase::Searching, FaceSource::Stale),
            None => TrackingOutcome::new(None, TrackingPhase::Searching, FaceSource::None),
        })
    }

    /// Optical flow from the previous frame, widened re-detection if it loses the face
    fn follow(&mut self, gray: &Mat) -> Result<TrackingOutcome> {
        let tracked = match self.state.prev_gray() {
            Some(prev) => self.motion.track(prev, gray, self.state.points(), self.state.boxes()),
            None => Vec::new(),
        };

        let previous = self.state.face().map(|face| face.center());
        let nearest = match previous {
            Some(center) => tracked
                .iter()
                .copied()
                .min_by(|a, b| distance(*a, center).total_cmp(&distance(*b, center))),
            None => tracked.first().copied(),
        };

        if let Some(point) = nearest {
            let face = BoundingBox::centered_at(point, self.config.tracked_box_size);
            self.state.replace(face, gray)?;
            return Ok(TrackingOutcome::new(Some(face), TrackingPhase::Tracking, FaceSource::Motion));
        }

        for attempt in 0..self.config.expansion_attempts {
            let min_size = self.config.expansion_min_size(attempt);
            let candidates = self.secondary.detect(gray, min_size);
            if let Some(face) = self.resolve(&candidates, gray) {
                debug!("Re-detected face on expansion attempt {} (min size {min_size})", attempt + 1);
                self.state.replace(face, gray)?;
                return Ok(TrackingOutcome::new(Some(face), TrackingPhase::Tracking, FaceSource::Expansion));
            }
        }

        debug!(
            "Expansion exhausted {} attempt(s), holding last known face",
            self.config.expansion_attempts
        );
        Ok(TrackingOutcome::new(self.state.face(), TrackingPhase::Expanding, FaceSource::Stale))
    }

    /// Clip detector output to the frame, then pick one face
    fn resolve(&self, candidates: &[BoundingBox], gray: &Mat) -> Option<BoundingBox> {
        let (width, height) = frame_size(gray);
        let clipped: Vec<BoundingBox> = candidates.iter().filter_map(|c| c.clip_to(width, height)).collect();
        if clipped.len() < candidates.len() {
            debug!("Dropped {} candidate(s) outside the frame", candidates.len() - clipped.len());
        }
        if clipped.len() > 1 {
            debug!("Resolving {} face candidates to one", clipped.len());
        }
        resolve_candidates(&clipped, self.state.face().map(|face| face.center()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_nearest_to_previous() {
        let far = BoundingBox::new(250, 250, 100, 100); // centre (300, 300)
        let near = BoundingBox::new(60, 50, 100, 100); // centre (110, 100)

        let chosen = resolve_candidates(&[far, near], Some(Point2f::new(100.0, 100.0)));

        assert_eq!(chosen, Some(near));
    }

    #[test]
    fn test_resolve_without_previous_takes_first() {
        let a = BoundingBox::new(250, 250, 100, 100);
        let b = BoundingBox::new(60, 50, 100, 100);
        assert_eq!(resolve_candidates(&[a, b], None), Some(a));
    }

    #[test]
    fn test_resolve_tie_keeps_detector_order() {
        let left = BoundingBox::new(0, 0, 20, 20); // centre (10, 10)
        let right = BoundingBox::new(20, 0, 20, 20); // centre (30, 10)
        assert_eq!(resolve_candidates(&[right, left], Some(Point2f::new(20.0, 10.0))), Some(right));
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve_candidates(&[], Some(Point2f::new(0.0, 0.0))), None);
        assert_eq!(resolve_candidates(&[], None), None);
    }
}
