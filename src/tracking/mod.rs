//! Face tracking state machine.
//!
//! [`TrackingController`] fuses the detector adapters and the motion tracker
//! into a single stable face position per frame. It moves between three
//! phases:
//!
//! - [`TrackingPhase::Searching`]: no face known, run full detection
//! - [`TrackingPhase::Tracking`]: face known, optical flow is following it
//! - [`TrackingPhase::Expanding`]: flow lost the face, widened cascade
//!   re-detection is being tried and the last known face is re-emitted meanwhile
//!
//! Only an explicit [`TrackingController::reset`] returns to searching.

/// Persistent per-session tracking memory
pub mod state;

/// The per-frame state machine
pub mod controller;

pub use controller::{resolve_candidates, TrackingController};
pub use state::TrackState;

use crate::geometry::BoundingBox;
use std::fmt;

/// Phase of the tracking state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingPhase {
    /// No prior face known
    #[default]
    Searching,
    /// Prior face known and motion tracking succeeding
    Tracking,
    /// Motion tracking failed; widened re-detection in progress
    Expanding,
}

impl fmt::Display for TrackingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Searching => "SEARCHING",
            Self::Tracking => "TRACKING",
            Self::Expanding => "EXPANDING",
        };
        f.write_str(name)
    }
}

/// Which path produced the face reported for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSource {
    /// Primary deep-learning detector
    Primary,
    /// Cascade fallback while searching
    Secondary,
    /// Optical flow
    Motion,
    /// Widened cascade re-detection after tracking loss
    Expansion,
    /// Last known face re-emitted unchanged
    Stale,
    /// No face this frame
    None,
}

/// Result of processing one frame: zero or one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingOutcome {
    /// The resolved face, if any
    pub face: Option<BoundingBox>,
    /// Phase the controller is in after this frame
    pub phase: TrackingPhase,
    /// How the face was obtained
    pub source: FaceSource,
}

impl TrackingOutcome {
    pub(crate) const fn new(face: Option<BoundingBox>, phase: TrackingPhase, source: FaceSource) -> Self {
        Self { face, phase, source }
    }

    /// Whether the face comes from this frame's pixels rather than memory
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        !matches!(self.source, FaceSource::Stale | FaceSource::None)
    }
}
