use crate::geometry::BoundingBox;
use crate::Result;
use opencv::core::{Mat, Point2f};
use opencv::prelude::*;
use std::fmt;

/// The controller's memory between frames.
///
/// Holds at most one tracked face. Replaced wholesale on every successful
/// resolution and left untouched otherwise.
#[derive(Default)]
pub struct TrackState {
    face: Option<BoundingBox>,
    boxes: Vec<BoundingBox>,
    points: Vec<Point2f>,
    prev_gray: Option<Mat>,
}

impl TrackState {
    /// Fresh, empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is being tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.face.is_none() && self.points.is_empty() && self.prev_gray.is_none()
    }

    /// Last resolved face
    #[must_use]
    pub const fn face(&self) -> Option<BoundingBox> {
        self.face
    }

    /// Boxes tracked points must stay inside
    #[must_use]
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Tracked centre point(s)
    #[must_use]
    pub fn points(&self) -> &[Point2f] {
        &self.points
    }

    /// Grayscale snapshot of the frame the points were taken from
    #[must_use]
    pub fn prev_gray(&self) -> Option<&Mat> {
        self.prev_gray.as_ref()
    }

    /// Whether there are points for the motion tracker to follow
    #[must_use]
    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }

    /// Replace everything with a newly resolved face seen in `gray`
    ///
    /// # Errors
    ///
    /// Returns an error if the frame snapshot cannot be copied.
    pub fn replace(&mut self, face: BoundingBox, gray: &Mat) -> Result<()> {
        let snapshot = gray.try_clone()?;
        self.face = Some(face);
        self.boxes = vec![face];
        self.points = vec![face.center()];
        self.prev_gray = Some(snapshot);
        Ok(())
    }

    /// Forget everything
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackState")
            .field("face", &self.face)
            .field("boxes", &self.boxes)
            .field("points", &self.points)
            .field("has_prev_gray", &self.prev_gray.is_some())
            .finish()
    }
}
