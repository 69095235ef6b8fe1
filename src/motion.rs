//! Frame-to-frame motion tracking with sparse pyramidal Lucas-Kanade optical flow.

use crate::constants::{FLOW_EPSILON, FLOW_MAX_ITERATIONS, FLOW_MIN_EIGEN_THRESHOLD};
use crate::geometry::BoundingBox;
use crate::Result;
use log::{debug, warn};
use opencv::core::{Mat, Point2f, Size, TermCriteria, TermCriteria_Type, Vector};
use opencv::prelude::*;
use opencv::video;

/// Estimates where known face centres moved between two grayscale frames.
pub trait MotionTracker {
    /// Track `points` from `prev_gray` into `gray`.
    ///
    /// Only points the flow marks valid and that land inside at least one of
    /// `regions` are returned. An empty result means tracking failed.
    fn track(&mut self, prev_gray: &Mat, gray: &Mat, points: &[Point2f], regions: &[BoundingBox]) -> Vec<Point2f>;
}

/// Keep the points that fall inside any of `regions`
#[must_use]
pub fn retain_within(points: impl IntoIterator<Item = Point2f>, regions: &[BoundingBox]) -> Vec<Point2f> {
    points
        .into_iter()
        .filter(|point| regions.iter().any(|region| region.contains(*point)))
        .collect()
}

/// Sparse optical flow tracker backed by `cv::calcOpticalFlowPyrLK`
#[derive(Debug, Clone)]
pub struct PyramidalLkTracker {
    window: i32,
    max_level: i32,
}

impl PyramidalLkTracker {
    /// Create a tracker with the given search window (pixels) and pyramid depth
    #[must_use]
    pub fn new(window: i32, max_level: i32) -> Self {
        Self {
            window: window.max(3),
            max_level: max_level.max(0),
        }
    }

    /// Run the flow and return `(point, valid)` for every input point
    ///
    /// # Errors
    ///
    /// Returns an error if `OpenCV` rejects the inputs.
    pub fn try_track(&self, prev_gray: &Mat, gray: &Mat, points: &[Point2f]) -> Result<Vec<(Point2f, bool)>> {
        if points.is_empty() || prev_gray.empty() || gray.empty() {
            return Ok(Vec::new());
        }
        if prev_gray.size()? != gray.size()? {
            debug!("Frame size changed between frames, dropping motion estimate");
            return Ok(Vec::new());
        }

        let prev_points: Vector<Point2f> = points.iter().copied().collect();
        let mut next_points = Vector::<Point2f>::new();
        let mut status = Vector::<u8>::new();
        let mut errors = Vector::<f32>::new();
        let criteria = TermCriteria::new(
            TermCriteria_Type::COUNT as i32 | TermCriteria_Type::EPS as i32,
            FLOW_MAX_ITERATIONS,
            FLOW_EPSILON,
        )?;

        video::calc_optical_flow_pyr_lk(
            prev_gray,
            gray,
            &prev_points,
            &mut next_points,
            &mut status,
            &mut errors,
            Size::new(self.window, self.window),
            self.max_level,
            criteria,
            0,
            FLOW_MIN_EIGEN_THRESHOLD,
        )?;

        Ok(next_points
            .iter()
            .zip(status.iter())
            .map(|(point, flag)| (point, flag != 0))
            .collect())
    }
}

impl MotionTracker for PyramidalLkTracker {
    fn track(&mut self, prev_gray: &Mat, gray: &Mat, points: &[Point2f], regions: &[BoundingBox]) -> Vec<Point2f> {
        match self.try_track(prev_gray, gray, points) {
            Ok(flow) => {
                let valid = flow.into_iter().filter(|(_, ok)| *ok).map(|(point, _)| point);
                retain_within(valid, regions)
            }
            Err(e) => {
                warn!("Optical flow failed, treating as tracking loss: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Rect, Scalar, CV_8UC1};
    use opencv::imgproc;

    /// Black frame with a white square whose top-left corner is at `(x, y)`
    fn square_frame(x: i32, y: i32) -> Mat {
        let mut frame = Mat::new_rows_cols_with_default(240, 320, CV_8UC1, Scalar::all(0.0)).unwrap();
        imgproc::rectangle(
            &mut frame,
            Rect::new(x, y, 40, 40),
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
        frame
    }

    #[test]
    fn test_retain_within_drops_drifted_points() {
        let regions = [BoundingBox::new(0, 0, 50, 50), BoundingBox::new(100, 100, 50, 50)];
        let points = vec![
            Point2f::new(10.0, 10.0),
            Point2f::new(75.0, 75.0),
            Point2f::new(120.0, 130.0),
        ];

        let kept = retain_within(points, &regions);

        assert_eq!(kept, vec![Point2f::new(10.0, 10.0), Point2f::new(120.0, 130.0)]);
    }

    #[test]
    fn test_no_points_no_result() {
        let mut tracker = PyramidalLkTracker::new(21, 3);
        let frame = square_frame(100, 100);
        assert!(tracker.track(&frame, &frame, &[], &[BoundingBox::new(0, 0, 320, 240)]).is_empty());
    }

    #[test]
    fn test_missing_previous_frame_is_not_an_error() {
        let tracker = PyramidalLkTracker::new(21, 3);
        let result = tracker.try_track(&Mat::default(), &square_frame(0, 0), &[Point2f::new(1.0, 1.0)]);
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_follows_translated_corner() {
        let mut tracker = PyramidalLkTracker::new(21, 3);
        let prev = square_frame(100, 100);
        let next = square_frame(104, 102);
        let region = [BoundingBox::new(60, 60, 120, 120)];

        let tracked = tracker.track(&prev, &next, &[Point2f::new(100.0, 100.0)], &region);

        assert_eq!(tracked.len(), 1);
        assert!((tracked[0].x - 104.0).abs() < 1.5);
        assert!((tracked[0].y - 102.0).abs() < 1.5);
    }

    #[test]
    fn test_points_outside_regions_are_rejected() {
        let mut tracker = PyramidalLkTracker::new(21, 3);
        let prev = square_frame(100, 100);
        let next = square_frame(104, 102);
        let far_away = [BoundingBox::new(0, 0, 20, 20)];

        let tracked = tracker.track(&prev, &next, &[Point2f::new(100.0, 100.0)], &far_away);

        assert!(tracked.is_empty());
    }
}
