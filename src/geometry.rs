//! Bounding boxes and point helpers shared by the detectors and the tracker.

use opencv::core::{Point2f, Rect};

/// Axis-aligned face box in frame pixel coordinates.
///
/// Boxes produced by the detector adapters always have a positive width and
/// height; [`BoundingBox::from_rect`] drops anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl BoundingBox {
    /// Create a box from its top-left corner and extent
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Convert an `OpenCV` rectangle, rejecting empty or negative extents
    #[must_use]
    pub fn from_rect(rect: Rect) -> Option<Self> {
        (rect.width > 0 && rect.height > 0).then(|| Self::new(rect.x, rect.y, rect.width, rect.height))
    }

    /// Square box of side `size` centred on `center`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn centered_at(center: Point2f, size: i32) -> Self {
        let size = size.max(1);
        let half = size as f32 / 2.0;
        Self::new(
            (center.x - half).round() as i32,
            (center.y - half).round() as i32,
            size,
            size,
        )
    }

    /// Centre point `(x + width/2, y + height/2)`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> Point2f {
        Point2f::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Exclusive right edge, widened so `x + width` cannot overflow
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge, widened so `y + height` cannot overflow
    #[must_use]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Whether `point` lies inside the box (right and bottom edges excluded)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, point: Point2f) -> bool {
        let (px, py) = (f64::from(point.x), f64::from(point.y));
        px >= f64::from(self.x)
            && py >= f64::from(self.y)
            && px < self.right() as f64
            && py < self.bottom() as f64
    }

    /// Intersection with the `width` x `height` frame, `None` when nothing is left
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn clip_to(&self, width: i32, height: i32) -> Option<Self> {
        let x1 = i64::from(self.x).clamp(0, i64::from(width.max(0)));
        let y1 = i64::from(self.y).clamp(0, i64::from(height.max(0)));
        let x2 = self.right().clamp(0, i64::from(width.max(0)));
        let y2 = self.bottom().clamp(0, i64::from(height.max(0)));
        // all four are within [0, i32::MAX] after clamping
        (x2 > x1 && y2 > y1).then(|| Self::new(x1 as i32, y1 as i32, (x2 - x1) as i32, (y2 - y1) as i32))
    }

    /// Box area in square pixels
    #[must_use]
    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

impl From<BoundingBox> for Rect {
    fn from(bbox: BoundingBox) -> Self {
        Self::new(bbox.x, bbox.y, bbox.width, bbox.height)
    }
}

/// Euclidean distance between two points
#[must_use]
pub fn distance(a: Point2f, b: Point2f) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}
