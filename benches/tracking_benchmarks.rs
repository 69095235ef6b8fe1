//! Benchmarks for the tracking state machine and optical flow

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use face_joystick::{
    config::TrackingConfig,
    detection::{PrimaryDetector, SecondaryDetector},
    geometry::BoundingBox,
    motion::{MotionTracker, PyramidalLkTracker},
    tracking::{resolve_candidates, TrackingController},
};
use opencv::{
    core::{Mat, Point2f, Rect, Scalar, CV_8UC3},
    imgproc,
    prelude::*,
};

/// Finds the same face on every call
struct FixedDetector(BoundingBox);

impl PrimaryDetector for FixedDetector {
    fn detect(&mut self, _frame: &Mat) -> Vec<BoundingBox> {
        vec![self.0]
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

impl SecondaryDetector for FixedDetector {
    fn detect(&mut self, _gray: &Mat, _min_size: i32) -> Vec<BoundingBox> {
        vec![self.0]
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Never follows anything, forcing re-detection every frame
struct LostMotion;

impl MotionTracker for LostMotion {
    fn track(&mut self, _prev: &Mat, _gray: &Mat, _points: &[Point2f], _regions: &[BoundingBox]) -> Vec<Point2f> {
        Vec::new()
    }
}

fn checker_frame(x: i32, y: i32) -> Mat {
    let mut frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(40.0)).unwrap();
    for (dx, dy) in [(0, 0), (50, 50)] {
        imgproc::rectangle(
            &mut frame,
            Rect::new(x + dx, y + dy, 50, 50),
            Scalar::all(220.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
    }
    frame
}

fn benchmark_resolve_candidates(c: &mut Criterion) {
    let candidates: Vec<BoundingBox> = (0..32).map(|i| BoundingBox::new(i * 17, i * 11, 80, 80)).collect();
    let previous = Some(Point2f::new(300.0, 200.0));

    c.bench_function("resolve_candidates_32", |b| {
        b.iter(|| black_box(resolve_candidates(black_box(&candidates), previous)));
    });
}

fn benchmark_optical_flow_frame(c: &mut Criterion) {
    let face = BoundingBox::new(270, 190, 100, 100);
    let mut controller = TrackingController::new(
        Box::new(FixedDetector(face)),
        Box::new(FixedDetector(face)),
        Box::new(PyramidalLkTracker::new(21, 3)),
        TrackingConfig::default(),
    );
    let frames = [checker_frame(270, 190), checker_frame(273, 191)];
    controller.process_frame(&frames[0]).unwrap();

    let mut index = 0;
    c.bench_function("process_frame_optical_flow", |b| {
        b.iter(|| {
            index = (index + 1) % frames.len();
            black_box(controller.process_frame(&frames[index]).unwrap());
        });
    });
}

fn benchmark_expansion_frame(c: &mut Criterion) {
    let face = BoundingBox::new(270, 190, 100, 100);
    let mut controller = TrackingController::new(
        Box::new(FixedDetector(face)),
        Box::new(FixedDetector(face)),
        Box::new(LostMotion),
        TrackingConfig::default(),
    );
    let frame = checker_frame(270, 190);
    controller.process_frame(&frame).unwrap();

    c.bench_function("process_frame_expansion", |b| {
        b.iter(|| black_box(controller.process_frame(&frame).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_resolve_candidates,
    benchmark_optical_flow_frame,
    benchmark_expansion_frame
);
criterion_main!(benches);
