//! Benchmarks for joystick mapping and smoothing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_joystick::joystick::{map_face_to_joystick, JoystickConfig, JoystickMapper};
use opencv::core::Point2f;

fn face_path(len: usize) -> Vec<Point2f> {
    (0..len)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 * 0.05;
            Point2f::new(320.0 + 120.0 * t.sin(), 240.0 + 80.0 * (0.7 * t).cos())
        })
        .collect()
}

fn benchmark_map_face(c: &mut Criterion) {
    let config = JoystickConfig::default();
    let faces = face_path(256);

    c.bench_function("map_face_to_joystick", |b| {
        b.iter(|| {
            for face in &faces {
                black_box(map_face_to_joystick(
                    640,
                    480,
                    Some((f64::from(face.x), f64::from(face.y))),
                    (320.0, 240.0),
                    black_box(&config),
                ));
            }
        });
    });
}

fn benchmark_mapper_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper_update");
    let faces = face_path(256);

    for smoothing in [1.0, 0.5, 0.1] {
        let config = JoystickConfig {
            smoothing_factor: smoothing,
            ..JoystickConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(smoothing), &config, |b, config| {
            let mut mapper = JoystickMapper::new();
            b.iter(|| {
                for face in &faces {
                    black_box(mapper.update(640, 480, Some(*face), config));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_map_face, benchmark_mapper_update);
criterion_main!(benches);
