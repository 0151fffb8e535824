//! Benchmarks for the joint-angle calculations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shot_form_analysis::{
    geometry::{self, AngleSet},
    landmarks::{JointPoint, PoseLandmarks, ShootingSide},
};

/// Landmarks swaying slightly around a standing pose
fn test_poses(count: usize) -> Vec<PoseLandmarks> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.05;
            let points = (0..33)
                .map(|j| {
                    let j = j as f64;
                    JointPoint::new(0.25 + 0.1 * (t + j).sin(), 0.2 + 0.02 * j + 0.01 * (t * 2.0).cos())
                })
                .collect();
            PoseLandmarks::new(points).unwrap()
        })
        .collect()
}

fn bench_angle_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    let hip = JointPoint::new(0.25, 0.6);
    let shoulder = JointPoint::new(0.25, 0.35);
    let elbow = JointPoint::new(0.31, 0.3);
    let wrist = JointPoint::new(0.33, 0.22);
    let index = JointPoint::new(0.35, 0.2);

    group.bench_function("angle", |b| {
        b.iter(|| black_box(geometry::angle(black_box(&shoulder), black_box(&elbow), black_box(&wrist))));
    });
    group.bench_function("shoulder_angle", |b| {
        b.iter(|| black_box(geometry::shoulder_angle(&hip, &shoulder, &elbow, ShootingSide::Right)));
    });
    group.bench_function("wrist_angle", |b| {
        b.iter(|| black_box(geometry::wrist_angle(&elbow, &wrist, &index, ShootingSide::Right)));
    });

    group.finish();
}

fn bench_angle_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("angle_set");

    for side in [ShootingSide::Left, ShootingSide::Right] {
        let poses = test_poses(100);
        group.bench_with_input(BenchmarkId::new("compute", side), &poses, |b, poses| {
            b.iter(|| {
                for pose in poses {
                    let bundle = pose.bundle(side);
                    black_box(AngleSet::compute(&bundle, side));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_angle_functions, bench_angle_set);
criterion_main!(benches);
