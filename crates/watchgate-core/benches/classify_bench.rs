use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use watchgate_core::head_pose::{self, HeadPose};
use watchgate_core::landmarks::{indices, LandmarkPoint};
use watchgate_core::{AttentionClassifier, AttentionSession, GazeSample, ReferencePose, SimulatedPlayer, Viewport};

fn dense_mesh(points: usize) -> Vec<LandmarkPoint> {
    let mut mesh: Vec<LandmarkPoint> = (0..points)
        .map(|i| LandmarkPoint::new(i as f32 * 0.7, i as f32 * 0.3))
        .collect();
    mesh[indices::LEFT_EYE_OUTER] = LandmarkPoint::new(400.0, 300.0);
    mesh[indices::RIGHT_EYE_OUTER] = LandmarkPoint::new(500.0, 300.0);
    mesh[indices::NOSE_TIP] = LandmarkPoint::new(452.0, 345.0);
    mesh
}

fn benchmark_head_pose_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("head_pose_estimate");
    for points in [468usize, 478] {
        let mesh = dense_mesh(points);
        group.bench_with_input(BenchmarkId::from_parameter(points), &mesh, |b, mesh| {
            b.iter(|| head_pose::estimate(black_box(mesh)))
        });
    }
    group.finish();
}

fn benchmark_classify(c: &mut Criterion) {
    let classifier = AttentionClassifier::new();
    let viewport = Viewport::new(1920.0, 1080.0);
    let reference = ReferencePose::from_pose(HeadPose {
        yaw: 0.0,
        pitch: 0.45,
        roll: 0.0,
        eye_distance: 100.0,
    });
    let pose = HeadPose {
        yaw: 0.05,
        pitch: 0.47,
        roll: 0.1,
        eye_distance: 104.0,
    };
    let sample = GazeSample::new(960.0, 540.0);

    c.bench_function("classify_with_reference", |b| {
        b.iter(|| {
            classifier.classify(
                black_box(&sample),
                Some(black_box(&pose)),
                Some(&reference),
                &viewport,
            )
        })
    });

    c.bench_function("classify_without_reference", |b| {
        b.iter(|| classifier.classify(black_box(&sample), None, None, &viewport))
    });
}

fn benchmark_session_tick(c: &mut Criterion) {
    let mut session = match AttentionSession::with_defaults(SimulatedPlayer::new()) {
        Ok(session) => session,
        Err(e) => panic!("default session: {}", e),
    };
    let mesh = dense_mesh(478);
    let order = session.calibrator().sequence().ids().to_vec();
    for id in order {
        for _ in 0..5 {
            session.confirm_target_with(id, Some(&mesh));
        }
    }

    c.bench_function("session_tick_dense_mesh", |b| {
        b.iter(|| {
            let sample = GazeSample::with_landmarks(960.0, 540.0, mesh.clone());
            session.on_sample(black_box(sample))
        })
    });
}

criterion_group!(
    benches,
    benchmark_head_pose_estimate,
    benchmark_classify,
    benchmark_session_tick,
);
criterion_main!(benches);
