use watchgate_core::landmarks::indices;
use watchgate_core::{
    AttentionSession, CalibrationState, ConfirmOutcome, GazeSample, LandmarkPoint, PlaybackCommand,
    ReasonCode, SessionEvent, SessionPhase, SimulatedPlayer, TickOutcome, ViewportConfig,
    WatchgateConfig,
};

const WIDTH: f32 = 1000.0;
const HEIGHT: f32 = 800.0;

/// Dense mesh with eyes `eye_distance` apart, the nose shifted by `yaw`
/// along the eye line, and the whole face rotated by `roll` radians
fn face(eye_distance: f32, yaw: f32, roll: f32) -> Vec<LandmarkPoint> {
    let mut points = vec![LandmarkPoint::new(0.0, 0.0); 478];
    let (sin, cos) = roll.sin_cos();
    let along = |t: f32, down: f32| {
        LandmarkPoint::new(
            400.0 + eye_distance * (t * cos - down * sin),
            300.0 + eye_distance * (t * sin + down * cos),
        )
    };
    points[indices::LEFT_EYE_OUTER] = along(0.0, 0.0);
    points[indices::RIGHT_EYE_OUTER] = along(1.0, 0.0);
    points[indices::NOSE_TIP] = along(0.5 + yaw, 0.45);
    points
}

fn new_session() -> AttentionSession<SimulatedPlayer> {
    let config = WatchgateConfig {
        viewport: ViewportConfig {
            width: WIDTH,
            height: HEIGHT,
        },
        ..WatchgateConfig::default()
    };
    AttentionSession::new(&config, SimulatedPlayer::new()).unwrap()
}

fn run_calibration(session: &mut AttentionSession<SimulatedPlayer>) {
    let order = session.calibrator().sequence().ids().to_vec();
    for id in order {
        let (x, y) = session
            .calibrator()
            .target(id)
            .unwrap()
            .pixel_position(&session.viewport());
        for _ in 0..5 {
            session.on_sample(GazeSample::with_landmarks(x, y, face(100.0, 0.0, 0.0)));
            session.confirm_target(id);
        }
    }
}

#[test]
fn full_calibration_then_tracking() {
    let mut session = new_session();
    run_calibration(&mut session);

    assert_eq!(session.calibrator().state(), CalibrationState::Complete);
    assert_eq!(session.status().phase, SessionPhase::Tracking);
    let reference = session.calibrator().reference().copied().unwrap();
    assert!((reference.eye_distance - 100.0).abs() < 1e-3);

    let events = session.drain_events();
    assert_eq!(events.first(), Some(&SessionEvent::CalibrationStarted));
    assert!(matches!(events.get(1), Some(SessionEvent::ReferenceCaptured(_))));
    assert_eq!(
        events.last(),
        Some(&SessionEvent::CalibrationFinished {
            reference_set: true
        })
    );
    let completed = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::TargetCompleted { .. }))
        .count();
    assert_eq!(completed, 9);

    let script: Vec<(GazeSample, bool, ReasonCode)> = vec![
        (GazeSample::with_landmarks(500.0, 400.0, face(100.0, 0.0, 0.0)), true, ReasonCode::None),
        (GazeSample::with_landmarks(10.0, 400.0, face(100.0, 0.0, 0.0)), false, ReasonCode::GazeOutsideSafeZone),
        (GazeSample::with_landmarks(500.0, 400.0, face(70.0, 0.0, 0.0)), false, ReasonCode::FaceTooFar),
        (GazeSample::with_landmarks(500.0, 400.0, face(125.0, 0.0, 0.0)), false, ReasonCode::FaceTooClose),
        (GazeSample::with_landmarks(500.0, 400.0, face(100.0, 0.2, 0.0)), false, ReasonCode::FaceTurned),
        (GazeSample::with_landmarks(500.0, 400.0, face(100.0, 0.0, 0.6)), false, ReasonCode::HeadTilted),
        (GazeSample::with_landmarks(500.0, 400.0, face(100.0, 0.05, 0.0)), true, ReasonCode::None),
        (GazeSample::no_face(), false, ReasonCode::NoFace),
    ];

    for (i, (sample, should_play, reason)) in script.into_iter().enumerate() {
        let outcome = session.on_sample(sample);
        let decision = outcome.decision().copied().unwrap();
        assert_eq!(decision.should_play, should_play, "tick {}", i);
        assert_eq!(decision.reason, reason, "tick {}", i);
    }

    assert_eq!(
        session.gate().backend().calls(),
        &[
            PlaybackCommand::Play,
            PlaybackCommand::Pause,
            PlaybackCommand::Play,
            PlaybackCommand::Pause,
        ]
    );
}

#[test]
fn out_of_order_clicks_are_ignored() {
    let mut session = new_session();
    for id in [0, 1, 2, 3, 5, 6, 7, 8] {
        for _ in 0..5 {
            assert_eq!(session.confirm_target(id), ConfirmOutcome::Rejected);
        }
    }
    assert!(session
        .calibrator()
        .targets()
        .iter()
        .all(|t| t.confirmations == 0));
    assert_eq!(session.calibrator().state(), CalibrationState::AwaitingTarget(0));
}

#[test]
fn recalibration_mid_tracking() {
    let mut session = new_session();
    run_calibration(&mut session);
    session.on_sample(GazeSample::new(500.0, 400.0));
    assert!(session.gate().is_playing());

    session.restart();
    assert!(!session.gate().is_playing());
    assert!(session.calibrator().reference().is_none());
    assert!(matches!(
        session.on_sample(GazeSample::new(500.0, 400.0)),
        TickOutcome::NotCalibrated
    ));

    // A frame-less anchor confirmation leaves pose gating off for the new cycle
    let order = session.calibrator().sequence().ids().to_vec();
    for id in order {
        for _ in 0..5 {
            session.confirm_target_with(id, None);
        }
    }
    assert!(session.is_calibrated());
    assert!(session.calibrator().reference().is_none());

    let decision = *session
        .on_sample(GazeSample::with_landmarks(500.0, 400.0, face(50.0, 0.3, 0.0)))
        .decision()
        .unwrap();
    assert!(decision.should_play);
    assert!(!decision.reason.is_pose_related());
}

#[test]
fn samples_parse_from_json() {
    let line = r#"{"x": 480.0, "y": 410.0, "valid_face": true, "landmarks": [[1.0, 2.0], [3.0, 4.0, 0.5]]}"#;
    let sample: GazeSample = serde_json::from_str(line).unwrap();
    assert_eq!(sample.landmarks().unwrap().len(), 2);

    let mut session = new_session();
    run_calibration(&mut session);
    // two points is not a supported layout: pose checks fail open
    let decision = *session.on_sample(sample).decision().unwrap();
    assert!(decision.should_play);
}
