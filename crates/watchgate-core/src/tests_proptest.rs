use proptest::prelude::*;

/// Property-based checks for sequencing and classification invariants

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationState, Calibrator};
    use crate::classifier::{AttentionClassifier, GazeSample, ReasonCode};
    use crate::head_pose::HeadPose;
    use crate::reference::ReferencePose;
    use crate::safe_zone::Viewport;

    fn arb_pose() -> impl Strategy<Value = HeadPose> {
        (-1.0f32..1.0, -1.0f32..1.0, -3.1f32..3.1, 10.0f32..400.0).prop_map(
            |(yaw, pitch, roll, eye_distance)| HeadPose {
                yaw,
                pitch,
                roll,
                eye_distance,
            },
        )
    }

    fn arb_sample() -> impl Strategy<Value = GazeSample> {
        (-500.0f32..2500.0, -500.0f32..2000.0, any::<bool>()).prop_map(|(x, y, valid)| {
            if valid {
                GazeSample::new(x, y)
            } else {
                GazeSample::no_face()
            }
        })
    }

    // =========================================================================
    // Calibration sequencing
    // =========================================================================
    proptest! {
        #[test]
        fn test_only_active_target_counts(ids in prop::collection::vec(0usize..9, 0..120)) {
            let mut calibrator = Calibrator::new();

            for id in ids {
                let active = calibrator.active_target().map(|t| t.id);
                let before: Vec<u32> = calibrator.targets().iter().map(|t| t.confirmations).collect();

                let outcome = calibrator.confirm(id, None);
                let after: Vec<u32> = calibrator.targets().iter().map(|t| t.confirmations).collect();

                if active == Some(id) {
                    prop_assert!(!outcome.is_rejected());
                    prop_assert_eq!(after[id], before[id] + 1);
                } else {
                    prop_assert!(outcome.is_rejected());
                    prop_assert_eq!(&after, &before);
                }
                prop_assert!(after.iter().all(|&c| c <= 5));
            }
        }

        #[test]
        fn test_active_only_run_advances_every_five(extra in 0usize..20) {
            let mut calibrator = Calibrator::new();
            let order = calibrator.sequence().ids().to_vec();

            for (index, &id) in order.iter().enumerate() {
                prop_assert_eq!(calibrator.state(), CalibrationState::AwaitingTarget(index));
                for _ in 0..5 {
                    calibrator.confirm(id, None);
                }
                prop_assert!(calibrator.target(id).unwrap().done);
            }
            prop_assert_eq!(calibrator.state(), CalibrationState::Complete);

            for n in 0..extra {
                calibrator.confirm(order[n % order.len()], None);
            }
            prop_assert_eq!(calibrator.state(), CalibrationState::Complete);
            prop_assert!(calibrator.targets().iter().all(|t| t.confirmations == 5));
        }
    }

    // =========================================================================
    // Classification
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_classify_idempotent(
            sample in arb_sample(),
            pose in prop::option::of(arb_pose()),
            reference in prop::option::of(arb_pose()),
        ) {
            let classifier = AttentionClassifier::new();
            let viewport = Viewport::new(1920.0, 1080.0);
            let reference = reference.map(ReferencePose::from_pose);

            let first = classifier.classify(&sample, pose.as_ref(), reference.as_ref(), &viewport);
            let second = classifier.classify(&sample, pose.as_ref(), reference.as_ref(), &viewport);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.should_play, first.reason == ReasonCode::None);
        }

        #[test]
        fn test_no_pose_reasons_without_reference(
            sample in arb_sample(),
            pose in prop::option::of(arb_pose()),
        ) {
            let classifier = AttentionClassifier::new();
            let viewport = Viewport::new(1000.0, 800.0);

            let decision = classifier.classify(&sample, pose.as_ref(), None, &viewport);
            prop_assert!(matches!(
                decision.reason,
                ReasonCode::None | ReasonCode::GazeOutsideSafeZone | ReasonCode::NoFace
            ));
            prop_assert!(decision.pose.is_none());
        }

        #[test]
        fn test_far_face_never_plays(
            sample in arb_sample(),
            ratio in 0.05f32..0.79,
        ) {
            let classifier = AttentionClassifier::new();
            let viewport = Viewport::new(1000.0, 800.0);
            let reference = ReferencePose::from_pose(HeadPose { yaw: 0.0, pitch: 0.3, roll: 0.0, eye_distance: 100.0 });
            let pose = HeadPose { yaw: 0.0, pitch: 0.3, roll: 0.0, eye_distance: 100.0 * ratio };

            let decision = classifier.classify(&sample, Some(&pose), Some(&reference), &viewport);
            prop_assert!(!decision.should_play);
            if sample.valid_face {
                prop_assert_eq!(decision.reason, ReasonCode::FaceTooFar);
            }
        }
    }
}
