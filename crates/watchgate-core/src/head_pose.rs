//! Head Pose Geometry
//!
//! Derives a dimensionless head pose from three dense-mesh landmarks:
//! - Yaw from where the nose tip projects onto the eye-to-eye segment
//! - Pitch from the vertical nose offset, scaled by eye distance
//! - Roll from the angle of the eye-to-eye vector
//!
//! All functions here are pure.

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkPoint, PoseAnchors};

/// Head pose for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadPose {
    /// Nose projection along the eye segment, minus 0.5 (0 = centered)
    pub yaw: f32,
    /// Nose offset below the eye line, in eye distances
    pub pitch: f32,
    /// Eye-line angle from horizontal (radians)
    pub roll: f32,
    /// Eye-to-eye distance in pixels, always > 0
    pub eye_distance: f32,
}

/// Estimate head pose from a raw landmark set.
///
/// Returns `None` for empty, sparse, or otherwise unsupported layouts and
/// for degenerate geometry (coincident eye landmarks).
pub fn estimate(landmarks: &[LandmarkPoint]) -> Option<HeadPose> {
    let anchors = PoseAnchors::select(landmarks)?;
    from_anchors(&anchors)
}

/// Estimate head pose from already-selected anchor points
pub fn from_anchors(anchors: &PoseAnchors) -> Option<HeadPose> {
    let PoseAnchors {
        left_eye,
        right_eye,
        nose,
    } = *anchors;

    let eye_dx = right_eye.x - left_eye.x;
    let eye_dy = right_eye.y - left_eye.y;
    let eye_distance_sq = eye_dx * eye_dx + eye_dy * eye_dy;
    let eye_distance = eye_distance_sq.sqrt();

    if eye_distance <= 0.0 || !eye_distance.is_finite() {
        return None;
    }

    let nose_dx = nose.x - left_eye.x;
    let nose_dy = nose.y - left_eye.y;
    let yaw = (nose_dx * eye_dx + nose_dy * eye_dy) / eye_distance_sq - 0.5;

    let mean_eye_y = (left_eye.y + right_eye.y) / 2.0;
    let pitch = (nose.y - mean_eye_y) / eye_distance;

    let roll = eye_dy.atan2(eye_dx);

    Some(HeadPose {
        yaw,
        pitch,
        roll,
        eye_distance,
    })
}
