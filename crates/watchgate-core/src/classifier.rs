//! Attention Classification
//!
//! Fuses gaze position, safe-zone geometry and head-pose deviation from the
//! calibrated reference into a play/pause decision with a reason code.
//!
//! Check order (first failure sets the reason):
//! 1. Face present
//! 2. Viewer distance (eye-distance ratio vs reference)
//! 3. Gaze inside the safe zone
//! 4. Yaw, then pitch, then roll deviation vs distance-scaled thresholds
//!
//! Pose checks only run when both a reference and a current pose exist.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassifierConfig;
use crate::head_pose::{self, HeadPose};
use crate::landmarks::LandmarkPoint;
use crate::reference::ReferencePose;
use crate::safe_zone::Viewport;

/// One tracking tick from the gaze provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_valid_face")]
    pub valid_face: bool,
    #[serde(default)]
    pub landmarks: Option<Vec<LandmarkPoint>>,
}

fn default_valid_face() -> bool {
    true
}

impl GazeSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            valid_face: true,
            landmarks: None,
        }
    }

    pub fn with_landmarks(x: f32, y: f32, landmarks: Vec<LandmarkPoint>) -> Self {
        Self {
            landmarks: Some(landmarks),
            ..Self::new(x, y)
        }
    }

    /// The provider reported no face or no eyes this tick
    pub fn no_face() -> Self {
        Self {
            valid_face: false,
            ..Self::default()
        }
    }

    pub fn landmarks(&self) -> Option<&[LandmarkPoint]> {
        self.landmarks.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    None,
    OffScreen,
    GazeOutsideSafeZone,
    FaceTooFar,
    FaceTooClose,
    FaceTurned,
    FacePitched,
    HeadTilted,
    NoFace,
}

impl ReasonCode {
    /// Reasons that can only come from pose gating
    pub fn is_pose_related(&self) -> bool {
        matches!(
            self,
            ReasonCode::FaceTooFar
                | ReasonCode::FaceTooClose
                | ReasonCode::FaceTurned
                | ReasonCode::FacePitched
                | ReasonCode::HeadTilted
        )
    }

    pub fn message(&self) -> &'static str {
        match self {
            ReasonCode::None => "Watching",
            ReasonCode::OffScreen => "Looking off-screen",
            ReasonCode::GazeOutsideSafeZone => "Gaze outside the safe zone",
            ReasonCode::FaceTooFar => "Face too far from the screen",
            ReasonCode::FaceTooClose => "Face too close to the screen",
            ReasonCode::FaceTurned => "Face turned away",
            ReasonCode::FacePitched => "Face tilted up or down",
            ReasonCode::HeadTilted => "Head tilted sideways",
            ReasonCode::NoFace => "Face not found / Eyes closed",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Pose deviation diagnostics for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseMetrics {
    /// Current / reference eye distance, unclamped
    pub distance_ratio: f32,
    /// Ratio after clamping, used for threshold scaling
    pub scale_ratio: f32,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
    pub roll_delta: f32,
    pub effective_yaw: f32,
    pub effective_pitch: f32,
    pub roll_threshold: f32,
}

impl PoseMetrics {
    pub fn yaw_exceeded(&self) -> bool {
        self.yaw_delta > self.effective_yaw
    }

    pub fn pitch_exceeded(&self) -> bool {
        self.pitch_delta > self.effective_pitch
    }

    pub fn roll_exceeded(&self) -> bool {
        self.roll_delta > self.roll_threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttentionDecision {
    pub should_play: bool,
    pub reason: ReasonCode,
    pub in_safe_zone: bool,
    pub on_screen: bool,
    /// Present only when pose gating ran
    pub pose: Option<PoseMetrics>,
}

impl AttentionDecision {
    fn no_face() -> Self {
        Self {
            should_play: false,
            reason: ReasonCode::NoFace,
            in_safe_zone: false,
            on_screen: false,
            pose: None,
        }
    }
}

/// Stateless play/pause classifier
#[derive(Debug, Clone, Default)]
pub struct AttentionClassifier {
    config: ClassifierConfig,
}

impl AttentionClassifier {
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a sample, deriving the pose from its own landmarks
    pub fn classify_sample(
        &self,
        sample: &GazeSample,
        reference: Option<&ReferencePose>,
        viewport: &Viewport,
    ) -> AttentionDecision {
        let pose = sample.landmarks().and_then(head_pose::estimate);
        self.classify(sample, pose.as_ref(), reference, viewport)
    }

    pub fn classify(
        &self,
        sample: &GazeSample,
        pose: Option<&HeadPose>,
        reference: Option<&ReferencePose>,
        viewport: &Viewport,
    ) -> AttentionDecision {
        if !sample.valid_face {
            return AttentionDecision::no_face();
        }

        let zone = viewport.safe_zone(&self.config.margins);
        let in_safe_zone = zone.contains(sample.x, sample.y);
        let on_screen = viewport.contains(sample.x, sample.y);

        let metrics = match (pose, reference) {
            (Some(pose), Some(reference)) => self.pose_metrics(pose, reference),
            _ => None,
        };

        let mut reason = ReasonCode::None;

        if let Some(m) = &metrics {
            if m.distance_ratio < self.config.min_distance_ratio {
                reason = ReasonCode::FaceTooFar;
            } else if m.distance_ratio > self.config.max_distance_ratio {
                reason = ReasonCode::FaceTooClose;
            }
        }

        if reason == ReasonCode::None && !in_safe_zone {
            reason = if self.config.report_off_screen && !on_screen {
                ReasonCode::OffScreen
            } else {
                ReasonCode::GazeOutsideSafeZone
            };
        }

        if reason == ReasonCode::None {
            if let Some(m) = &metrics {
                if m.yaw_exceeded() {
                    reason = ReasonCode::FaceTurned;
                } else if m.pitch_exceeded() {
                    reason = ReasonCode::FacePitched;
                } else if m.roll_exceeded() {
                    reason = ReasonCode::HeadTilted;
                }
            }
        }

        AttentionDecision {
            should_play: reason == ReasonCode::None,
            reason,
            in_safe_zone,
            on_screen,
            pose: metrics,
        }
    }

    /// Deviation metrics, or `None` if the reference distance is unusable
    pub fn pose_metrics(&self, pose: &HeadPose, reference: &ReferencePose) -> Option<PoseMetrics> {
        if reference.eye_distance <= 0.0 || !reference.eye_distance.is_finite() {
            return None;
        }

        let distance_ratio = pose.eye_distance / reference.eye_distance;
        let scale_ratio = distance_ratio.clamp(self.config.ratio_clamp_min, self.config.ratio_clamp_max);

        Some(PoseMetrics {
            distance_ratio,
            scale_ratio,
            yaw_delta: (pose.yaw - reference.pose.yaw).abs(),
            pitch_delta: (pose.pitch - reference.pose.pitch).abs(),
            roll_delta: (pose.roll - reference.pose.roll).abs(),
            effective_yaw: self.config.base_yaw_threshold * scale_ratio,
            effective_pitch: self.config.base_pitch_threshold * scale_ratio,
            roll_threshold: self.config.roll_threshold,
        })
    }
}
