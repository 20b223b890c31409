//! # watchgate-core
//!
//! Attention inference for gaze-gated media playback.
//!
//! This crate provides:
//! - **Head pose geometry**: yaw, pitch, roll and eye distance from dense face-mesh landmarks
//! - **Calibration**: ordered target sequencing with reference-pose capture at the anchor
//! - **Classification**: safe-zone and pose-deviation checks fused into a play/pause decision
//! - **Playback gating**: at most one play or pause call per state change
//!
//! ## Example
//!
//! ```ignore
//! use watchgate_core::{AttentionSession, GazeSample, SimulatedPlayer};
//!
//! let mut session = AttentionSession::with_defaults(SimulatedPlayer::new())?;
//!
//! // Calibration: feed frames and forward clicks on the active target
//! session.on_sample(GazeSample::with_landmarks(960.0, 540.0, landmarks));
//! session.confirm_target(4);
//!
//! // Tracking: every tick yields a decision once calibration is complete
//! let outcome = session.on_sample(GazeSample::new(x, y));
//! println!("{}", session.status());
//! ```

pub mod calibration;
pub mod classifier;
pub mod config;
pub mod head_pose;
pub mod landmarks;
pub mod playback;
pub mod reference;
pub mod safe_zone;
pub mod session;
pub mod status;

#[cfg(test)]
mod tests_proptest;

pub use calibration::{
    CalibrationProgress, CalibrationSequence, CalibrationState, CalibrationTarget, Calibrator,
    ConfirmOutcome, ReferenceCapture, RestartOutcome,
};
pub use classifier::{AttentionClassifier, AttentionDecision, GazeSample, PoseMetrics, ReasonCode};
pub use config::{CalibrationConfig, ClassifierConfig, ConfigError, ViewportConfig, WatchgateConfig};
pub use head_pose::HeadPose;
pub use landmarks::{LandmarkLayout, LandmarkPoint};
pub use playback::{PlaybackBackend, PlaybackCommand, PlaybackGate, SimulatedPlayer};
pub use reference::{ReferencePose, ReferencePoseStore};
pub use safe_zone::{SafeZone, SafeZoneMargins, Viewport};
pub use session::{AttentionSession, SessionError, SessionEvent, TickOutcome, MAX_PENDING_EVENTS};
pub use status::{LookingState, SessionPhase, StatusSnapshot};
