//! Status surface: calibration progress, live decision and debug metrics.

use serde::Serialize;
use std::fmt;

use crate::calibration::CalibrationProgress;
use crate::classifier::{AttentionDecision, ReasonCode};

/// Coarse gaze indicator, keeping "no face" apart from "off-screen"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookingState {
    Yes,
    OffScreen,
    NoFace,
}

impl LookingState {
    pub fn from_decision(decision: &AttentionDecision) -> Self {
        if decision.reason == ReasonCode::NoFace {
            LookingState::NoFace
        } else if decision.on_screen {
            LookingState::Yes
        } else {
            LookingState::OffScreen
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookingState::Yes => "Yes",
            LookingState::OffScreen => "No (Off-screen)",
            LookingState::NoFace => "No",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Calibrating,
    Tracking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub phase: SessionPhase,
    pub calibration: CalibrationProgress,
    pub reference_set: bool,
    pub playing: bool,
    pub ticks: u64,
    pub gaze: Option<(f32, f32)>,
    pub looking: Option<LookingState>,
    pub decision: Option<AttentionDecision>,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            SessionPhase::Calibrating => {
                let c = &self.calibration;
                write!(f, "calibrating {}/{}", c.index, c.total)?;
                if let Some(id) = c.active_target {
                    write!(f, " target={} clicks={}/{}", id, c.confirmations, c.required)?;
                }
                Ok(())
            }
            SessionPhase::Tracking => {
                write!(
                    f,
                    "tracking [{}]",
                    if self.playing { "playing" } else { "paused" }
                )?;
                if let Some((x, y)) = self.gaze {
                    write!(f, " gaze=({}, {})", x.round(), y.round())?;
                }
                if let Some(looking) = self.looking {
                    write!(f, " looking={}", looking.label())?;
                }
                if let Some(decision) = &self.decision {
                    write!(f, " | {}", decision.reason)?;
                    if let Some(m) = &decision.pose {
                        write!(
                            f,
                            " | ratio={:.2} yaw={:.3}/{:.3} pitch={:.3}/{:.3} roll={:.3}/{:.3}",
                            m.distance_ratio,
                            m.yaw_delta,
                            m.effective_yaw,
                            m.pitch_delta,
                            m.effective_pitch,
                            m.roll_delta,
                            m.roll_threshold
                        )?;
                    }
                }
                if !self.reference_set {
                    write!(f, " (pose checks off)")?;
                }
                Ok(())
            }
        }
    }
}
