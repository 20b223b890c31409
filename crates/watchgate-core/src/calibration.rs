//! Calibration Sequencing
//!
//! Drives the user through a fixed, ordered set of on-screen targets:
//! - Only the active target accepts confirmations
//! - A target is done after a fixed number of confirmations
//! - Completing the anchor target captures the reference head pose
//! - Completing the last target finishes calibration

use serde::Serialize;

use crate::config::{CalibrationConfig, ConfigError};
use crate::head_pose;
use crate::landmarks::LandmarkPoint;
use crate::reference::{ReferencePose, ReferencePoseStore};
use crate::safe_zone::Viewport;

/// Opacity floor so an untouched target stays visible
const MIN_TARGET_OPACITY: f32 = 0.2;

/// A single calibration point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationTarget {
    pub id: usize,
    /// Position as fractions of viewport width and height
    pub position: [f32; 2],
    pub confirmations: u32,
    pub is_anchor: bool,
    pub done: bool,
}

impl CalibrationTarget {
    pub fn pixel_position(&self, viewport: &Viewport) -> (f32, f32) {
        (
            self.position[0] * viewport.width,
            self.position[1] * viewport.height,
        )
    }

    /// Visual progress feedback in [0.2, 1.0]
    pub fn opacity(&self, required: u32) -> f32 {
        if required == 0 {
            return 1.0;
        }
        (self.confirmations as f32 / required as f32).clamp(MIN_TARGET_OPACITY, 1.0)
    }

    fn reset(&mut self) {
        self.confirmations = 0;
        self.done = false;
    }
}

/// Presentation order of target ids, anchor first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalibrationSequence {
    order: Vec<usize>,
}

impl CalibrationSequence {
    /// Anchor first, then the remaining ids in ascending order
    pub fn anchor_first(target_count: usize, anchor: usize) -> Self {
        let mut order = Vec::with_capacity(target_count);
        if anchor < target_count {
            order.push(anchor);
        }
        order.extend((0..target_count).filter(|&id| id != anchor));
        Self { order }
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.order.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[usize] {
        &self.order
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibrationState {
    /// Waiting on the target at this sequence index
    AwaitingTarget(usize),
    Complete,
}

/// Result of the reference capture attempt made at the anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceCapture {
    Captured(ReferencePose),
    /// No pose could be derived from the frame; pose gating stays off
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfirmOutcome {
    /// Not the active target, or calibration already complete
    Rejected,
    /// Counted, threshold not reached yet
    Progress {
        target_id: usize,
        confirmations: u32,
        required: u32,
    },
    /// Target done, next target now active
    TargetDone {
        target_id: usize,
        next_target: usize,
        reference: Option<ReferenceCapture>,
    },
    /// Last target done, calibration complete
    Finished {
        target_id: usize,
        reference: Option<ReferenceCapture>,
    },
}

impl ConfirmOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ConfirmOutcome::Rejected)
    }

    pub fn reference(&self) -> Option<ReferenceCapture> {
        match self {
            ConfirmOutcome::TargetDone { reference, .. }
            | ConfirmOutcome::Finished { reference, .. } => *reference,
            _ => None,
        }
    }
}

/// What a restart discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartOutcome {
    pub previous_state: CalibrationState,
    pub had_reference: bool,
}

/// Externally visible progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationProgress {
    /// Number of targets already done
    pub index: usize,
    pub total: usize,
    pub active_target: Option<usize>,
    pub confirmations: u32,
    pub required: u32,
    pub opacity: f32,
    pub complete: bool,
}

pub struct Calibrator {
    targets: Vec<CalibrationTarget>,
    sequence: CalibrationSequence,
    required: u32,
    state: CalibrationState,
    reference: ReferencePoseStore,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::build(&CalibrationConfig::default())
    }

    pub fn with_config(config: &CalibrationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &CalibrationConfig) -> Self {
        let targets = config
            .targets
            .iter()
            .enumerate()
            .map(|(id, &position)| CalibrationTarget {
                id,
                position,
                confirmations: 0,
                is_anchor: id == config.anchor_index,
                done: false,
            })
            .collect::<Vec<_>>();

        let sequence = CalibrationSequence::anchor_first(targets.len(), config.anchor_index);
        let state = Self::initial_state(&sequence);

        Self {
            targets,
            sequence,
            required: config.confirmations_per_target,
            state,
            reference: ReferencePoseStore::new(),
        }
    }

    fn initial_state(sequence: &CalibrationSequence) -> CalibrationState {
        if sequence.is_empty() {
            CalibrationState::Complete
        } else {
            CalibrationState::AwaitingTarget(0)
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == CalibrationState::Complete
    }

    pub fn targets(&self) -> &[CalibrationTarget] {
        &self.targets
    }

    pub fn target(&self, id: usize) -> Option<&CalibrationTarget> {
        self.targets.get(id)
    }

    pub fn sequence(&self) -> &CalibrationSequence {
        &self.sequence
    }

    pub fn required_confirmations(&self) -> u32 {
        self.required
    }

    /// The only target currently accepting confirmations
    pub fn active_target(&self) -> Option<&CalibrationTarget> {
        match self.state {
            CalibrationState::AwaitingTarget(index) => {
                self.sequence.get(index).and_then(|id| self.targets.get(id))
            }
            CalibrationState::Complete => None,
        }
    }

    pub fn reference(&self) -> Option<&ReferencePose> {
        self.reference.get()
    }

    /// Count one confirmation on `target_id`.
    ///
    /// `landmarks` is the current frame's landmark set, used only when this
    /// confirmation completes the anchor target.
    pub fn confirm(&mut self, target_id: usize, landmarks: Option<&[LandmarkPoint]>) -> ConfirmOutcome {
        let index = match self.state {
            CalibrationState::AwaitingTarget(index) => index,
            CalibrationState::Complete => {
                log::debug!("Calibration complete, ignoring confirmation for target {}", target_id);
                return ConfirmOutcome::Rejected;
            }
        };

        let Some(active_id) = self.sequence.get(index) else {
            return ConfirmOutcome::Rejected;
        };
        if active_id != target_id {
            log::debug!(
                "Rejected confirmation for target {} (active target is {})",
                target_id, active_id
            );
            return ConfirmOutcome::Rejected;
        }

        let required = self.required;
        let target = &mut self.targets[active_id];
        target.confirmations += 1;
        let confirmations = target.confirmations;

        if confirmations < required {
            return ConfirmOutcome::Progress {
                target_id,
                confirmations,
                required,
            };
        }

        target.done = true;
        let is_anchor = target.is_anchor;
        log::info!("Calibration target {} done ({}/{})", target_id, index + 1, self.sequence.len());

        let reference = is_anchor.then(|| self.capture_reference(landmarks));

        let next_index = index + 1;
        match self.sequence.get(next_index) {
            Some(next_target) => {
                self.state = CalibrationState::AwaitingTarget(next_index);
                ConfirmOutcome::TargetDone {
                    target_id,
                    next_target,
                    reference,
                }
            }
            None => {
                self.state = CalibrationState::Complete;
                log::info!(
                    "Calibration finished (reference pose {})",
                    if self.reference.is_set() { "set" } else { "unset" }
                );
                ConfirmOutcome::Finished {
                    target_id,
                    reference,
                }
            }
        }
    }

    fn capture_reference(&mut self, landmarks: Option<&[LandmarkPoint]>) -> ReferenceCapture {
        match landmarks.and_then(head_pose::estimate) {
            Some(pose) => {
                let reference = self.reference.capture(pose);
                log::info!(
                    "Reference pose captured: yaw={:.3} pitch={:.3} roll={:.3} eye_distance={:.1}",
                    pose.yaw, pose.pitch, pose.roll, pose.eye_distance
                );
                ReferenceCapture::Captured(reference)
            }
            None => {
                log::warn!("Reference pose capture failed; pose checks disabled until recalibration");
                ReferenceCapture::Failed
            }
        }
    }

    /// Reset every target, clear the reference and start over
    pub fn restart(&mut self) -> RestartOutcome {
        let outcome = RestartOutcome {
            previous_state: self.state,
            had_reference: self.reference.is_set(),
        };

        for target in &mut self.targets {
            target.reset();
        }
        self.reference.clear();
        self.state = Self::initial_state(&self.sequence);

        log::info!("Calibration restarted (was {:?})", outcome.previous_state);
        outcome
    }

    pub fn progress(&self) -> CalibrationProgress {
        let total = self.sequence.len();
        match self.active_target() {
            Some(target) => CalibrationProgress {
                index: self.targets.iter().filter(|t| t.done).count(),
                total,
                active_target: Some(target.id),
                confirmations: target.confirmations,
                required: self.required,
                opacity: target.opacity(self.required),
                complete: false,
            },
            None => CalibrationProgress {
                index: total,
                total,
                active_target: None,
                confirmations: 0,
                required: self.required,
                opacity: 1.0,
                complete: true,
            },
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}
