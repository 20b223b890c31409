//! Attention Session
//!
//! Event-driven orchestrator wiring the calibrator, classifier and playback
//! gate together. Each external event is one call:
//! - `on_sample` for every tracking tick
//! - `confirm_target` for every click on a calibration target
//! - `restart` for user-triggered recalibration
//! - `set_viewport` for window resizes
//!
//! No decision reaches the playback gate until calibration is complete.

use std::collections::VecDeque;
use thiserror::Error;

use crate::calibration::{Calibrator, ConfirmOutcome, ReferenceCapture, RestartOutcome};
use crate::classifier::{AttentionClassifier, AttentionDecision, GazeSample};
use crate::config::{ConfigError, WatchgateConfig};
use crate::landmarks::LandmarkPoint;
use crate::playback::{PlaybackBackend, PlaybackCommand, PlaybackGate};
use crate::reference::ReferencePose;
use crate::safe_zone::Viewport;
use crate::status::{LookingState, SessionPhase, StatusSnapshot};

/// Pending events kept between `drain_events` calls; the oldest are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
}

/// Notifications for status/UI consumers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CalibrationStarted,
    /// Recalibration requested; the gaze model's training data should be cleared too
    CalibrationRestarted,
    TargetCompleted {
        target_id: usize,
        next_target: Option<usize>,
    },
    ReferenceCaptured(ReferencePose),
    ReferenceCaptureFailed,
    CalibrationFinished {
        reference_set: bool,
    },
    PlaybackCommanded(PlaybackCommand),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Calibration not finished; playback untouched
    NotCalibrated,
    Decided {
        decision: AttentionDecision,
        command: Option<PlaybackCommand>,
    },
}

impl TickOutcome {
    pub fn decision(&self) -> Option<&AttentionDecision> {
        match self {
            TickOutcome::NotCalibrated => None,
            TickOutcome::Decided { decision, .. } => Some(decision),
        }
    }
}

pub struct AttentionSession<B: PlaybackBackend> {
    calibrator: Calibrator,
    classifier: AttentionClassifier,
    gate: PlaybackGate<B>,
    viewport: Viewport,
    current_landmarks: Option<Vec<LandmarkPoint>>,
    last_gaze: Option<(f32, f32)>,
    last_decision: Option<AttentionDecision>,
    ticks: u64,
    events: VecDeque<SessionEvent>,
}

impl<B: PlaybackBackend> AttentionSession<B> {
    pub fn new(config: &WatchgateConfig, backend: B) -> Result<Self, SessionError> {
        config.validate()?;
        let calibrator = Calibrator::with_config(&config.calibration)?;
        let viewport = checked_viewport(config.viewport.to_viewport())?;

        log::info!(
            "Attention session started: {} calibration targets, viewport {}x{}",
            calibrator.sequence().len(),
            viewport.width,
            viewport.height
        );

        Ok(Self {
            calibrator,
            classifier: AttentionClassifier::with_config(config.classifier.clone()),
            gate: PlaybackGate::new(backend),
            viewport,
            current_landmarks: None,
            last_gaze: None,
            last_decision: None,
            ticks: 0,
            events: VecDeque::from([SessionEvent::CalibrationStarted]),
        })
    }

    pub fn with_defaults(backend: B) -> Result<Self, SessionError> {
        Self::new(&WatchgateConfig::default(), backend)
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_complete()
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn classifier(&self) -> &AttentionClassifier {
        &self.classifier
    }

    pub fn gate(&self) -> &PlaybackGate<B> {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut PlaybackGate<B> {
        &mut self.gate
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_decision(&self) -> Option<&AttentionDecision> {
        self.last_decision.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<(), SessionError> {
        self.viewport = checked_viewport(viewport)?;
        Ok(())
    }

    /// Process one tracking tick
    pub fn on_sample(&mut self, sample: GazeSample) -> TickOutcome {
        let outcome = if self.calibrator.is_complete() {
            self.ticks += 1;
            let decision = self.classifier.classify_sample(
                &sample,
                self.calibrator.reference(),
                &self.viewport,
            );
            log::trace!(
                "tick {}: gaze=({:.1}, {:.1}) play={} reason={:?}",
                self.ticks,
                sample.x,
                sample.y,
                decision.should_play,
                decision.reason
            );

            let command = self.gate.apply(decision.should_play);
            if let Some(cmd) = command {
                self.push_event(SessionEvent::PlaybackCommanded(cmd));
            }

            self.last_gaze = sample.valid_face.then_some((sample.x, sample.y));
            self.last_decision = Some(decision);
            TickOutcome::Decided { decision, command }
        } else {
            TickOutcome::NotCalibrated
        };

        self.current_landmarks = if sample.valid_face {
            sample.landmarks
        } else {
            None
        };

        outcome
    }

    /// Confirm a calibration target against the most recent frame's landmarks
    pub fn confirm_target(&mut self, target_id: usize) -> ConfirmOutcome {
        let outcome = self
            .calibrator
            .confirm(target_id, self.current_landmarks.as_deref());
        self.record_confirm(&outcome);
        outcome
    }

    /// Confirm a calibration target with explicitly supplied landmarks
    pub fn confirm_target_with(
        &mut self,
        target_id: usize,
        landmarks: Option<&[LandmarkPoint]>,
    ) -> ConfirmOutcome {
        let outcome = self.calibrator.confirm(target_id, landmarks);
        self.record_confirm(&outcome);
        outcome
    }

    fn record_confirm(&mut self, outcome: &ConfirmOutcome) {
        let (target_id, next_target) = match *outcome {
            ConfirmOutcome::TargetDone {
                target_id,
                next_target,
                ..
            } => (target_id, Some(next_target)),
            ConfirmOutcome::Finished { target_id, .. } => (target_id, None),
            _ => return,
        };

        match outcome.reference() {
            Some(ReferenceCapture::Captured(reference)) => {
                self.push_event(SessionEvent::ReferenceCaptured(reference));
            }
            Some(ReferenceCapture::Failed) => {
                self.push_event(SessionEvent::ReferenceCaptureFailed);
            }
            None => {}
        }

        self.push_event(SessionEvent::TargetCompleted {
            target_id,
            next_target,
        });

        if next_target.is_none() {
            self.push_event(SessionEvent::CalibrationFinished {
                reference_set: self.calibrator.reference().is_some(),
            });
        }
    }

    /// Discard calibration and start over; playback is paused
    pub fn restart(&mut self) -> RestartOutcome {
        let outcome = self.calibrator.restart();
        self.last_decision = None;
        self.last_gaze = None;
        self.current_landmarks = None;

        self.push_event(SessionEvent::CalibrationRestarted);
        if let Some(cmd) = self.gate.halt() {
            self.push_event(SessionEvent::PlaybackCommanded(cmd));
        }
        outcome
    }

    /// Take every pending event, oldest first.
    ///
    /// Embedders should drain after each call; at most `MAX_PENDING_EVENTS`
    /// are retained otherwise.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    fn push_event(&mut self, event: SessionEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            if let Some(dropped) = self.events.pop_front() {
                log::trace!("Event queue full, dropping {:?}", dropped);
            }
        }
        self.events.push_back(event);
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            phase: if self.calibrator.is_complete() {
                SessionPhase::Tracking
            } else {
                SessionPhase::Calibrating
            },
            calibration: self.calibrator.progress(),
            reference_set: self.calibrator.reference().is_some(),
            playing: self.gate.is_playing(),
            ticks: self.ticks,
            gaze: self.last_gaze,
            looking: self.last_decision.as_ref().map(LookingState::from_decision),
            decision: self.last_decision,
        }
    }
}

fn checked_viewport(viewport: Viewport) -> Result<Viewport, SessionError> {
    if viewport.is_valid() {
        Ok(viewport)
    } else {
        Err(SessionError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        })
    }
}
