//! Playback gating.
//!
//! The media backend is external; `PlaybackGate` turns per-tick decisions
//! into play/pause calls and never issues a call that would not change the
//! backend's reported state.

use serde::Serialize;

/// Media player binding
pub trait PlaybackBackend {
    fn is_playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
}

impl<B: PlaybackBackend + ?Sized> PlaybackBackend for Box<B> {
    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackCommand {
    Play,
    Pause,
}

pub struct PlaybackGate<B: PlaybackBackend> {
    backend: B,
    plays_issued: u64,
    pauses_issued: u64,
}

impl<B: PlaybackBackend> PlaybackGate<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            plays_issued: 0,
            pauses_issued: 0,
        }
    }

    /// Apply a decision; returns the command issued, if any
    pub fn apply(&mut self, should_play: bool) -> Option<PlaybackCommand> {
        match (should_play, self.backend.is_playing()) {
            (true, false) => {
                self.backend.play();
                self.plays_issued += 1;
                log::debug!("Playback: play");
                Some(PlaybackCommand::Play)
            }
            (false, true) => {
                self.backend.pause();
                self.pauses_issued += 1;
                log::debug!("Playback: pause");
                Some(PlaybackCommand::Pause)
            }
            _ => None,
        }
    }

    /// Pause if playing
    pub fn halt(&mut self) -> Option<PlaybackCommand> {
        self.apply(false)
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_playing()
    }

    pub fn plays_issued(&self) -> u64 {
        self.plays_issued
    }

    pub fn pauses_issued(&self) -> u64 {
        self.pauses_issued
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

/// In-memory player that records every call it receives
#[derive(Debug, Clone, Default)]
pub struct SimulatedPlayer {
    playing: bool,
    calls: Vec<PlaybackCommand>,
}

impl SimulatedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[PlaybackCommand] {
        &self.calls
    }

    /// Simulate the player changing state on its own (e.g. media ended)
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }
}

impl PlaybackBackend for SimulatedPlayer {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        self.playing = true;
        self.calls.push(PlaybackCommand::Play);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.calls.push(PlaybackCommand::Pause);
    }
}
