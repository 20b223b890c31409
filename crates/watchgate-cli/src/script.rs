//! Recorded session scripts: one JSON event per line.
//!
//! ```text
//! {"type": "viewport", "width": 1280, "height": 720}
//! {"type": "gaze", "x": 640, "y": 360, "landmarks": [[...], ...]}
//! {"type": "confirm", "target": 4}
//! {"type": "no_face"}
//! {"type": "restart"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use watchgate_core::GazeSample;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Cannot read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Viewport { width: f32, height: f32 },
    Gaze(GazeSample),
    NoFace,
    Confirm { target: usize },
    Restart,
}

/// A parsed event with the script line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub event: ScriptEvent,
}

pub fn load(path: &Path) -> Result<Vec<ScriptLine>, ScriptError> {
    let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut events = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let line = index + 1;
        let event = serde_json::from_str(text).map_err(|source| ScriptError::Parse { line, source })?;
        events.push(ScriptLine { line, event });
    }
    Ok(events)
}
