//! Reference pose storage.
//!
//! Holds the one reference pose captured at the calibration anchor. Writes
//! are crate-private so the calibrator stays the only writer.

use serde::{Deserialize, Serialize};

use crate::head_pose::HeadPose;

/// Head pose snapshot used as the zero point for deviation checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePose {
    pub pose: HeadPose,
    /// Inter-eye distance (px) at capture time
    pub eye_distance: f32,
}

impl ReferencePose {
    pub fn from_pose(pose: HeadPose) -> Self {
        Self {
            eye_distance: pose.eye_distance,
            pose,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferencePoseStore {
    current: Option<ReferencePose>,
}

impl ReferencePoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&ReferencePose> {
        self.current.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Overwrite the stored reference
    pub(crate) fn capture(&mut self, pose: HeadPose) -> ReferencePose {
        let reference = ReferencePose::from_pose(pose);
        self.current = Some(reference);
        reference
    }

    pub(crate) fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(eye_distance: f32, yaw: f32) -> HeadPose {
        HeadPose {
            yaw,
            pitch: 0.1,
            roll: 0.0,
            eye_distance,
        }
    }

    #[test]
    fn test_capture_overwrites() {
        let mut store = ReferencePoseStore::new();
        assert!(!store.is_set());

        store.capture(pose(100.0, 0.0));
        store.capture(pose(80.0, 0.05));

        let reference = store.get().unwrap();
        assert!((reference.eye_distance - 80.0).abs() < 1e-6);
        assert!((reference.pose.yaw - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let mut store = ReferencePoseStore::new();
        store.capture(pose(100.0, 0.0));
        store.clear();
        assert!(store.get().is_none());
    }
}
