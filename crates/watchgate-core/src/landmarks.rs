//! Facial Landmark Layouts
//!
//! Landmark points as delivered by the external tracker, and the layout
//! detection that decides whether head-pose geometry can be computed.

use serde::{Deserialize, Serialize};

/// Dense face-mesh landmark indices (MediaPipe Face Mesh numbering)
pub mod indices {
    /// Outer corner of the eye on the image left
    pub const LEFT_EYE_OUTER: usize = 33;
    /// Outer corner of the eye on the image right
    pub const RIGHT_EYE_OUTER: usize = 263;
    /// Nose tip
    pub const NOSE_TIP: usize = 4;
}

/// Point count of the dense mesh without iris refinement
pub const DENSE_MESH_POINTS: usize = 468;
/// Point count of the dense mesh with iris refinement
pub const DENSE_MESH_REFINED_POINTS: usize = 478;
/// Point counts produced by legacy sparse trackers (68-point dlib, 71-point clmtrackr)
pub const SPARSE_LEGACY_POINTS: [usize; 2] = [68, 71];

/// A single landmark in image pixel coordinates.
///
/// Trackers emit either `[x, y]` or `[x, y, z]`; `z` defaults to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint", into = "RawPoint")]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar distance to another point (depth ignored)
    pub fn distance(&self, other: &LandmarkPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Planar([f32; 2]),
    Spatial([f32; 3]),
}

impl From<RawPoint> for LandmarkPoint {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Planar([x, y]) => Self::new(x, y),
            RawPoint::Spatial([x, y, z]) => Self::with_depth(x, y, z),
        }
    }
}

impl From<LandmarkPoint> for RawPoint {
    fn from(p: LandmarkPoint) -> Self {
        RawPoint::Spatial([p.x, p.y, p.z])
    }
}

/// Landmark layout, resolved once per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkLayout {
    /// Dense face mesh; the only layout with supported pose geometry
    DenseMesh,
    /// Legacy sparse tracker output; recognised but not supported
    SparseLegacy,
    /// Anything else, including empty input
    Unsupported,
}

impl LandmarkLayout {
    pub fn detect(points: &[LandmarkPoint]) -> Self {
        match points.len() {
            DENSE_MESH_POINTS | DENSE_MESH_REFINED_POINTS => Self::DenseMesh,
            n if SPARSE_LEGACY_POINTS.contains(&n) => Self::SparseLegacy,
            _ => Self::Unsupported,
        }
    }

    pub fn supports_pose(&self) -> bool {
        matches!(self, Self::DenseMesh)
    }
}

/// The three points head-pose geometry is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseAnchors {
    pub left_eye: LandmarkPoint,
    pub right_eye: LandmarkPoint,
    pub nose: LandmarkPoint,
}

impl PoseAnchors {
    /// Select the eye-outer and nose-tip landmarks from a dense mesh.
    ///
    /// Returns `None` for any non-dense layout or non-finite coordinates.
    pub fn select(points: &[LandmarkPoint]) -> Option<Self> {
        if !LandmarkLayout::detect(points).supports_pose() {
            return None;
        }

        let left_eye = *points.get(indices::LEFT_EYE_OUTER)?;
        let right_eye = *points.get(indices::RIGHT_EYE_OUTER)?;
        let nose = *points.get(indices::NOSE_TIP)?;

        if !(left_eye.is_finite() && right_eye.is_finite() && nose.is_finite()) {
            return None;
        }

        Some(Self {
            left_eye,
            right_eye,
            nose,
        })
    }
}
