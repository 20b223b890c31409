//! Viewport and safe-zone geometry

use serde::{Deserialize, Serialize};

/// Visible viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether a point lies on screen (inclusive bounds)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }

    pub fn safe_zone(&self, margins: &SafeZoneMargins) -> SafeZone {
        SafeZone::within(self, margins)
    }
}

/// Fractional margins trimmed from each side of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeZoneMargins {
    /// Fraction of width removed on the left and on the right
    pub x_fraction: f32,
    /// Fraction of height removed on the top and on the bottom
    pub y_fraction: f32,
}

impl Default for SafeZoneMargins {
    fn default() -> Self {
        Self {
            x_fraction: 0.15,
            y_fraction: 0.28,
        }
    }
}

/// Sub-rectangle of the viewport where gaze counts as attentive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl SafeZone {
    pub fn within(viewport: &Viewport, margins: &SafeZoneMargins) -> Self {
        let margin_x = viewport.width * margins.x_fraction;
        let margin_y = viewport.height * margins.y_fraction;
        Self {
            left: margin_x,
            top: margin_y,
            right: viewport.width - margin_x,
            bottom: viewport.height - margin_y,
        }
    }

    /// Inclusive containment test. NaN coordinates are never inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margins_for_1000x800() {
        let zone = Viewport::new(1000.0, 800.0).safe_zone(&SafeZoneMargins::default());
        assert!((zone.left - 150.0).abs() < 1e-3);
        assert!((zone.right - 850.0).abs() < 1e-3);
        assert!((zone.top - 224.0).abs() < 1e-3);
        assert!((zone.bottom - 576.0).abs() < 1e-3);
        assert!((zone.width() - 700.0).abs() < 1e-3);
        assert!((zone.height() - 352.0).abs() < 1e-3);
    }

    #[test]
    fn test_contains_center_not_edge() {
        let zone = Viewport::new(1000.0, 800.0).safe_zone(&SafeZoneMargins::default());
        assert!(zone.contains(500.0, 400.0));
        assert!(!zone.contains(10.0, 400.0));
        assert!(!zone.contains(500.0, 700.0));
    }

    #[test]
    fn test_bounds_inclusive() {
        let zone = SafeZone {
            left: 100.0,
            top: 50.0,
            right: 300.0,
            bottom: 150.0,
        };
        assert!(zone.contains(100.0, 50.0));
        assert!(zone.contains(300.0, 150.0));
        assert!(!zone.contains(300.5, 150.0));
    }

    #[test]
    fn test_nan_never_inside() {
        let zone = Viewport::new(1000.0, 800.0).safe_zone(&SafeZoneMargins::default());
        assert!(!zone.contains(f32::NAN, 400.0));
        assert!(!Viewport::new(1000.0, 800.0).contains(500.0, f32::NAN));
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(800.0, 600.0).is_valid());
        assert!(!Viewport::new(0.0, 600.0).is_valid());
        assert!(!Viewport::new(800.0, f32::INFINITY).is_valid());
    }
}
