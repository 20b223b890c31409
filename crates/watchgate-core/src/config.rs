use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::safe_zone::{SafeZoneMargins, Viewport};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchgateConfig {
    pub calibration: CalibrationConfig,
    pub classifier: ClassifierConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Confirmations needed before a target is done
    pub confirmations_per_target: u32,
    /// Target positions as [x, y] fractions of the viewport
    pub targets: Vec<[f32; 2]>,
    /// Index into `targets` of the anchor (reference pose capture)
    pub anchor_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Below this eye-distance ratio the face is too far
    pub min_distance_ratio: f32,
    /// Above this eye-distance ratio the face is too close
    pub max_distance_ratio: f32,
    /// Lower clamp applied to the ratio before threshold scaling
    pub ratio_clamp_min: f32,
    /// Upper clamp applied to the ratio before threshold scaling
    pub ratio_clamp_max: f32,
    /// Yaw deviation threshold at ratio 1.0
    pub base_yaw_threshold: f32,
    /// Pitch deviation threshold at ratio 1.0
    pub base_pitch_threshold: f32,
    /// Roll deviation threshold (radians), not distance scaled
    pub roll_threshold: f32,
    /// Report gaze outside the whole viewport as OFF_SCREEN
    pub report_off_screen: bool,
    pub margins: SafeZoneMargins,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        let mut targets = Vec::with_capacity(9);
        for y in [0.1, 0.5, 0.9] {
            for x in [0.1, 0.5, 0.9] {
                targets.push([x, y]);
            }
        }
        Self {
            confirmations_per_target: 5,
            targets,
            anchor_index: 4, // center
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_distance_ratio: 0.8,
            max_distance_ratio: 1.2,
            ratio_clamp_min: 0.5,
            ratio_clamp_max: 2.0,
            base_yaw_threshold: 0.15,
            base_pitch_threshold: 0.12,
            roll_threshold: 0.5,
            report_off_screen: false,
            margins: SafeZoneMargins::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl ViewportConfig {
    pub fn to_viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

impl WatchgateConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: WatchgateConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with WATCHGATE_
    /// Example: WATCHGATE_CLASSIFIER_ROLL_THRESHOLD=0.4
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = WatchgateConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // A user file replaces the default file wholesale; missing sections
        // fall back to built-in defaults through serde(default).
        if let Some(path) = user_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `WATCHGATE_*` overrides from an arbitrary lookup
    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(key: &str, val: String) -> Result<T, ConfigError> {
            val.trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("Invalid {}", key)))
        }

        macro_rules! override_field {
            ($key:literal, $field:expr) => {
                if let Some(val) = lookup($key) {
                    $field = parse($key, val)?;
                }
            };
        }

        // Calibration overrides
        override_field!(
            "WATCHGATE_CALIBRATION_CONFIRMATIONS_PER_TARGET",
            self.calibration.confirmations_per_target
        );
        override_field!("WATCHGATE_CALIBRATION_ANCHOR_INDEX", self.calibration.anchor_index);

        // Classifier overrides
        override_field!("WATCHGATE_CLASSIFIER_MARGIN_X", self.classifier.margins.x_fraction);
        override_field!("WATCHGATE_CLASSIFIER_MARGIN_Y", self.classifier.margins.y_fraction);
        override_field!(
            "WATCHGATE_CLASSIFIER_MIN_DISTANCE_RATIO",
            self.classifier.min_distance_ratio
        );
        override_field!(
            "WATCHGATE_CLASSIFIER_MAX_DISTANCE_RATIO",
            self.classifier.max_distance_ratio
        );
        override_field!(
            "WATCHGATE_CLASSIFIER_BASE_YAW_THRESHOLD",
            self.classifier.base_yaw_threshold
        );
        override_field!(
            "WATCHGATE_CLASSIFIER_BASE_PITCH_THRESHOLD",
            self.classifier.base_pitch_threshold
        );
        override_field!("WATCHGATE_CLASSIFIER_ROLL_THRESHOLD", self.classifier.roll_threshold);
        override_field!(
            "WATCHGATE_CLASSIFIER_REPORT_OFF_SCREEN",
            self.classifier.report_off_screen
        );

        // Viewport overrides
        override_field!("WATCHGATE_VIEWPORT_WIDTH", self.viewport.width);
        override_field!("WATCHGATE_VIEWPORT_HEIGHT", self.viewport.height);

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration.validate()?;
        self.classifier.validate()?;

        if !self.viewport.to_viewport().is_valid() {
            return Err(ConfigError::Validation(
                "viewport width and height must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl CalibrationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmations_per_target == 0 {
            return Err(ConfigError::Validation(
                "calibration.confirmations_per_target must be at least 1".to_string(),
            ));
        }
        if self.targets.is_empty() {
            return Err(ConfigError::Validation(
                "calibration.targets must not be empty".to_string(),
            ));
        }
        if self.anchor_index >= self.targets.len() {
            return Err(ConfigError::Validation(format!(
                "calibration.anchor_index {} out of range for {} targets",
                self.anchor_index,
                self.targets.len()
            )));
        }
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if let Some(pos) = self.targets.iter().position(|[x, y]| !in_unit(*x) || !in_unit(*y)) {
            return Err(ConfigError::Validation(format!(
                "calibration.targets[{}] must lie within [0, 1]",
                pos
            )));
        }
        Ok(())
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let margin_ok = |m: f32| (0.0..0.5).contains(&m);
        if !margin_ok(self.margins.x_fraction) || !margin_ok(self.margins.y_fraction) {
            return Err(ConfigError::Validation(
                "classifier.margins must be in [0, 0.5)".to_string(),
            ));
        }
        if self.min_distance_ratio <= 0.0 || self.min_distance_ratio >= self.max_distance_ratio {
            return Err(ConfigError::Validation(
                "classifier.min_distance_ratio must be in (0, max_distance_ratio)".to_string(),
            ));
        }
        if self.ratio_clamp_min <= 0.0 || self.ratio_clamp_min > self.ratio_clamp_max {
            return Err(ConfigError::Validation(
                "classifier.ratio_clamp_min must be in (0, ratio_clamp_max]".to_string(),
            ));
        }
        for (name, value) in [
            ("base_yaw_threshold", self.base_yaw_threshold),
            ("base_pitch_threshold", self.base_pitch_threshold),
            ("roll_threshold", self.roll_threshold),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::Validation(format!(
                    "classifier.{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}
