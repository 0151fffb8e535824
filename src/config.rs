//! Configuration management for shot analysis

use crate::{
    constants::{DEFAULT_HEAD_STABILITY_THRESHOLD, DEFAULT_HEAD_STABILITY_WINDOW, FOLLOW_THROUGH_FRAME_CAP, TARGET_FPS},
    landmarks::ShootingSide,
    metrics::feature_spec,
    phase::ShotAnalyzer,
    stability::HeadStabilityTracker,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Phase detection configuration
    pub analysis: AnalysisConfig,

    /// Form scoring configuration
    pub scoring: ScoringConfig,

    /// Output configuration
    pub output: OutputConfig,
}

/// Phase detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Arm that performs the shot
    pub shooting_side: ShootingSide,

    /// Analysis sampling rate; faster sources are downsampled to it
    pub target_fps: f64,

    /// Follow-through frames after which a shot is force-completed
    pub follow_through_frame_cap: u32,
}

/// A feature's optimal range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Feedback key reported when the feature is out of range
    pub key: String,

    /// Feature map key the range applies to
    pub feature: String,

    /// Lower bound (inclusive)
    pub min: f64,

    /// Upper bound (inclusive)
    pub max: f64,
}

impl FeatureRange {
    fn new(key: &str, feature: &str, min: f64, max: f64) -> Self {
        Self {
            key: key.to_string(),
            feature: feature.to_string(),
            min,
            max,
        }
    }
}

/// Scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Optimal ranges checked by the range scorer
    pub ranges: Vec<FeatureRange>,

    /// Head tilt standard deviation (degrees) above which the head is unstable
    pub head_stability_threshold: f64,

    /// Window size for head tilt statistics
    pub head_stability_window: usize,
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for phase snapshot images
    pub snapshot_dir: Option<PathBuf>,

    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            shooting_side: ShootingSide::Right,
            target_fps: TARGET_FPS,
            follow_through_frame_cap: FOLLOW_THROUGH_FRAME_CAP,
        }
    }
}

impl AnalysisConfig {
    /// Seconds between analyzed frames
    #[must_use]
    pub fn frame_delta_t(&self) -> f64 {
        1.0 / self.target_fps
    }

    /// Build a fresh analyzer from this configuration
    #[must_use]
    pub fn analyzer(&self) -> ShotAnalyzer {
        ShotAnalyzer::with_follow_through_cap(self.shooting_side, self.frame_delta_t(), self.follow_through_frame_cap)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ranges: vec![
                FeatureRange::new("opt_S_avg_knee_bend", "S_avg_knee_bend", 120.0, 160.0),
                FeatureRange::new("opt_S_avg_body_lean", "S_avg_body_lean", -2.0, 4.0),
                FeatureRange::new("opt_S_avg_head_tilt", "S_avg_head_tilt", 50.0, 65.0),
                FeatureRange::new("opt_S_avg_elbow_angle", "S_avg_elbow_angle", 45.0, 90.0),
                FeatureRange::new("opt_R_avg_hip_angle", "R_avg_hip_angle", 160.0, 185.0),
                FeatureRange::new("opt_R_avg_elbow_angle", "R_avg_elbow_angle", 95.0, 145.0),
                FeatureRange::new("opt_R_avg_knee_bend", "R_avg_knee_bend", 154.0, 166.0),
                FeatureRange::new("opt_R_max_wrist_height", "R_max_wrist_height", 3.4, 7.0),
                FeatureRange::new("opt_R_avg_shoulder_angle", "R_avg_shoulder_angle", 15.0, 55.0),
                FeatureRange::new("opt_R_avg_body_lean", "R_avg_body_lean", -3.0, 5.0),
                FeatureRange::new("opt_R_forearm_deviation", "R_avg_forearm_deviation", -40.0, 10.0),
                FeatureRange::new("opt_R_max_setpoint", "R_max_setpoint", -4.0, 10.0),
                FeatureRange::new("opt_R_frame_count", "R_frame_count", 3.0, 12.0),
                FeatureRange::new("opt_F_release", "F_release_angle", 55.0, 79.0),
                FeatureRange::new("opt_F_elbow_above_eye", "F_elbow_above_eye", 7.0, 15.0),
                FeatureRange::new("opt_F_hip_angle", "F_hip_angle", 174.0, 180.0),
                FeatureRange::new("opt_F_knee_angle", "F_knee_angle", 170.0, 180.0),
                FeatureRange::new("opt_F_body_lean", "F_body_lean_angle", -2.0, 2.5),
                FeatureRange::new("opt_F_frame_count", "F_frame_count", 8.0, 50.0),
            ],
            head_stability_threshold: DEFAULT_HEAD_STABILITY_THRESHOLD,
            head_stability_window: DEFAULT_HEAD_STABILITY_WINDOW,
        }
    }
}

impl ScoringConfig {
    /// Build a head stability tracker from this configuration
    #[must_use]
    pub fn stability_tracker(&self) -> HeadStabilityTracker {
        HeadStabilityTracker::new(self.head_stability_window, self.head_stability_threshold)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text does not parse
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing the file fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if !(self.analysis.target_fps.is_finite() && self.analysis.target_fps > 0.0) {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }
        if self.analysis.follow_through_frame_cap == 0 {
            return Err(Error::ConfigError(
                "Follow-through frame cap must be greater than 0".to_string(),
            ));
        }

        for range in &self.scoring.ranges {
            if feature_spec(&range.feature).is_none() {
                return Err(Error::ConfigError(format!(
                    "Range {} references unknown feature {}",
                    range.key, range.feature
                )));
            }
            if range.min > range.max {
                return Err(Error::ConfigError(format!(
                    "Range {} has min {} greater than max {}",
                    range.key, range.min, range.max
                )));
            }
        }

        if self.scoring.head_stability_threshold < 0.0 {
            return Err(Error::ConfigError(
                "Head stability threshold must not be negative".to_string(),
            ));
        }
        if self.scoring.head_stability_window == 0 {
            return Err(Error::ConfigError(
                "Head stability window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Shot Form Analysis Configuration

# Phase detection
analysis:
  shooting_side: RIGHT
  target_fps: 30.0
  follow_through_frame_cap: 35

# Scoring. Ranges left out of this file fall back to the built-in set.
scoring:
  head_stability_threshold: 6.0
  head_stability_window: 30

# Output
output:
  pretty: false
"#;
