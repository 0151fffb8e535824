//! Flat feature map assembled from finalized phase records.
//!
//! The mapping from phase record fields to exported keys is the static
//! [`FEATURE_TABLE`]. Running totals and lifecycle markers never appear in it.
//! The downstream scorer expects every key of [`REQUIRED_FEATURES`]; keys whose
//! phase was never finalized are defaulted to 0.0 and reported as warnings.

use crate::phase::{FollowThroughMetrics, Phase, ReleaseMetrics, SetupMetrics, ShotAnalyzer};
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where an exported feature is read from
#[derive(Clone, Copy)]
pub enum FeatureSource {
    Setup(fn(&SetupMetrics) -> f64),
    Release(fn(&ReleaseMetrics) -> f64),
    FollowThrough(fn(&FollowThroughMetrics) -> f64),
}

impl FeatureSource {
    /// Phase the feature belongs to
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Setup(_) => Phase::Setup,
            Self::Release(_) => Phase::Release,
            Self::FollowThrough(_) => Phase::FollowThrough,
        }
    }

    /// Read the feature if its phase has been finalized
    fn read(&self, analyzer: &ShotAnalyzer) -> Option<f64> {
        match self {
            Self::Setup(get) => {
                let m = analyzer.setup();
                m.is_finalized().then(|| get(m))
            }
            Self::Release(get) => {
                let m = analyzer.release();
                m.is_finalized().then(|| get(m))
            }
            Self::FollowThrough(get) => {
                let m = analyzer.follow_through();
                m.is_finalized().then(|| get(m))
            }
        }
    }
}

/// One exported feature
#[derive(Clone, Copy)]
pub struct FeatureSpec {
    /// Output key, prefixed with the phase initial
    pub key: &'static str,
    pub source: FeatureSource,
}

/// Every exported feature, in phase order
pub const FEATURE_TABLE: [FeatureSpec; 25] = [
    FeatureSpec { key: "S_avg_knee_bend", source: FeatureSource::Setup(|m| m.avg_knee_bend) },
    FeatureSpec { key: "S_max_knee_bend", source: FeatureSource::Setup(|m| m.max_knee_bend) },
    FeatureSpec { key: "S_avg_body_lean", source: FeatureSource::Setup(|m| m.avg_body_lean) },
    FeatureSpec { key: "S_max_body_lean", source: FeatureSource::Setup(|m| m.max_body_lean) },
    FeatureSpec { key: "S_min_body_lean", source: FeatureSource::Setup(|m| m.min_body_lean) },
    FeatureSpec { key: "S_avg_head_tilt", source: FeatureSource::Setup(|m| m.avg_head_tilt) },
    FeatureSpec { key: "S_avg_elbow_angle", source: FeatureSource::Setup(|m| m.avg_elbow_angle) },
    FeatureSpec { key: "S_frame_count", source: FeatureSource::Setup(|m| f64::from(m.frame_count)) },
    FeatureSpec { key: "R_avg_hip_angle", source: FeatureSource::Release(|m| m.avg_hip_angle) },
    FeatureSpec { key: "R_avg_knee_bend", source: FeatureSource::Release(|m| m.avg_knee_bend) },
    FeatureSpec { key: "R_avg_elbow_angle", source: FeatureSource::Release(|m| m.avg_elbow_angle) },
    FeatureSpec { key: "R_max_wrist_height", source: FeatureSource::Release(|m| m.max_wrist_height) },
    FeatureSpec { key: "R_avg_shoulder_angle", source: FeatureSource::Release(|m| m.avg_shoulder_angle) },
    FeatureSpec { key: "R_avg_head_tilt", source: FeatureSource::Release(|m| m.avg_head_tilt) },
    FeatureSpec { key: "R_avg_body_lean", source: FeatureSource::Release(|m| m.avg_body_lean) },
    FeatureSpec { key: "R_avg_forearm_deviation", source: FeatureSource::Release(|m| m.avg_forearm_deviation) },
    FeatureSpec { key: "R_max_setpoint", source: FeatureSource::Release(|m| m.max_setpoint) },
    FeatureSpec { key: "R_frame_count", source: FeatureSource::Release(|m| f64::from(m.frame_count)) },
    FeatureSpec { key: "F_release_angle", source: FeatureSource::FollowThrough(|m| m.release_angle) },
    FeatureSpec { key: "F_elbow_above_eye", source: FeatureSource::FollowThrough(|m| m.elbow_above_eye) },
    FeatureSpec { key: "F_body_lean_angle", source: FeatureSource::FollowThrough(|m| m.body_lean_angle) },
    FeatureSpec { key: "F_hip_angle", source: FeatureSource::FollowThrough(|m| m.hip_angle) },
    FeatureSpec { key: "F_knee_angle", source: FeatureSource::FollowThrough(|m| m.knee_angle) },
    FeatureSpec { key: "F_head_tilt", source: FeatureSource::FollowThrough(|m| m.head_tilt) },
    FeatureSpec { key: "F_frame_count", source: FeatureSource::FollowThrough(|m| f64::from(m.frame_count)) },
];

/// Keys the downstream scorer requires
pub const REQUIRED_FEATURES: [&str; 22] = [
    "S_avg_knee_bend",
    "S_max_knee_bend",
    "S_avg_body_lean",
    "S_max_body_lean",
    "S_min_body_lean",
    "S_avg_head_tilt",
    "S_frame_count",
    "R_avg_hip_angle",
    "R_avg_knee_bend",
    "R_avg_elbow_angle",
    "R_max_wrist_height",
    "R_avg_shoulder_angle",
    "R_avg_head_tilt",
    "R_avg_body_lean",
    "R_frame_count",
    "F_release_angle",
    "F_elbow_above_eye",
    "F_body_lean_angle",
    "F_hip_angle",
    "F_knee_angle",
    "F_head_tilt",
    "F_frame_count",
];

/// Look up an exported feature by key
#[must_use]
pub fn feature_spec(key: &str) -> Option<&'static FeatureSpec> {
    FEATURE_TABLE.iter().find(|spec| spec.key == key)
}

/// Flat mapping from feature key to value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMap {
    values: BTreeMap<String, f64>,
    /// Required keys that had to be defaulted
    missing: Vec<String>,
}

impl FeatureMap {
    /// Drain every finalized phase of the analyzer
    #[must_use]
    pub fn from_analyzer(analyzer: &ShotAnalyzer) -> Self {
        let values = FEATURE_TABLE
            .iter()
            .filter_map(|spec| spec.source.read(analyzer).map(|v| (spec.key.to_string(), v)))
            .collect();
        Self {
            values,
            missing: Vec::new(),
        }
    }

    /// Overwrite this map's values with another's
    pub fn merge(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Default every absent required key to 0.0, logging one warning per key
    pub fn fill_required_defaults(&mut self) {
        for key in REQUIRED_FEATURES {
            if !self.values.contains_key(key) {
                warn!("Missing required feature {key}, defaulting to 0.0");
                self.values.insert(key.to_string(), 0.0);
                self.missing.push(key.to_string());
            }
        }
    }

    /// Finalized feature map for an analyzer: drained and defaulted
    #[must_use]
    pub fn finalize(analyzer: &ShotAnalyzer) -> Self {
        let mut map = Self::from_analyzer(analyzer);
        map.fill_required_defaults();
        map
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Required keys that were defaulted, in required-list order
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Values of the required features in required-list order
    #[must_use]
    pub fn required_vector(&self) -> Vec<f64> {
        REQUIRED_FEATURES
            .iter()
            .map(|key| self.get(key).unwrap_or(0.0))
            .collect()
    }
}
