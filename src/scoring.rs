//! Form scoring from a finished feature map.
//!
//! [`ShotScorer`] is the seam for the trained classifier, which lives outside
//! this crate. [`RangeScorer`] is the built-in implementation: it checks each
//! feature against its optimal range and ranks the misses by how far outside
//! the range they fall.

use crate::{
    config::{FeatureRange, ScoringConfig},
    metrics::FeatureMap,
    stability::Statistics,
    Error, Result,
};
use log::debug;
use serde::Serialize;

/// Feedback key reported for an unstable head
pub const HEAD_STABILITY_KEY: &str = "opt_A_head_stability";

/// Which side of its range a feature fell on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Low,
    High,
    /// Whole-shot observation not tied to one feature range
    Special,
}

/// One coaching point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    /// Feedback key used for message lookup
    pub key: String,
    /// Feature the point is about, if any
    pub feature: Option<String>,
    pub direction: Direction,
    /// Distance outside the optimal range, in units of the range width
    pub severity: f64,
}

/// Score plus feedback ranked by severity, most severe first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotScore {
    /// Form quality in `0..=100`
    pub score: f64,
    pub feedback: Vec<Feedback>,
}

/// Turns a feature map into a score and ranked feedback
pub trait ShotScorer {
    /// Score one shot
    ///
    /// # Errors
    ///
    /// Returns an error if the scorer cannot evaluate the features
    fn score(&self, features: &FeatureMap, head_stability: Option<&Statistics>) -> Result<ShotScore>;

    /// Scorer name for reports
    fn name(&self) -> &str;
}

/// Scores a shot by the fraction of features inside their optimal range
#[derive(Debug, Clone)]
pub struct RangeScorer {
    ranges: Vec<FeatureRange>,
    head_stability_threshold: f64,
}

impl Default for RangeScorer {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl RangeScorer {
    #[must_use]
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            ranges: config.ranges.clone(),
            head_stability_threshold: config.head_stability_threshold,
        }
    }

    fn check(range: &FeatureRange, value: f64) -> Option<Feedback> {
        let width = (range.max - range.min).max(f64::EPSILON);
        let (direction, distance) = if value < range.min {
            (Direction::Low, range.min - value)
        } else if value > range.max {
            (Direction::High, value - range.max)
        } else {
            return None;
        };

        Some(Feedback {
            key: range.key.clone(),
            feature: Some(range.feature.clone()),
            direction,
            severity: distance / width,
        })
    }
}

impl ShotScorer for RangeScorer {
    fn score(&self, features: &FeatureMap, head_stability: Option<&Statistics>) -> Result<ShotScore> {
        if self.ranges.is_empty() {
            return Err(Error::Scoring("No feature ranges configured".to_string()));
        }

        let mut feedback = Vec::new();
        let mut checked = 0_u32;
        let mut in_range = 0_u32;

        for range in &self.ranges {
            let Some(value) = features.get(&range.feature) else {
                debug!("Feature {} not present, skipping range {}", range.feature, range.key);
                continue;
            };
            checked += 1;
            match Self::check(range, value) {
                Some(point) => feedback.push(point),
                None => in_range += 1,
            }
        }

        if checked == 0 {
            return Err(Error::Scoring("No configured feature present in the feature map".to_string()));
        }

        if let Some(stats) = head_stability {
            if stats.peak_std_dev > self.head_stability_threshold {
                let threshold = self.head_stability_threshold.max(f64::EPSILON);
                feedback.push(Feedback {
                    key: HEAD_STABILITY_KEY.to_string(),
                    feature: None,
                    direction: Direction::Special,
                    severity: (stats.peak_std_dev - threshold) / threshold,
                });
            }
        }

        feedback.sort_by(|a, b| b.severity.total_cmp(&a.severity));

        Ok(ShotScore {
            score: 100.0 * f64::from(in_range) / f64::from(checked),
            feedback,
        })
    }

    fn name(&self) -> &str {
        "RangeScorer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(ranges: Vec<FeatureRange>) -> RangeScorer {
        RangeScorer {
            ranges,
            head_stability_threshold: 5.0,
        }
    }

    fn range(key: &str, feature: &str, min: f64, max: f64) -> FeatureRange {
        FeatureRange {
            key: key.to_string(),
            feature: feature.to_string(),
            min,
            max,
        }
    }

    #[test]
    fn test_all_in_range_scores_100() {
        let mut features = FeatureMap::default();
        features.insert("S_avg_knee_bend", 140.0);
        features.insert("F_release_angle", 60.0);
        let s = scorer(vec![
            range("opt_S_avg_knee_bend", "S_avg_knee_bend", 120.0, 160.0),
            range("opt_F_release", "F_release_angle", 55.0, 79.0),
        ]);
        let result = s.score(&features, None).unwrap();
        assert_eq!(result.score, 100.0);
        assert!(result.feedback.is_empty());
    }

    #[test]
    fn test_feedback_ranked_by_severity() {
        let mut features = FeatureMap::default();
        features.insert("S_avg_knee_bend", 170.0); // 10 over a width of 40
        features.insert("F_release_angle", 30.0); // 25 under a width of 24
        features.insert("R_frame_count", 5.0);
        let s = scorer(vec![
            range("opt_S_avg_knee_bend", "S_avg_knee_bend", 120.0, 160.0),
            range("opt_F_release", "F_release_angle", 55.0, 79.0),
            range("opt_R_frame_count", "R_frame_count", 3.0, 12.0),
        ]);
        let result = s.score(&features, None).unwrap();
        assert!((result.score - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.feedback.len(), 2);
        assert_eq!(result.feedback[0].key, "opt_F_release");
        assert_eq!(result.feedback[0].direction, Direction::Low);
        assert_eq!(result.feedback[1].direction, Direction::High);
    }

    #[test]
    fn test_head_stability_feedback() {
        let mut features = FeatureMap::default();
        features.insert("R_frame_count", 5.0);
        let s = scorer(vec![range("opt_R_frame_count", "R_frame_count", 3.0, 12.0)]);
        let stats = Statistics {
            mean: 40.0,
            std_dev: 8.0,
            min: 30.0,
            max: 55.0,
            range: 25.0,
            peak_std_dev: 10.0,
            samples: 20,
        };
        let result = s.score(&features, Some(&stats)).unwrap();
        assert_eq!(result.score, 100.0);
        assert_eq!(result.feedback.len(), 1);
        assert_eq!(result.feedback[0].key, HEAD_STABILITY_KEY);
        assert_eq!(result.feedback[0].direction, Direction::Special);
    }

    #[test]
    fn test_no_matching_features_is_error() {
        let s = scorer(vec![range("opt_R_frame_count", "R_frame_count", 3.0, 12.0)]);
        assert!(s.score(&FeatureMap::default(), None).is_err());
        assert!(scorer(Vec::new()).score(&FeatureMap::default(), None).is_err());
    }

    #[test]
    fn test_default_ranges_cover_defaulted_map() {
        let mut features = FeatureMap::default();
        features.fill_required_defaults();
        let result = RangeScorer::default().score(&features, None).unwrap();
        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert!(!result.feedback.is_empty());
    }
}
