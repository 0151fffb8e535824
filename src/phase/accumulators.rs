//! Running statistics for the Setup, Release and Follow-through phases.
//!
//! Each record starts out [`Lifecycle::Accumulating`] and is moved to
//! [`Lifecycle::Finalized`] exactly once by the analyzer. Finalizing computes
//! the derived averages; afterwards every mutating method is a no-op, so the
//! exported values of a finished phase can never change.
//!
//! Initial values are sentinels (`f64::INFINITY` for averages and minimum
//! trackers, `-1` for Follow-through snapshots) and are never exported: only
//! finalized records reach the feature map.

use crate::{constants::SHOULDER_VERTICAL_OFFSET, geometry::AngleSet};
use serde::Serialize;

/// Whether a phase record still accepts samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Lifecycle {
    /// Samples are folded into totals and extrema
    #[default]
    Accumulating,
    /// Averages computed; the record is frozen
    Finalized,
}

fn average(total: f64, frames: u32) -> f64 {
    total / f64::from(frames)
}

/// Setup phase statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupMetrics {
    pub total_knee_bend: f64,
    pub avg_knee_bend: f64,
    /// Smallest knee angle seen, i.e. the deepest bend
    pub max_knee_bend: f64,
    pub total_body_lean: f64,
    pub avg_body_lean: f64,
    /// Largest body lean, never below 0
    pub max_body_lean: f64,
    pub min_body_lean: f64,
    pub total_head_tilt: f64,
    pub avg_head_tilt: f64,
    pub total_elbow_angle: f64,
    pub avg_elbow_angle: f64,
    pub frame_count: u32,
    pub lifecycle: Lifecycle,
}

impl Default for SetupMetrics {
    fn default() -> Self {
        Self {
            total_knee_bend: 0.0,
            avg_knee_bend: f64::INFINITY,
            max_knee_bend: f64::INFINITY,
            total_body_lean: 0.0,
            avg_body_lean: f64::INFINITY,
            max_body_lean: 0.0,
            min_body_lean: f64::INFINITY,
            total_head_tilt: 0.0,
            avg_head_tilt: f64::INFINITY,
            total_elbow_angle: 0.0,
            avg_elbow_angle: f64::INFINITY,
            frame_count: 0,
            lifecycle: Lifecycle::Accumulating,
        }
    }
}

impl SetupMetrics {
    /// Fold one frame into totals and extrema
    pub fn sample(&mut self, angles: &AngleSet) {
        if self.is_finalized() {
            return;
        }
        self.max_knee_bend = self.max_knee_bend.min(angles.dominant_knee);
        self.min_body_lean = self.min_body_lean.min(angles.body_lean);
        self.max_body_lean = self.max_body_lean.max(angles.body_lean);
        self.total_knee_bend += angles.dominant_knee;
        self.total_body_lean += angles.body_lean;
        self.total_head_tilt += angles.head_tilt;
        self.total_elbow_angle += angles.elbow;
    }

    /// Count one frame spent in Setup
    pub fn count_frame(&mut self) {
        if !self.is_finalized() {
            self.frame_count += 1;
        }
    }

    /// Compute averages and freeze. Returns `false` if already finalized.
    pub fn finalize(&mut self) -> bool {
        if self.is_finalized() {
            return false;
        }
        if self.frame_count > 0 {
            let n = self.frame_count;
            self.avg_knee_bend = average(self.total_knee_bend, n);
            self.avg_body_lean = average(self.total_body_lean, n);
            self.avg_head_tilt = average(self.total_head_tilt, n);
            self.avg_elbow_angle = average(self.total_elbow_angle, n);
        }
        self.lifecycle = Lifecycle::Finalized;
        true
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.lifecycle == Lifecycle::Finalized
    }
}

/// Release phase statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseMetrics {
    pub total_hip_angle: f64,
    pub avg_hip_angle: f64,
    pub total_knee_bend: f64,
    pub avg_knee_bend: f64,
    pub total_elbow_angle: f64,
    pub avg_elbow_angle: f64,
    /// Highest eye-relative wrist height, never below 0
    pub max_wrist_height: f64,
    pub total_shoulder_angle: f64,
    /// Average shoulder angle relative to horizontal (offset by -90°)
    pub avg_shoulder_angle: f64,
    pub total_head_tilt: f64,
    pub avg_head_tilt: f64,
    pub total_body_lean: f64,
    pub avg_body_lean: f64,
    pub total_forearm_deviation: f64,
    pub avg_forearm_deviation: f64,
    /// Smallest signed fingertip-to-eye offset seen during release.
    ///
    /// Despite the name this tracks a minimum.
    pub max_setpoint: f64,
    pub frame_count: u32,
    pub lifecycle: Lifecycle,
}

impl Default for ReleaseMetrics {
    fn default() -> Self {
        Self {
            total_hip_angle: 0.0,
            avg_hip_angle: f64::INFINITY,
            total_knee_bend: 0.0,
            avg_knee_bend: f64::INFINITY,
            total_elbow_angle: 0.0,
            avg_elbow_angle: f64::INFINITY,
            max_wrist_height: 0.0,
            total_shoulder_angle: 0.0,
            avg_shoulder_angle: f64::INFINITY,
            total_head_tilt: 0.0,
            avg_head_tilt: f64::INFINITY,
            total_body_lean: 0.0,
            avg_body_lean: f64::INFINITY,
            total_forearm_deviation: 0.0,
            avg_forearm_deviation: f64::INFINITY,
            max_setpoint: f64::INFINITY,
            frame_count: 0,
            lifecycle: Lifecycle::Accumulating,
        }
    }
}

impl ReleaseMetrics {
    /// Fold one frame into totals and extrema
    pub fn sample(&mut self, angles: &AngleSet, wrist_height: f64, setpoint: f64) {
        if self.is_finalized() {
            return;
        }
        self.total_hip_angle += angles.hip_angle;
        self.total_knee_bend += angles.dominant_knee;
        self.total_elbow_angle += angles.elbow;
        self.total_shoulder_angle += angles.shoulder;
        self.total_head_tilt += angles.head_tilt;
        self.total_body_lean += angles.body_lean;
        self.total_forearm_deviation += angles.forearm_alignment;
        self.max_wrist_height = self.max_wrist_height.max(wrist_height);
        self.max_setpoint = self.max_setpoint.min(setpoint);
    }

    /// Count one frame spent in Release
    pub fn count_frame(&mut self) {
        if !self.is_finalized() {
            self.frame_count += 1;
        }
    }

    /// Compute averages and freeze. Returns `false` if already finalized.
    pub fn finalize(&mut self) -> bool {
        if self.is_finalized() {
            return false;
        }
        if self.frame_count > 0 {
            let n = self.frame_count;
            self.avg_hip_angle = average(self.total_hip_angle, n);
            self.avg_knee_bend = average(self.total_knee_bend, n);
            self.avg_elbow_angle = average(self.total_elbow_angle, n);
            self.avg_shoulder_angle = average(self.total_shoulder_angle, n) - SHOULDER_VERTICAL_OFFSET;
            self.avg_head_tilt = average(self.total_head_tilt, n);
            self.avg_body_lean = average(self.total_body_lean, n);
            self.avg_forearm_deviation = average(self.total_forearm_deviation, n);
        }
        self.lifecycle = Lifecycle::Finalized;
        true
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.lifecycle == Lifecycle::Finalized
    }
}

/// Point sample taken on the frame the ball leaves the hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReleaseSnapshot {
    /// Whole degrees
    pub release_angle: f64,
    pub elbow_above_eye: f64,
    pub body_lean_angle: f64,
    pub hip_angle: f64,
    pub knee_angle: f64,
    pub head_tilt: f64,
}

impl ReleaseSnapshot {
    /// Build the snapshot from the Release -> Follow-through frame
    #[must_use]
    pub fn capture(angles: &AngleSet, elbow_above_eye: f64) -> Self {
        Self {
            release_angle: (angles.shoulder - SHOULDER_VERTICAL_OFFSET - angles.body_lean).round(),
            elbow_above_eye,
            body_lean_angle: angles.body_lean,
            hip_angle: angles.hip_angle,
            knee_angle: angles.dominant_knee,
            head_tilt: angles.head_tilt,
        }
    }
}

/// Follow-through phase statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowThroughMetrics {
    pub release_angle: f64,
    pub elbow_above_eye: f64,
    pub body_lean_angle: f64,
    pub hip_angle: f64,
    pub knee_angle: f64,
    pub head_tilt: f64,
    pub frame_count: u32,
    snapshot_taken: bool,
    pub lifecycle: Lifecycle,
}

impl Default for FollowThroughMetrics {
    fn default() -> Self {
        Self {
            release_angle: -1.0,
            elbow_above_eye: -1.0,
            body_lean_angle: -1.0,
            hip_angle: -1.0,
            knee_angle: -1.0,
            head_tilt: -1.0,
            frame_count: 0,
            snapshot_taken: false,
            lifecycle: Lifecycle::Accumulating,
        }
    }
}

impl FollowThroughMetrics {
    /// Store the release snapshot. Only the first snapshot is kept.
    pub fn record_snapshot(&mut self, snapshot: &ReleaseSnapshot) {
        if self.snapshot_taken || self.is_finalized() {
            return;
        }
        self.release_angle = snapshot.release_angle;
        self.elbow_above_eye = snapshot.elbow_above_eye;
        self.body_lean_angle = snapshot.body_lean_angle;
        self.hip_angle = snapshot.hip_angle;
        self.knee_angle = snapshot.knee_angle;
        self.head_tilt = snapshot.head_tilt;
        self.snapshot_taken = true;
    }

    /// Record how long the follow-through lasted and freeze
    pub fn finalize(&mut self, frame_count: u32) -> bool {
        if self.is_finalized() {
            return false;
        }
        self.frame_count = frame_count;
        self.lifecycle = Lifecycle::Finalized;
        true
    }

    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.snapshot_taken
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.lifecycle == Lifecycle::Finalized
    }
}
