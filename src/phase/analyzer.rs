//! Frame-by-frame shot phase state machine.

use super::{
    accumulators::{FollowThroughMetrics, ReleaseMetrics, ReleaseSnapshot, SetupMetrics},
    Phase,
};
use crate::{
    constants::{
        completion, follow_through_entry, release_entry, setup_entry, DEFAULT_FRAME_DELTA_T,
        FOLLOW_THROUGH_FRAME_CAP,
    },
    geometry::{self, AngleSet},
    landmarks::{LandmarkBundle, ShootingSide},
};
use log::{debug, info};

/// Null -> Setup: either a textbook loading pose, or an arm that is visibly
/// rising from a plausible loading pose.
fn enters_setup(a: &AngleSet, previous_shoulder: Option<f64>) -> bool {
    use setup_entry::*;

    let optimal = a.shoulder > OPTIMAL_SHOULDER_MIN
        && a.shoulder < OPTIMAL_SHOULDER_MAX
        && a.elbow < OPTIMAL_ELBOW_MAX
        && a.dominant_knee < OPTIMAL_KNEE_MAX
        && a.head_tilt > HEAD_TILT_MIN;

    let rising = previous_shoulder.is_some_and(|prev| {
        a.head_tilt > HEAD_TILT_MIN
            && a.shoulder > RISING_SHOULDER_MIN
            && a.shoulder < RISING_SHOULDER_MAX
            && a.elbow < RISING_ELBOW_MAX
            && a.shoulder - RISING_SHOULDER_DELTA > prev
    });

    optimal || rising
}

/// Setup -> Release
fn enters_release(a: &AngleSet) -> bool {
    use release_entry::*;

    (a.elbow < A_ELBOW_MAX && a.shoulder > A_SHOULDER_MIN && a.elbow > A_ELBOW_MIN && a.dominant_knee > A_KNEE_MIN)
        || (a.dominant_knee > B_KNEE_MIN
            && a.elbow > B_ELBOW_MIN
            && a.shoulder > B_SHOULDER_MIN
            && a.forearm_alignment < B_FOREARM_MAX)
        || (a.shoulder > C_SHOULDER_MIN && a.elbow > C_ELBOW_MIN && a.elbow < C_ELBOW_MAX)
}

/// Release -> Follow-through, before the elbow-extension latch is applied
fn enters_follow_through(a: &AngleSet) -> bool {
    use follow_through_entry::*;

    (a.elbow > A_ELBOW_MIN && a.shoulder > A_SHOULDER_MIN && a.wrist > A_WRIST_MIN)
        || (a.wrist > B_WRIST_MIN
            && a.elbow > B_ELBOW_MIN
            && a.shoulder > B_SHOULDER_MIN
            && a.dominant_knee > B_KNEE_MIN)
        || (a.elbow > C_ELBOW_MIN && a.shoulder > C_SHOULDER_MIN)
}

/// Follow-through -> Complete, ignoring the frame cap
fn arm_dropped(a: &AngleSet) -> bool {
    a.shoulder < completion::SHOULDER_MAX && a.elbow < completion::ELBOW_MAX
}

/// Phase state machine for one shooter and one shot.
///
/// Each analysis run owns its analyzer; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct ShotAnalyzer {
    side: ShootingSide,
    frame_delta_t: f64,
    follow_through_cap: u32,

    phase: Phase,
    shot_completed: bool,
    allow_follow_through: bool,
    previous_knee_angle: Option<f64>,
    previous_shoulder_angle: Option<f64>,
    knee_velocity: Option<f64>,
    follow_through_frame_count: u32,
    shot_ended: bool,

    setup: SetupMetrics,
    release: ReleaseMetrics,
    follow_through: FollowThroughMetrics,
}

impl Default for ShotAnalyzer {
    fn default() -> Self {
        Self::new(ShootingSide::default(), DEFAULT_FRAME_DELTA_T)
    }
}

impl ShotAnalyzer {
    /// Create an analyzer for a shooting side and analyzed-frame interval (seconds)
    #[must_use]
    pub fn new(side: ShootingSide, frame_delta_t: f64) -> Self {
        Self::with_follow_through_cap(side, frame_delta_t, FOLLOW_THROUGH_FRAME_CAP)
    }

    /// Create an analyzer with a custom follow-through frame cap
    #[must_use]
    pub fn with_follow_through_cap(side: ShootingSide, frame_delta_t: f64, follow_through_cap: u32) -> Self {
        Self {
            side,
            frame_delta_t,
            follow_through_cap,
            phase: Phase::Null,
            shot_completed: false,
            allow_follow_through: false,
            previous_knee_angle: None,
            previous_shoulder_angle: None,
            knee_velocity: None,
            follow_through_frame_count: 0,
            shot_ended: false,
            setup: SetupMetrics::default(),
            release: ReleaseMetrics::default(),
            follow_through: FollowThroughMetrics::default(),
        }
    }

    /// Clear all accumulated state, keeping side, frame interval and cap
    pub fn reset(&mut self) {
        *self = Self::with_follow_through_cap(self.side, self.frame_delta_t, self.follow_through_cap);
    }

    /// Feed one frame and return the phase after it.
    ///
    /// `landmarks` must be the same frame's side-selected landmarks; they are
    /// read for wrist height, setpoint and elbow height.
    pub fn detect_phase(&mut self, angles: &AngleSet, landmarks: &LandmarkBundle) -> Phase {
        if self.phase == Phase::Complete {
            return self.phase;
        }

        self.track_knee_velocity(angles.dominant_knee);

        match self.phase {
            Phase::Null => self.step_null(angles),
            Phase::Setup => self.step_setup(angles, landmarks),
            Phase::Release => self.step_release(angles, landmarks),
            Phase::FollowThrough => self.step_follow_through(angles),
            Phase::Complete => {}
        }

        self.phase
    }

    fn track_knee_velocity(&mut self, knee: f64) {
        if let Some(prev) = self.previous_knee_angle {
            if self.frame_delta_t > 0.0 {
                self.knee_velocity = Some((knee - prev) / self.frame_delta_t);
            }
        }
        self.previous_knee_angle = Some(knee);
    }

    fn step_null(&mut self, a: &AngleSet) {
        self.allow_follow_through = false;

        if !self.shot_completed && enters_setup(a, self.previous_shoulder_angle) {
            info!("Setup started (shoulder {:.1}°, elbow {:.1}°)", a.shoulder, a.elbow);
            self.phase = Phase::Setup;
            // The triggering frame is the first Setup sample but is not counted
            // as a Setup frame.
            self.setup.sample(a);
        }

        self.previous_shoulder_angle = Some(a.shoulder);
    }

    fn step_setup(&mut self, a: &AngleSet, lm: &LandmarkBundle) {
        self.setup.count_frame();

        if !enters_release(a) {
            self.setup.sample(a);
            return;
        }

        self.phase = Phase::Release;
        if self.setup.finalize() {
            info!(
                "Release started after {} setup frames (elbow {:.1}°, shoulder {:.1}°)",
                self.setup.frame_count, a.elbow, a.shoulder
            );
            self.sample_release(a, lm);
        }
    }

    fn step_release(&mut self, a: &AngleSet, lm: &LandmarkBundle) {
        self.release.count_frame();

        if self.allow_follow_through && enters_follow_through(a) {
            self.phase = Phase::FollowThrough;
            self.allow_follow_through = false;

            if self.release.finalize() {
                info!(
                    "Follow-through started after {} release frames (elbow {:.1}°, shoulder {:.1}°)",
                    self.release.frame_count, a.elbow, a.shoulder
                );
            }
            let elbow_above_eye = geometry::elbow_eye_height(&lm.elbow, &lm.eye, &lm.shoulder, &lm.hip);
            self.follow_through
                .record_snapshot(&ReleaseSnapshot::capture(a, elbow_above_eye));
            return;
        }

        self.sample_release(a, lm);

        // Evaluated after the transition check: extension on this frame can only
        // permit a transition from the next frame on.
        if a.elbow > follow_through_entry::ARM_ELBOW_MIN {
            self.allow_follow_through = true;
        }
    }

    fn sample_release(&mut self, a: &AngleSet, lm: &LandmarkBundle) {
        let wrist_height = geometry::wrist_height(&lm.wrist, &lm.eye, &lm.shoulder, &lm.hip);
        let setpoint = geometry::release_setpoint(&lm.index_finger, &lm.eye, self.side);
        self.release.sample(a, wrist_height, setpoint);
    }

    fn step_follow_through(&mut self, a: &AngleSet) {
        self.shot_completed = true;
        self.follow_through_frame_count += 1;

        let capped = self.follow_through_frame_count >= self.follow_through_cap;
        if arm_dropped(a) || capped {
            if capped && !arm_dropped(a) {
                debug!("Follow-through capped at {} frames", self.follow_through_frame_count);
            }
            self.follow_through.finalize(self.follow_through_frame_count);
            self.phase = Phase::Complete;
            self.allow_follow_through = false;
            self.shot_ended = true;
            info!("Shot complete after {} follow-through frames", self.follow_through_frame_count);
        }
    }

    /// Consume the shot-ended edge. Returns `true` exactly once per completed shot.
    pub fn take_shot_ended(&mut self) -> bool {
        std::mem::take(&mut self.shot_ended)
    }

    /// Whether the shot-ended edge is pending
    #[must_use]
    pub fn shot_ended(&self) -> bool {
        self.shot_ended
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn side(&self) -> ShootingSide {
        self.side
    }

    #[must_use]
    pub fn frame_delta_t(&self) -> f64 {
        self.frame_delta_t
    }

    /// Whether a Follow-through has been observed in this run
    #[must_use]
    pub fn shot_completed(&self) -> bool {
        self.shot_completed
    }

    /// Whether the elbow has extended far enough during Release to allow Follow-through
    #[must_use]
    pub fn allow_follow_through(&self) -> bool {
        self.allow_follow_through
    }

    #[must_use]
    pub fn follow_through_frame_count(&self) -> u32 {
        self.follow_through_frame_count
    }

    /// Dominant knee angular velocity for the latest frame, in degrees per second
    #[must_use]
    pub fn knee_velocity(&self) -> Option<f64> {
        self.knee_velocity
    }

    #[must_use]
    pub fn previous_shoulder_angle(&self) -> Option<f64> {
        self.previous_shoulder_angle
    }

    #[must_use]
    pub fn setup(&self) -> &SetupMetrics {
        &self.setup
    }

    #[must_use]
    pub fn release(&self) -> &ReleaseMetrics {
        &self.release
    }

    #[must_use]
    pub fn follow_through(&self) -> &FollowThroughMetrics {
        &self.follow_through
    }
}
