//! Constants used throughout the analysis
//!
//! Phase thresholds were tuned empirically against recorded shots. They define
//! the behavior of the phase detector and must be changed together with the
//! scoring ranges, never in isolation.

/// Number of landmarks produced per frame by the pose collaborator
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Target analysis sampling rate
pub const TARGET_FPS: f64 = 30.0;

/// Seconds between analyzed frames at the target sampling rate
pub const DEFAULT_FRAME_DELTA_T: f64 = 1.0 / TARGET_FPS;

/// Follow-through frames after which a shot is force-completed
pub const FOLLOW_THROUGH_FRAME_CAP: u32 = 35;

/// Scale applied to the eye-relative wrist height ratio
pub const WRIST_HEIGHT_SCALE: f64 = 10.0;

/// Scale applied to raw normalized differences (`x * 1000 / 2`)
pub const OFFSET_SCALE: f64 = 1000.0 / 2.0;

/// Offset subtracted from the averaged release shoulder angle and release angle
pub const SHOULDER_VERTICAL_OFFSET: f64 = 90.0;

/// Null -> Setup, optimal entry pose
pub mod setup_entry {
    /// Shoulder angle lower bound (exclusive)
    pub const OPTIMAL_SHOULDER_MIN: f64 = 3.0;
    /// Shoulder angle upper bound (exclusive)
    pub const OPTIMAL_SHOULDER_MAX: f64 = 45.0;
    /// Elbow angle upper bound (exclusive)
    pub const OPTIMAL_ELBOW_MAX: f64 = 135.0;
    /// Dominant knee angle upper bound (exclusive)
    pub const OPTIMAL_KNEE_MAX: f64 = 170.0;
    /// Head tilt lower bound (exclusive), shared by both entry rules
    pub const HEAD_TILT_MIN: f64 = 10.0;
    /// Shoulder angle lower bound (exclusive) for the rising-arm rule
    pub const RISING_SHOULDER_MIN: f64 = 5.0;
    /// Shoulder angle upper bound (exclusive) for the rising-arm rule
    pub const RISING_SHOULDER_MAX: f64 = 60.0;
    /// Elbow angle upper bound (exclusive) for the rising-arm rule
    pub const RISING_ELBOW_MAX: f64 = 150.0;
    /// Minimum shoulder rise since the previous frame
    pub const RISING_SHOULDER_DELTA: f64 = 3.0;
}

/// Setup -> Release
pub mod release_entry {
    /// Arm raised with a bent elbow over extended legs
    pub const A_ELBOW_MIN: f64 = 70.0;
    pub const A_ELBOW_MAX: f64 = 110.0;
    pub const A_SHOULDER_MIN: f64 = 70.0;
    pub const A_KNEE_MIN: f64 = 150.0;

    /// Legs fully extended with a vertical forearm
    pub const B_KNEE_MIN: f64 = 170.0;
    pub const B_ELBOW_MIN: f64 = 65.0;
    pub const B_SHOULDER_MIN: f64 = 45.0;
    pub const B_FOREARM_MAX: f64 = 20.0;

    /// Arm high with a partially bent elbow
    pub const C_SHOULDER_MIN: f64 = 85.0;
    pub const C_ELBOW_MIN: f64 = 80.0;
    pub const C_ELBOW_MAX: f64 = 140.0;
}

/// Release -> Follow-through
pub mod follow_through_entry {
    /// Elbow extension that arms the follow-through latch
    pub const ARM_ELBOW_MIN: f64 = 130.0;

    pub const A_ELBOW_MIN: f64 = 163.0;
    pub const A_SHOULDER_MIN: f64 = 130.0;
    pub const A_WRIST_MIN: f64 = 160.0;

    pub const B_WRIST_MIN: f64 = 174.0;
    pub const B_ELBOW_MIN: f64 = 148.0;
    pub const B_SHOULDER_MIN: f64 = 120.0;
    pub const B_KNEE_MIN: f64 = 165.0;

    pub const C_ELBOW_MIN: f64 = 170.0;
    pub const C_SHOULDER_MIN: f64 = 120.0;
}

/// Follow-through -> Complete
pub mod completion {
    /// Arm dropped back below this shoulder angle
    pub const SHOULDER_MAX: f64 = 120.0;
    /// Elbow angle upper bound (exclusive)
    pub const ELBOW_MAX: f64 = 180.0;
}

/// Default head-tilt standard deviation (degrees) above which the head is unstable
pub const DEFAULT_HEAD_STABILITY_THRESHOLD: f64 = 6.0;

/// Default rolling window for head stability statistics
pub const DEFAULT_HEAD_STABILITY_WINDOW: usize = 30;
