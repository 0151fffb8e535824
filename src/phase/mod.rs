//! Shot phase detection.
//!
//! A shot moves through `Null -> Setup -> Release -> Follow-through -> Complete`.
//! [`ShotAnalyzer`] consumes one frame of measurements at a time, advances the
//! phase when the tuned threshold predicates fire, and accumulates per-phase
//! statistics in the records of [`accumulators`].

/// Per-phase running statistics with an explicit finalize step
pub mod accumulators;

/// The phase state machine
pub mod analyzer;

pub use accumulators::{FollowThroughMetrics, Lifecycle, ReleaseMetrics, SetupMetrics};
pub use analyzer::ShotAnalyzer;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the shooting motion.
///
/// The derived ordering matches the order phases occur in, so a phase never
/// compares less than one observed earlier in the same shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No shot in progress
    #[default]
    Null,
    /// Ball gathered and brought up, legs loading
    Setup,
    /// Ball raised to the setpoint and pushed up
    Release,
    /// Arm extended after the ball has left the hand
    #[serde(rename = "Follow-through")]
    FollowThrough,
    /// Shot finished; absorbing until the analyzer is reset
    Complete,
}

impl Phase {
    /// Prefix of exported feature keys, for phases that export features
    #[must_use]
    pub const fn feature_prefix(self) -> Option<&'static str> {
        match self {
            Self::Setup => Some("S_"),
            Self::Release => Some("R_"),
            Self::FollowThrough => Some("F_"),
            Self::Null | Self::Complete => None,
        }
    }

    /// File name prefix of the snapshot written when the phase starts
    #[must_use]
    pub const fn snapshot_prefix(self) -> Option<&'static str> {
        match self {
            Self::Setup => Some("SETUP"),
            Self::Release => Some("RELEASE"),
            Self::FollowThrough => Some("FOLLOW"),
            Self::Null | Self::Complete => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "Null",
            Self::Setup => "Setup",
            Self::Release => "Release",
            Self::FollowThrough => "Follow-through",
            Self::Complete => "Complete",
        };
        f.write_str(name)
    }
}
