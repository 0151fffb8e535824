//! Basketball shot form analysis from pose landmark streams.
//!
//! Given per-frame body landmarks of a single shooter, the library:
//! 1. Derives joint angles and relative positions for the shooting side
//! 2. Segments the shot into Setup, Release and Follow-through with a
//!    threshold-driven state machine
//! 3. Accumulates per-phase metrics and exports them as a flat feature map
//! 4. Optionally scores the shot against optimal feature ranges
//!
//! Pose estimation itself is external. Landmarks arrive through the
//! [`pipeline::PoseEstimator`] trait, either from a recorded
//! [`track::LandmarkTrack`] or from a model wrapped by the caller. The `opencv`
//! feature adds video decoding and phase snapshot images.
//!
//! # Examples
//!
//! ## Analyzing a Recorded Track
//!
//! ```no_run
//! use shot_form_analysis::{
//!     config::Config,
//!     pipeline::{NoSink, ShotPipeline},
//!     scoring::RangeScorer,
//!     track::{LandmarkTrack, TrackPoseEstimator},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut track = LandmarkTrack::open("shot.jsonl")?;
//! let mut pipeline = ShotPipeline::new(&config);
//!
//! let mut report = pipeline.run(&mut track, &mut TrackPoseEstimator, &mut NoSink)?;
//! report.apply_scorer(&RangeScorer::from_config(&config.scoring))?;
//!
//! println!("Release angle: {:?}", report.features.get("F_release_angle"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the State Machine Directly
//!
//! ```no_run
//! use shot_form_analysis::{
//!     geometry::AngleSet,
//!     landmarks::{PoseLandmarks, ShootingSide},
//!     metrics::FeatureMap,
//!     phase::{Phase, ShotAnalyzer},
//! };
//!
//! # fn frames() -> Vec<PoseLandmarks> { Vec::new() }
//! # fn main() {
//! let side = ShootingSide::Right;
//! let mut analyzer = ShotAnalyzer::new(side, 1.0 / 30.0);
//!
//! for pose in frames() {
//!     let bundle = pose.bundle(side);
//!     let angles = AngleSet::compute(&bundle, side);
//!     if analyzer.detect_phase(&angles, &bundle) == Phase::Complete {
//!         break;
//!     }
//! }
//!
//! let features = FeatureMap::finalize(&analyzer);
//! println!("{} features", features.len());
//! # }
//! ```

#![warn(clippy::missing_errors_doc)]

/// Pose landmark layout, shooting side and crop geometry
pub mod landmarks;

/// Pure joint-angle and relative-position calculations
pub mod geometry;

/// Shot phase state machine and per-phase metric accumulators
pub mod phase;

/// Flat feature map exported from finalized phases
pub mod metrics;

/// Head tilt stability statistics
pub mod stability;

/// Form scoring against optimal ranges
pub mod scoring;

/// Frame sampling and the analysis driver
pub mod pipeline;

/// Recorded landmark track input
pub mod track;

/// Video decoding and phase snapshots
#[cfg(feature = "opencv")]
pub mod video;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Error types and result aliases
pub mod error;

/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
