//! Frame pipeline: sampling, pose lookup, phase stepping and feature collection.
//!
//! The driver is generic over where frames come from ([`FrameSource`]), how
//! landmarks are obtained from a frame ([`PoseEstimator`]) and what happens to
//! the first frame of each phase ([`PhaseFrameSink`]). Processing is a single
//! sequential pass; each [`ShotPipeline`] owns its analyzer.

use crate::{
    config::{AnalysisConfig, Config},
    geometry::AngleSet,
    landmarks::{CropRegion, PoseLandmarks},
    metrics::FeatureMap,
    phase::{Phase, ShotAnalyzer},
    scoring::{ShotScore, ShotScorer},
    stability::{HeadStabilityTracker, Statistics},
    utils::safe_cast::f64_to_usize,
    Error, Result,
};
use log::{debug, info, warn};
use serde::Serialize;

/// A sequence of decoded frames
pub trait FrameSource {
    /// Decoded frame type
    type Frame;

    /// Source frame rate, if known
    fn fps(&self) -> Option<f64>;

    /// Frame width in pixels
    fn frame_width(&self) -> u32;

    /// Next frame, or `None` at end of stream
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read
    fn next_frame(&mut self) -> Result<Option<Self::Frame>>;
}

/// External pose collaborator
pub trait PoseEstimator<F> {
    /// Estimate landmarks on the `crop` region of `frame`.
    ///
    /// Returned coordinates are normalized relative to the crop and must be
    /// finite. `None` means nobody was detected.
    ///
    /// # Errors
    ///
    /// Returns an error if estimation itself fails
    fn estimate(&mut self, frame: &F, crop: &CropRegion) -> Result<Option<PoseLandmarks>>;
}

/// Receives the first frame of each shot phase
pub trait PhaseFrameSink<F> {
    /// Called once per phase, on the first analyzed frame in that phase
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be handled
    fn phase_started(&mut self, phase: Phase, frame: &F, pose: &PoseLandmarks) -> Result<()>;
}

/// Sink that discards phase frames
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSink;

impl<F> PhaseFrameSink<F> for NoSink {
    fn phase_started(&mut self, _phase: Phase, _frame: &F, _pose: &PoseLandmarks) -> Result<()> {
        Ok(())
    }
}

/// An absent sink discards phase frames
impl<F, K: PhaseFrameSink<F>> PhaseFrameSink<F> for Option<K> {
    fn phase_started(&mut self, phase: Phase, frame: &F, pose: &PoseLandmarks) -> Result<()> {
        match self {
            Some(sink) => sink.phase_started(phase, frame, pose),
            None => Ok(()),
        }
    }
}

/// Number of source frames per analyzed frame.
///
/// Sources faster than the target are downsampled by skipping frames; slower
/// sources are analyzed frame by frame, never upsampled. An unknown or invalid
/// source rate is treated as the target rate.
///
/// # Errors
///
/// Returns an error if the resulting stride cannot be represented
pub fn frame_stride(source_fps: Option<f64>, target_fps: f64) -> Result<usize> {
    let source_fps = source_fps.filter(|fps| fps.is_finite() && *fps > 0.0).unwrap_or(target_fps);
    let ratio = target_fps / source_fps;
    if ratio < 1.0 {
        Ok(f64_to_usize(1.0 / ratio)?.max(1))
    } else {
        Ok(1)
    }
}

/// Source frame index of the first analyzed frame in each phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseFrames {
    pub setup: Option<usize>,
    pub release: Option<usize>,
    pub follow_through: Option<usize>,
}

impl PhaseFrames {
    fn slot(&mut self, phase: Phase) -> Option<&mut Option<usize>> {
        match phase {
            Phase::Setup => Some(&mut self.setup),
            Phase::Release => Some(&mut self.release),
            Phase::FollowThrough => Some(&mut self.follow_through),
            Phase::Null | Phase::Complete => None,
        }
    }
}

/// Everything produced by one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct ShotReport {
    /// Complete feature map, every required key present
    pub features: FeatureMap,
    /// Required features that had to be defaulted
    pub warnings: Vec<String>,
    /// Phase reached when the input ended
    pub final_phase: Phase,
    /// Whether a shot completed
    pub shot_completed: bool,
    pub phase_frames: PhaseFrames,
    /// Frames read from the source
    pub frames_read: usize,
    /// Frames kept after downsampling
    pub frames_sampled: usize,
    /// Sampled frames with a detected pose
    pub frames_analyzed: usize,
    /// Head tilt statistics over Setup and Release
    pub head_stability: Option<Statistics>,
    /// Score from the configured scorer, if one was applied
    pub score: Option<ShotScore>,
}

impl ShotReport {
    /// Score the report's features
    ///
    /// # Errors
    ///
    /// Returns an error if the scorer rejects the features
    pub fn apply_scorer(&mut self, scorer: &dyn ShotScorer) -> Result<()> {
        let score = scorer.score(&self.features, self.head_stability.as_ref())?;
        info!("{} scored the shot {:.1}", scorer.name(), score.score);
        self.score = Some(score);
        Ok(())
    }
}

/// Single-pass driver for one shooter
pub struct ShotPipeline {
    config: AnalysisConfig,
    analyzer: ShotAnalyzer,
    stability: HeadStabilityTracker,
}

impl ShotPipeline {
    /// Create a pipeline from configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.analysis.clone(),
            analyzer: config.analysis.analyzer(),
            stability: config.scoring.stability_tracker(),
        }
    }

    /// Analyzer state, for inspection
    #[must_use]
    pub fn analyzer(&self) -> &ShotAnalyzer {
        &self.analyzer
    }

    /// Prepare for a new shot
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.stability.reset();
    }

    /// Run the pipeline over a whole source
    ///
    /// # Errors
    ///
    /// Returns an error if the source, the pose estimator or the sink fails
    pub fn run<S, E, K>(&mut self, source: &mut S, estimator: &mut E, sink: &mut K) -> Result<ShotReport>
    where
        S: FrameSource,
        E: PoseEstimator<S::Frame>,
        K: PhaseFrameSink<S::Frame>,
    {
        let stride = frame_stride(source.fps(), self.config.target_fps)?;
        let side = self.config.shooting_side;
        info!(
            "Analyzing {} shooter, stride {} (source {:?} fps, target {} fps)",
            side,
            stride,
            source.fps(),
            self.config.target_fps
        );

        let mut features = FeatureMap::default();
        let mut phase_frames = PhaseFrames::default();
        let mut frames_read = 0;
        let mut frames_sampled = 0;
        let mut frames_analyzed = 0;

        while let Some(frame) = source.next_frame()? {
            let index = frames_read;
            frames_read += 1;
            if index % stride != 0 {
                continue;
            }
            frames_sampled += 1;

            let crop = CropRegion::for_side(side, source.frame_width());
            let Some(raw) = estimator.estimate(&frame, &crop)? else {
                debug!("No pose on frame {index}, skipping");
                continue;
            };
            if let Some(i) = raw.points().iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
                return Err(Error::PoseEstimation(format!(
                    "landmark {i} on frame {index} is not finite"
                )));
            }
            frames_analyzed += 1;

            let pose = raw.to_full_frame(&crop);
            let bundle = pose.bundle(side);
            let angles = AngleSet::compute(&bundle, side);
            let phase = self.analyzer.detect_phase(&angles, &bundle);

            if matches!(phase, Phase::Setup | Phase::Release) {
                self.stability.update(angles.head_tilt);
            }

            if self.analyzer.take_shot_ended() {
                features.merge(FeatureMap::from_analyzer(&self.analyzer));
            }

            if let Some(slot) = phase_frames.slot(phase) {
                if slot.is_none() {
                    *slot = Some(index);
                    sink.phase_started(phase, &frame, &pose)?;
                }
            }
        }

        let final_phase = self.analyzer.phase();
        if final_phase != Phase::Complete {
            warn!("Input ended in phase {final_phase}; the shot did not complete");
        }

        features.fill_required_defaults();
        info!(
            "Analyzed {frames_analyzed} of {frames_read} frames, {} features",
            features.len()
        );

        Ok(ShotReport {
            warnings: features.missing().to_vec(),
            features,
            final_phase,
            shot_completed: final_phase == Phase::Complete,
            phase_frames,
            frames_read,
            frames_sampled,
            frames_analyzed,
            head_stability: self.stability.get_stats(),
            score: None,
        })
    }
}
