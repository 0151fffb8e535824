//! Error handling tests: error formatting, conversions and failure propagation

use shot_form_analysis::{
    config::Config,
    landmarks::{CropRegion, JointPoint, PoseLandmarks},
    metrics::FeatureMap,
    phase::Phase,
    pipeline::{FrameSource, NoSink, PoseEstimator, ShotPipeline},
    scoring::{RangeScorer, ShotScorer},
    track::{LandmarkTrack, TrackPoseEstimator},
    utils::safe_cast::{f64_to_usize, u32_to_i32},
    Error, Result,
};
use std::io::Cursor;

#[test]
fn test_safe_cast_errors() {
    assert!(u32_to_i32(u32::MAX).is_err());

    assert!(f64_to_usize(f64::NAN).is_err());
    assert!(f64_to_usize(f64::INFINITY).is_err());
    assert!(f64_to_usize(-1.0).is_err());
}

#[test]
fn test_error_display_formatting() {
    let errors = vec![
        Error::InvalidInput("Test input error".to_string()),
        Error::ConfigError("Test config error".to_string()),
        Error::VideoOpen("Test video".to_string()),
        Error::PoseEstimation("Test pose error".to_string()),
        Error::Scoring("Test scoring error".to_string()),
        Error::TrackFormat {
            line: 7,
            message: "Test track error".to_string(),
        },
    ];

    for error in errors {
        let display = format!("{error}");
        assert!(!display.is_empty());
        assert!(display.contains("Test"));
    }

    let track = Error::TrackFormat {
        line: 7,
        message: "bad".to_string(),
    };
    assert!(track.to_string().contains("line 7"));
}

#[test]
fn test_error_conversion_traits() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(Error::from(io), Error::Io(_)));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(Error::from(json), Error::Json(_)));

    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}

struct FailingSource;

impl FrameSource for FailingSource {
    type Frame = ();

    fn fps(&self) -> Option<f64> {
        None
    }

    fn frame_width(&self) -> u32 {
        640
    }

    fn next_frame(&mut self) -> Result<Option<()>> {
        Err(Error::VideoOpen("stream lost".to_string()))
    }
}

struct OneFrame(bool);

impl FrameSource for OneFrame {
    type Frame = ();

    fn fps(&self) -> Option<f64> {
        Some(30.0)
    }

    fn frame_width(&self) -> u32 {
        640
    }

    fn next_frame(&mut self) -> Result<Option<()>> {
        Ok(std::mem::take(&mut self.0).then_some(()))
    }
}

struct FailingEstimator;

impl PoseEstimator<()> for FailingEstimator {
    fn estimate(&mut self, _frame: &(), _crop: &CropRegion) -> Result<Option<PoseLandmarks>> {
        Err(Error::PoseEstimation("model crashed".to_string()))
    }
}

#[test]
fn test_source_errors_propagate() {
    let mut pipeline = ShotPipeline::new(&Config::default());
    let result = pipeline.run(&mut FailingSource, &mut FailingEstimator, &mut NoSink);
    assert!(matches!(result, Err(Error::VideoOpen(_))));
}

#[test]
fn test_estimator_errors_propagate() {
    let mut pipeline = ShotPipeline::new(&Config::default());
    let result = pipeline.run(&mut OneFrame(true), &mut FailingEstimator, &mut NoSink);
    assert!(matches!(result, Err(Error::PoseEstimation(_))));
}

struct NanEstimator;

impl PoseEstimator<()> for NanEstimator {
    fn estimate(&mut self, _frame: &(), _crop: &CropRegion) -> Result<Option<PoseLandmarks>> {
        let mut points = vec![JointPoint::new(0.5, 0.5); 33];
        points[13] = JointPoint::new(f64::NAN, 0.5);
        PoseLandmarks::new(points).map(Some)
    }
}

#[test]
fn test_non_finite_landmarks_are_estimation_errors() {
    let mut pipeline = ShotPipeline::new(&Config::default());
    let result = pipeline.run(&mut OneFrame(true), &mut NanEstimator, &mut NoSink);
    match result {
        Err(Error::PoseEstimation(message)) => assert!(message.contains("landmark 13"), "{message}"),
        other => panic!("expected pose estimation error, got {other:?}"),
    }
    assert_eq!(pipeline.analyzer().phase(), Phase::Null);
}

#[test]
fn test_track_errors_carry_line_numbers() {
    let text = "{\"fps\": 30.0, \"width\": 640, \"height\": 480}\n{\"landmarks\": null}\n{\"landmarks\": 5}\n";
    let mut track = LandmarkTrack::from_reader(Cursor::new(text)).unwrap();
    let mut pipeline = ShotPipeline::new(&Config::default());

    let result = pipeline.run(&mut track, &mut TrackPoseEstimator, &mut NoSink);
    match result {
        Err(Error::TrackFormat { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected track format error, got {other:?}"),
    }
}

#[test]
fn test_scorer_rejects_unrelated_features() {
    let mut features = FeatureMap::default();
    features.insert("unrelated", 1.0);
    let result = RangeScorer::default().score(&features, None);
    assert!(matches!(result, Err(Error::Scoring(_))));
}
