//! Frame pipeline driver tests over synthetic landmark streams


use shot_form_analysis::{
    config::Config,
    landmarks::{PoseLandmarks, ShootingSide},
    metrics::REQUIRED_FEATURES,
    phase::Phase,
    pipeline::{FrameSource, NoSink, PhaseFrameSink, PhaseFrames, ShotPipeline},
    scoring::RangeScorer,
    track::{LandmarkTrack, TrackPoseEstimator},
    Result,
};
use std::io::Cursor;
use test_helpers::{scenario_a, scenario_c, StoredPose, SyntheticSource};

const WIDTH: u32 = 1280;

fn config(side: ShootingSide) -> Config {
    let mut config = Config::default();
    config.analysis.shooting_side = side;
    config
}

#[derive(Default)]
struct RecordingSink {
    phases: Vec<Phase>,
}

impl PhaseFrameSink<Option<PoseLandmarks>> for RecordingSink {
    fn phase_started(&mut self, phase: Phase, _frame: &Option<PoseLandmarks>, _pose: &PoseLandmarks) -> Result<()> {
        self.phases.push(phase);
        Ok(())
    }
}

#[test]
fn test_full_shot_right_shooter() {
    let frames = scenario_a();
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let mut pipeline = ShotPipeline::new(&config(ShootingSide::Right));

    let report = pipeline.run(&mut source, &mut StoredPose, &mut NoSink).unwrap();

    assert!(report.shot_completed);
    assert_eq!(report.final_phase, Phase::Complete);
    assert_eq!(
        report.phase_frames,
        PhaseFrames {
            setup: Some(10),
            release: Some(25),
            follow_through: Some(40),
        }
    );
    assert_eq!(report.frames_read, frames.len());
    assert_eq!(report.frames_analyzed, frames.len());
    assert!(report.warnings.is_empty());

    let features = &report.features;
    assert_eq!(features.get("S_frame_count"), Some(15.0));
    assert_eq!(features.get("R_frame_count"), Some(15.0));
    assert_eq!(features.get("F_frame_count"), Some(15.0));
    assert!((features.get("S_avg_knee_bend").unwrap() - 150.0).abs() < 1e-6);
    assert!((features.get("F_head_tilt").unwrap() - 40.0).abs() < 1e-6);
    assert!(features.get("S_avg_body_lean").unwrap().abs() < 1e-6);
}

#[test]
fn test_left_shooter_on_right_half() {
    let frames = scenario_a();
    let mut right_source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let mut left_source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Left, &frames);

    let right = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut right_source, &mut StoredPose, &mut NoSink)
        .unwrap();
    let left = ShotPipeline::new(&config(ShootingSide::Left))
        .run(&mut left_source, &mut StoredPose, &mut NoSink)
        .unwrap();

    assert!(left.shot_completed);
    assert_eq!(left.phase_frames, right.phase_frames);
    for key in ["S_frame_count", "R_frame_count", "F_frame_count", "R_avg_knee_bend", "R_avg_elbow_angle"] {
        let (l, r) = (left.features.get(key).unwrap(), right.features.get(key).unwrap());
        assert!((l - r).abs() < 1e-6, "{key}: left {l} right {r}");
    }
}

#[test]
fn test_fast_source_is_downsampled() {
    let frames = scenario_a();
    let mut source =
        SyntheticSource::from_specs(Some(60.0), WIDTH, ShootingSide::Right, &frames).repeat_frames(2);
    let mut pipeline = ShotPipeline::new(&config(ShootingSide::Right));

    let report = pipeline.run(&mut source, &mut StoredPose, &mut NoSink).unwrap();

    assert_eq!(report.frames_read, frames.len() * 2);
    assert_eq!(report.frames_sampled, frames.len());
    assert_eq!(report.phase_frames.setup, Some(20));
    assert_eq!(report.phase_frames.release, Some(50));
    assert_eq!(report.features.get("S_frame_count"), Some(15.0));
    assert_eq!(report.features.get("R_frame_count"), Some(15.0));
}

#[test]
fn test_slow_source_is_not_upsampled() {
    let frames = scenario_a();
    let mut source = SyntheticSource::from_specs(Some(15.0), WIDTH, ShootingSide::Right, &frames);
    let report = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut source, &mut StoredPose, &mut NoSink)
        .unwrap();

    assert_eq!(report.frames_sampled, frames.len());
    assert_eq!(report.phase_frames.setup, Some(10));
}

#[test]
fn test_frames_without_pose_are_skipped() {
    let frames = scenario_a();
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let mut poses: Vec<Option<PoseLandmarks>> = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        poses.push(frame);
    }
    // Pose drops out for five frames in the middle of Setup
    for _ in 0..5 {
        poses.insert(15, None);
    }
    let mut source = SyntheticSource::new(Some(30.0), WIDTH, poses);

    let report = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut source, &mut StoredPose, &mut NoSink)
        .unwrap();

    assert_eq!(report.frames_read, frames.len() + 5);
    assert_eq!(report.frames_analyzed, frames.len());
    assert_eq!(report.phase_frames.release, Some(30));
    assert_eq!(report.features.get("S_frame_count"), Some(15.0));
}

#[test]
fn test_incomplete_shot_defaults_required_features() {
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &scenario_c());
    let report = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut source, &mut StoredPose, &mut NoSink)
        .unwrap();

    assert!(!report.shot_completed);
    assert_eq!(report.final_phase, Phase::Setup);
    assert_eq!(report.warnings.len(), REQUIRED_FEATURES.len());
    for key in REQUIRED_FEATURES {
        assert_eq!(report.features.get(key), Some(0.0));
    }
}

#[test]
fn test_sink_sees_each_phase_once() {
    let mut frames = scenario_a();
    frames.extend(scenario_a());
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let mut sink = RecordingSink::default();

    ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut source, &mut StoredPose, &mut sink)
        .unwrap();

    assert_eq!(sink.phases, vec![Phase::Setup, Phase::Release, Phase::FollowThrough]);
}

#[test]
fn test_track_file_matches_in_memory_source() {
    let frames = scenario_a();
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let mut poses = Vec::new();
    while let Some(frame) = source.next_frame().unwrap() {
        poses.push(frame);
    }
    poses.insert(3, None);

    let text = test_helpers::track_text(30.0, WIDTH, &poses);
    let mut track = LandmarkTrack::from_reader(Cursor::new(text)).unwrap();
    let mut memory = SyntheticSource::new(Some(30.0), WIDTH, poses);

    let from_track = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut track, &mut TrackPoseEstimator, &mut NoSink)
        .unwrap();
    let from_memory = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut memory, &mut StoredPose, &mut NoSink)
        .unwrap();

    assert_eq!(from_track.phase_frames, from_memory.phase_frames);
    assert_eq!(from_track.features.len(), from_memory.features.len());
    for (key, value) in from_memory.features.iter() {
        let parsed = from_track.features.get(key).unwrap();
        assert!((parsed - value).abs() < 1e-6, "{key}: {parsed} vs {value}");
    }
}

#[test]
fn test_reset_and_rerun_is_deterministic() {
    let frames = scenario_a();
    let mut pipeline = ShotPipeline::new(&config(ShootingSide::Right));

    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let first = pipeline.run(&mut source, &mut StoredPose, &mut NoSink).unwrap();

    pipeline.reset();
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &frames);
    let second = pipeline.run(&mut source, &mut StoredPose, &mut NoSink).unwrap();

    assert_eq!(first.features, second.features);
    assert_eq!(first.phase_frames, second.phase_frames);
}

#[test]
fn test_head_stability_and_score() {
    let mut source = SyntheticSource::from_specs(Some(30.0), WIDTH, ShootingSide::Right, &scenario_a());
    let mut report = ShotPipeline::new(&config(ShootingSide::Right))
        .run(&mut source, &mut StoredPose, &mut NoSink)
        .unwrap();

    let stats = report.head_stability.unwrap();
    assert!(stats.std_dev < 1e-6);
    assert!((stats.mean - 40.0).abs() < 1e-6);

    report.apply_scorer(&RangeScorer::default()).unwrap();
    let score = report.score.as_ref().unwrap();
    assert!((0.0..=100.0).contains(&score.score));
    assert!(score.feedback.iter().all(|f| f.key != "opt_A_head_stability"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["final_phase"], "Complete");
    assert_eq!(json["phase_frames"]["setup"], 10);
}
