//! Recorded landmark tracks.
//!
//! A track is a JSON-lines file produced by running a pose model over a video
//! ahead of time. The first line is a header:
//!
//! ```text
//! {"fps": 60.0, "width": 1280, "height": 720}
//! ```
//!
//! Every following line is one video frame. `landmarks` holds the 33 pose
//! points as `[x, y, z]` triples, normalized relative to the analyzed half of
//! the frame, or `null` when no pose was detected:
//!
//! ```text
//! {"landmarks": [[0.41, 0.22, -0.1], ...]}
//! {"landmarks": null}
//! ```
//!
//! Blank lines are ignored.
//!
//! [`PhaseLandmarkWriter`] is the track counterpart of the video snapshot
//! writer: it saves the full-frame landmarks of the first frame of each phase
//! as `SETUP_<id>.json`, `RELEASE_<id>.json` and `FOLLOW_<id>.json`.

use crate::{
    config::OutputConfig,
    landmarks::{CropRegion, JointPoint, PoseLandmarks},
    phase::Phase,
    pipeline::{FrameSource, PhaseFrameSink, PoseEstimator},
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Lines, Write},
    path::{Path, PathBuf},
};

/// First line of a track file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackHeader {
    /// Frame rate of the recorded video
    pub fps: Option<f64>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct TrackRecord {
    landmarks: Option<Vec<[f64; 3]>>,
}

/// One frame of a track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackFrame {
    /// 1-based line number the frame was read from
    pub line: usize,
    /// Crop-relative landmarks, if a pose was detected
    pub pose: Option<PoseLandmarks>,
}

/// Frame source backed by a landmark track
pub struct LandmarkTrack<R: BufRead> {
    header: TrackHeader,
    lines: Lines<R>,
    line: usize,
}

impl LandmarkTrack<BufReader<File>> {
    /// Open a track file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its header is invalid
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening landmark track {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: BufRead> LandmarkTrack<R> {
    /// Read a track from any buffered reader
    ///
    /// # Errors
    ///
    /// Returns an error if the header line is missing or invalid
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let mut line = 0;

        let header = loop {
            line += 1;
            let Some(text) = lines.next().transpose()? else {
                return Err(Error::TrackFormat {
                    line,
                    message: "missing header".to_string(),
                });
            };
            if text.trim().is_empty() {
                continue;
            }
            let header: TrackHeader = serde_json::from_str(&text).map_err(|e| Error::TrackFormat {
                line,
                message: format!("invalid header: {e}"),
            })?;
            break header;
        };

        if header.width == 0 {
            return Err(Error::TrackFormat {
                line,
                message: "frame width must be greater than 0".to_string(),
            });
        }

        Ok(Self { header, lines, line })
    }

    #[must_use]
    pub fn header(&self) -> &TrackHeader {
        &self.header
    }

    fn parse_record(&self, text: &str) -> Result<Option<PoseLandmarks>> {
        let record: TrackRecord = serde_json::from_str(text).map_err(|e| Error::TrackFormat {
            line: self.line,
            message: e.to_string(),
        })?;

        let Some(raw) = record.landmarks else {
            return Ok(None);
        };
        let points = raw.into_iter().map(|[x, y, z]| JointPoint { x, y, z }).collect();
        PoseLandmarks::new(points).map(Some).map_err(|e| Error::TrackFormat {
            line: self.line,
            message: e.to_string(),
        })
    }
}

impl<R: BufRead> FrameSource for LandmarkTrack<R> {
    type Frame = TrackFrame;

    fn fps(&self) -> Option<f64> {
        self.header.fps
    }

    fn frame_width(&self) -> u32 {
        self.header.width
    }

    fn next_frame(&mut self) -> Result<Option<TrackFrame>> {
        loop {
            self.line += 1;
            let Some(text) = self.lines.next().transpose()? else {
                return Ok(None);
            };
            if text.trim().is_empty() {
                continue;
            }
            let pose = self.parse_record(&text)?;
            return Ok(Some(TrackFrame { line: self.line, pose }));
        }
    }
}

/// Pose estimator that returns the landmarks already stored in a track frame
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackPoseEstimator;

impl PoseEstimator<TrackFrame> for TrackPoseEstimator {
    fn estimate(&mut self, frame: &TrackFrame, _crop: &CropRegion) -> Result<Option<PoseLandmarks>> {
        Ok(frame.pose.clone())
    }
}

#[derive(Serialize)]
struct PhaseLandmarks {
    phase: Phase,
    line: usize,
    landmarks: Vec<[f64; 3]>,
}

/// Writes the landmarks of the first track frame of each phase as JSON
pub struct PhaseLandmarkWriter {
    dir: PathBuf,
    id: String,
    written: Vec<PathBuf>,
}

impl PhaseLandmarkWriter {
    /// Create a writer; the directory is created if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(dir: P, id: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            id: id.to_string(),
            written: Vec::new(),
        })
    }

    /// Writer for the configured snapshot directory, `None` when snapshots
    /// are disabled
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn from_config(output: &OutputConfig, id: &str) -> Result<Option<Self>> {
        output.snapshot_dir.as_ref().map(|dir| Self::new(dir, id)).transpose()
    }

    /// Paths written so far
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl PhaseFrameSink<TrackFrame> for PhaseLandmarkWriter {
    fn phase_started(&mut self, phase: Phase, frame: &TrackFrame, pose: &PoseLandmarks) -> Result<()> {
        let Some(prefix) = phase.snapshot_prefix() else {
            return Ok(());
        };

        let snapshot = PhaseLandmarks {
            phase,
            line: frame.line,
            landmarks: pose.points().iter().map(|p| [p.x, p.y, p.z]).collect(),
        };
        let path = self.dir.join(format!("{prefix}_{}.json", self.id));
        let mut out = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut out, &snapshot)?;
        out.flush()?;

        info!("Saved {phase} landmarks to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
