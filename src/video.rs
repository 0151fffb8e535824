//! Video decoding and phase snapshots with `OpenCV`.

use crate::{
    config::OutputConfig,
    landmarks::{CropRegion, PoseLandmarks, ShootingSide},
    phase::Phase,
    pipeline::{FrameSource, PhaseFrameSink},
    utils::safe_cast::{normalized_to_pixel, u32_to_i32},
    Error, Result,
};
use log::{debug, info};
use opencv::{
    core::{Mat, Point, Rect, Scalar, Vector},
    imgcodecs,
    imgproc::{self, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_FPS, CAP_PROP_FRAME_WIDTH},
};
use std::path::{Path, PathBuf};

/// Frame source reading a video file
pub struct VideoFileSource {
    capture: VideoCapture,
    fps: Option<f64>,
    frame_width: u32,
}

impl VideoFileSource {
    /// Open a video file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.to_string_lossy();
        info!("Opening video file: {name}");

        let capture = VideoCapture::from_file(&name, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::VideoOpen(name.into_owned()));
        }

        let fps = Some(capture.get(CAP_PROP_FPS)?).filter(|fps| fps.is_finite() && *fps > 0.0);
        let width = capture.get(CAP_PROP_FRAME_WIDTH)?;
        if !(width.is_finite() && width >= 1.0) {
            return Err(Error::VideoOpen(format!("{name}: unknown frame width")));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frame_width = width as u32;

        debug!("Video {name}: {fps:?} fps, {frame_width} px wide");
        Ok(Self {
            capture,
            fps,
            frame_width,
        })
    }
}

impl FrameSource for VideoFileSource {
    type Frame = Mat;

    fn fps(&self) -> Option<f64> {
        self.fps
    }

    fn frame_width(&self) -> u32 {
        self.frame_width
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

/// Copy the crop region out of a frame
///
/// # Errors
///
/// Returns an error if the region lies outside the frame
pub fn crop_frame(frame: &Mat, crop: &CropRegion) -> Result<Mat> {
    let rect = Rect::new(u32_to_i32(crop.x_offset)?, 0, u32_to_i32(crop.width)?, frame.rows());
    if rect.x + rect.width > frame.cols() {
        return Err(Error::InvalidInput(format!(
            "Crop {}+{} exceeds frame width {}",
            rect.x,
            rect.width,
            frame.cols()
        )));
    }
    let roi = Mat::roi(frame, rect)?;
    Ok(roi.try_clone()?)
}

/// BGR drawing color for a phase
#[must_use]
pub fn phase_color(phase: Phase) -> Scalar {
    match phase {
        Phase::Setup => Scalar::new(0.0, 0.0, 255.0, 0.0),
        Phase::Release => Scalar::new(0.0, 255.0, 255.0, 0.0),
        Phase::FollowThrough => Scalar::new(0.0, 255.0, 0.0, 0.0),
        Phase::Null | Phase::Complete => Scalar::new(255.0, 255.0, 255.0, 0.0),
    }
}

/// Writes the first frame of each phase as an annotated PNG
pub struct PhaseSnapshotWriter {
    dir: PathBuf,
    id: String,
    side: ShootingSide,
    written: Vec<PathBuf>,
}

impl PhaseSnapshotWriter {
    /// Create a writer; the directory is created if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(dir: P, id: &str, side: ShootingSide) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            id: id.to_string(),
            side,
            written: Vec::new(),
        })
    }

    /// Writer for the configured snapshot directory, `None` when snapshots
    /// are disabled
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub fn from_config(output: &OutputConfig, id: &str, side: ShootingSide) -> Result<Option<Self>> {
        output
            .snapshot_dir
            .as_ref()
            .map(|dir| Self::new(dir, id, side))
            .transpose()
    }

    /// Paths written so far
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn annotate(&self, frame: &mut Mat, phase: Phase, pose: &PoseLandmarks) -> Result<()> {
        let width = u32::try_from(frame.cols()).unwrap_or(0);
        let height = u32::try_from(frame.rows()).unwrap_or(0);
        let color = phase_color(phase);
        let b = pose.bundle(self.side);

        for joint in [b.shoulder, b.elbow, b.wrist, b.index_finger, b.hip, b.knee, b.ankle, b.eye, b.ear] {
            imgproc::circle(
                frame,
                Point::new(normalized_to_pixel(joint.x, width), normalized_to_pixel(joint.y, height)),
                5,
                color,
                -1,
                LINE_8,
                0,
            )?;
        }
        Ok(())
    }
}

impl PhaseFrameSink<Mat> for PhaseSnapshotWriter {
    fn phase_started(&mut self, phase: Phase, frame: &Mat, pose: &PoseLandmarks) -> Result<()> {
        let Some(prefix) = phase.snapshot_prefix() else {
            return Ok(());
        };

        let mut annotated = frame.try_clone()?;
        self.annotate(&mut annotated, phase, pose)?;

        let path = self.dir.join(format!("{prefix}_{}.png", self.id));
        let written = imgcodecs::imwrite(&path.to_string_lossy(), &annotated, &Vector::new())?;
        if !written {
            return Err(Error::InvalidInput(format!("Failed to write {}", path.display())));
        }

        info!("Saved {phase} snapshot to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}
