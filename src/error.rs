//! Error types for the shot form analysis library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A landmark track file could not be parsed
    #[error("Track format error at line {line}: {message}")]
    TrackFormat {
        /// 1-based line number in the track file
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The input video could not be opened or decoded
    #[error("Video open error: {0}")]
    VideoOpen(String),

    /// The external pose estimator failed on a frame
    #[error("Pose estimation error: {0}")]
    PoseEstimation(String),

    /// The scoring collaborator rejected the feature map
    #[error("Scoring error: {0}")]
    Scoring(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
