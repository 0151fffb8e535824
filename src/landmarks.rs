//! Pose landmark types and side selection.
//!
//! Landmarks arrive from the external pose collaborator in the 33-point
//! `MediaPipe` layout, normalized to `0..1` over the image they were computed
//! on. The driver crops each frame to the shooting half before estimation, so
//! raw coordinates are crop-relative and are rescaled into full-frame space
//! with [`CropRegion::to_full_frame`].

use crate::{constants::NUM_POSE_LANDMARKS, Error, Result};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Landmark indices of the 33-point pose layout
pub mod index {
    pub const NOSE: usize = 0;
    pub const LEFT_EYE: usize = 2;
    pub const RIGHT_EYE: usize = 5;
    pub const LEFT_EAR: usize = 7;
    pub const RIGHT_EAR: usize = 8;
    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_INDEX: usize = 19;
    pub const RIGHT_INDEX: usize = 20;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
    pub const LEFT_HEEL: usize = 29;
    pub const RIGHT_HEEL: usize = 30;
    pub const LEFT_FOOT_INDEX: usize = 31;
    pub const RIGHT_FOOT_INDEX: usize = 32;
}

/// A 2-D landmark position in normalized image space.
///
/// `z` is carried through from the collaborator but never used by the analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JointPoint {
    /// Horizontal position, 0 at the left edge
    pub x: f64,
    /// Vertical position, 0 at the top edge
    pub y: f64,
    /// Relative depth (unused)
    #[serde(default)]
    pub z: f64,
}

impl JointPoint {
    /// Create a point with zero depth
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Vector from `self` to `other`
    #[must_use]
    pub fn vector_to(&self, other: &Self) -> Vector2<f64> {
        Vector2::new(other.x - self.x, other.y - self.y)
    }
}

/// Which arm performs the shot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShootingSide {
    /// Left-handed shooter
    Left,
    /// Right-handed shooter
    #[default]
    Right,
}

impl ShootingSide {
    /// Sign applied to side-mirrored measurements (`+1` right, `-1` left)
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
        }
    }
}

impl fmt::Display for ShootingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "LEFT"),
            Self::Right => write!(f, "RIGHT"),
        }
    }
}

impl FromStr for ShootingSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LEFT" | "L" => Ok(Self::Left),
            "RIGHT" | "R" => Ok(Self::Right),
            other => Err(Error::InvalidInput(format!("Unknown shooting side: {other}"))),
        }
    }
}

/// All landmarks detected on one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLandmarks {
    points: Vec<JointPoint>,
}

impl PoseLandmarks {
    /// Wrap a full landmark set
    ///
    /// # Errors
    ///
    /// Returns an error if the set does not contain exactly 33 points
    pub fn new(points: Vec<JointPoint>) -> Result<Self> {
        if points.len() != NUM_POSE_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {} landmarks, got {}",
                NUM_POSE_LANDMARKS,
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Landmark at a layout index. Indices come from [`index`] and are always in range.
    #[must_use]
    pub fn get(&self, idx: usize) -> JointPoint {
        self.points[idx]
    }

    /// All points in layout order
    #[must_use]
    pub fn points(&self) -> &[JointPoint] {
        &self.points
    }

    /// Map every point from crop-relative into full-frame coordinates
    #[must_use]
    pub fn to_full_frame(&self, crop: &CropRegion) -> Self {
        Self {
            points: self.points.iter().map(|p| crop.to_full_frame(p)).collect(),
        }
    }

    /// Select the landmarks the analysis reads for one shooting side
    #[must_use]
    pub fn bundle(&self, side: ShootingSide) -> LandmarkBundle {
        use index::*;
        let pick = |left: usize, right: usize| match side {
            ShootingSide::Left => self.get(left),
            ShootingSide::Right => self.get(right),
        };

        LandmarkBundle {
            shoulder: pick(LEFT_SHOULDER, RIGHT_SHOULDER),
            elbow: pick(LEFT_ELBOW, RIGHT_ELBOW),
            wrist: pick(LEFT_WRIST, RIGHT_WRIST),
            index_finger: pick(LEFT_INDEX, RIGHT_INDEX),
            hip: pick(LEFT_HIP, RIGHT_HIP),
            knee: pick(LEFT_KNEE, RIGHT_KNEE),
            ankle: pick(LEFT_ANKLE, RIGHT_ANKLE),
            eye: pick(LEFT_EYE, RIGHT_EYE),
            ear: pick(LEFT_EAR, RIGHT_EAR),
            left_leg: Leg {
                hip: self.get(LEFT_HIP),
                knee: self.get(LEFT_KNEE),
                ankle: self.get(LEFT_ANKLE),
            },
            right_leg: Leg {
                hip: self.get(RIGHT_HIP),
                knee: self.get(RIGHT_KNEE),
                ankle: self.get(RIGHT_ANKLE),
            },
        }
    }
}

/// Hip, knee and ankle of one leg
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Leg {
    pub hip: JointPoint,
    pub knee: JointPoint,
    pub ankle: JointPoint,
}

/// Side-selected landmarks for one frame, in full-frame coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LandmarkBundle {
    pub shoulder: JointPoint,
    pub elbow: JointPoint,
    pub wrist: JointPoint,
    pub index_finger: JointPoint,
    pub hip: JointPoint,
    pub knee: JointPoint,
    pub ankle: JointPoint,
    pub eye: JointPoint,
    pub ear: JointPoint,
    /// Both legs, independent of shooting side
    pub left_leg: Leg,
    pub right_leg: Leg,
}

/// Horizontal crop applied to a frame before pose estimation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge of the crop in pixels
    pub x_offset: u32,
    /// Crop width in pixels
    pub width: u32,
    /// Full frame width in pixels
    pub frame_width: u32,
}

impl CropRegion {
    /// The half of the frame analyzed for a shooting side.
    ///
    /// Right-handed shooters are filmed on the left half of the frame and
    /// left-handed shooters on the right half.
    #[must_use]
    pub const fn for_side(side: ShootingSide, frame_width: u32) -> Self {
        let half = frame_width / 2;
        match side {
            ShootingSide::Right => Self {
                x_offset: 0,
                width: half,
                frame_width,
            },
            ShootingSide::Left => Self {
                x_offset: half,
                width: frame_width - half,
                frame_width,
            },
        }
    }

    /// Rescale a crop-relative point into full-frame normalized space.
    ///
    /// `y` is unchanged because the crop spans the full frame height.
    #[must_use]
    pub fn to_full_frame(&self, p: &JointPoint) -> JointPoint {
        if self.frame_width == 0 {
            return *p;
        }
        let half = f64::from(self.frame_width / 2);
        let x = (p.x * half + f64::from(self.x_offset)) / f64::from(self.frame_width);
        JointPoint { x, y: p.y, z: p.z }
    }
}
