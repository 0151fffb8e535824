//! Joint angles and body measurements from 2-D landmarks.
//!
//! Everything here is a pure function of normalized image coordinates. Angles
//! are in degrees. Distances are ratios or scaled normalized offsets and carry
//! no physical unit.
//!
//! Degenerate input (coincident landmarks) never produces NaN: angle
//! computations fall back to 0° between the rays and torso-normalized ratios
//! fall back to 0.

use crate::{
    constants::{OFFSET_SCALE, WRIST_HEIGHT_SCALE},
    landmarks::{JointPoint, LandmarkBundle, ShootingSide},
};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

const MIN_VECTOR_NORM: f64 = 1e-12;

/// Unsigned angle between two vectors in degrees, 0 if either is degenerate
fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    let norms = v1.norm() * v2.norm();
    if norms < MIN_VECTOR_NORM {
        return 0.0;
    }
    let cosine = (v1.dot(v2) / norms).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Angle at vertex `b` between rays `b -> a` and `b -> c`, in `[0, 180]`
#[must_use]
pub fn angle(a: &JointPoint, b: &JointPoint, c: &JointPoint) -> f64 {
    angle_between(&b.vector_to(a), &b.vector_to(c))
}

/// Shoulder angle relative to the torso: positive with the arm in front of the body.
///
/// The magnitude is [`angle`]`(hip, shoulder, elbow)`. The sign comes from the
/// z component of `(hip - shoulder) x (elbow - shoulder)` and is mirrored for
/// left-handed shooters.
#[must_use]
pub fn shoulder_angle(hip: &JointPoint, shoulder: &JointPoint, elbow: &JointPoint, side: ShootingSide) -> f64 {
    let base = angle(hip, shoulder, elbow);
    let cross_z = shoulder.vector_to(hip).perp(&shoulder.vector_to(elbow));
    let front = if cross_z < 0.0 { 1.0 } else { -1.0 };
    base * front * side.sign()
}

/// Deviation of `from -> to` from vertical, positive leaning toward the shooting side
fn deviation_from_vertical(from: &JointPoint, to: &JointPoint, side: ShootingSide) -> f64 {
    let d = from.vector_to(to);
    d.x.atan2(-d.y).to_degrees() * side.sign()
}

/// Torso lean from vertical, measured on the hip -> shoulder vector
#[must_use]
pub fn body_lean(shoulder: &JointPoint, hip: &JointPoint, side: ShootingSide) -> f64 {
    deviation_from_vertical(hip, shoulder, side)
}

/// Forearm deviation from vertical, measured on the elbow -> wrist vector
#[must_use]
pub fn forearm_alignment(elbow: &JointPoint, wrist: &JointPoint, side: ShootingSide) -> f64 {
    deviation_from_vertical(elbow, wrist, side)
}

/// Wrist flexion folded around 180°.
///
/// A straight wrist reads 180. Bending the palm backward lowers the value and
/// bending it forward raises it, so extension and flexion stay on one
/// continuous scale.
#[must_use]
pub fn wrist_angle(elbow: &JointPoint, wrist: &JointPoint, index_finger: &JointPoint, side: ShootingSide) -> f64 {
    let forearm = elbow.vector_to(wrist);
    let hand = wrist.vector_to(index_finger);
    let bend = angle_between(&forearm, &hand);
    let cross_z = forearm.perp(&hand);

    let backward = match side {
        ShootingSide::Right => cross_z < 0.0,
        ShootingSide::Left => cross_z > 0.0,
    };
    if backward {
        180.0 - bend
    } else {
        180.0 + bend
    }
}

/// Wrist height above the eye, normalized by torso length and scaled by 10.
///
/// Returns 0 when shoulder and hip share the same height.
#[must_use]
pub fn wrist_height(wrist: &JointPoint, eye: &JointPoint, shoulder: &JointPoint, hip: &JointPoint) -> f64 {
    let torso_length = (shoulder.y - hip.y).abs();
    if torso_length == 0.0 {
        return 0.0;
    }
    (eye.y - wrist.y) / torso_length * WRIST_HEIGHT_SCALE
}

/// Elbow height above the eye, scaled by `1000 / 2`.
///
/// Unlike [`wrist_height`] the result is not normalized by torso length; the
/// shoulder and hip are accepted for signature parity only. The trained
/// scoring ranges depend on this unnormalized scale.
#[must_use]
pub fn elbow_eye_height(elbow: &JointPoint, eye: &JointPoint, _shoulder: &JointPoint, _hip: &JointPoint) -> f64 {
    (eye.y - elbow.y) * OFFSET_SCALE
}

/// Horizontal offset of the index fingertip from the eye, scaled by `1000 / 2`
#[must_use]
pub fn release_setpoint(index_finger: &JointPoint, eye: &JointPoint, side: ShootingSide) -> f64 {
    (index_finger.x - eye.x) * side.sign() * OFFSET_SCALE
}

/// Head tilt relative to horizontal, positive when the eye is above the ear
#[must_use]
pub fn head_angle(eye: &JointPoint, ear: &JointPoint) -> f64 {
    -(eye.y - ear.y).atan2(eye.x - ear.x).to_degrees()
}

/// Derived measurements for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleSet {
    /// Shoulder -> elbow -> wrist
    pub elbow: f64,
    /// Signed arm elevation, see [`shoulder_angle`]
    pub shoulder: f64,
    /// Elbow -> wrist -> index fingertip, unfolded.
    ///
    /// The follow-through thresholds are tuned on this plain angle, not on
    /// the palm-corrected [`wrist_angle`].
    pub wrist: f64,
    /// Hip -> knee -> ankle on the shooting side
    pub dominant_knee: f64,
    pub left_knee: f64,
    pub right_knee: f64,
    pub body_lean: f64,
    /// Shoulder -> hip -> knee
    pub hip_angle: f64,
    pub head_tilt: f64,
    pub forearm_alignment: f64,
}

impl AngleSet {
    /// Compute every measurement for one frame's side-selected landmarks
    #[must_use]
    pub fn compute(lm: &LandmarkBundle, side: ShootingSide) -> Self {
        Self {
            elbow: angle(&lm.shoulder, &lm.elbow, &lm.wrist),
            shoulder: shoulder_angle(&lm.hip, &lm.shoulder, &lm.elbow, side),
            wrist: angle(&lm.elbow, &lm.wrist, &lm.index_finger),
            dominant_knee: angle(&lm.hip, &lm.knee, &lm.ankle),
            left_knee: angle(&lm.left_leg.hip, &lm.left_leg.knee, &lm.left_leg.ankle),
            right_knee: angle(&lm.right_leg.hip, &lm.right_leg.knee, &lm.right_leg.ankle),
            body_lean: body_lean(&lm.shoulder, &lm.hip, side),
            hip_angle: angle(&lm.shoulder, &lm.hip, &lm.knee),
            head_tilt: head_angle(&lm.eye, &lm.ear),
            forearm_alignment: forearm_alignment(&lm.elbow, &lm.wrist, side),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn p(x: f64, y: f64) -> JointPoint {
        JointPoint::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let a = angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0));
        assert!((a - 90.0).abs() < EPS);
    }

    #[test]
    fn test_straight_and_folded() {
        assert!((angle(&p(0.0, 0.0), &p(0.5, 0.0), &p(1.0, 0.0)) - 180.0).abs() < EPS);
        assert!(angle(&p(1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0)).abs() < EPS);
    }

    #[test]
    fn test_degenerate_angle_is_zero() {
        let a = angle(&p(0.3, 0.3), &p(0.3, 0.3), &p(0.5, 0.1));
        assert_eq!(a, 0.0);
        assert!(!wrist_angle(&p(0.2, 0.2), &p(0.2, 0.2), &p(0.2, 0.2), ShootingSide::Right).is_nan());
    }

    #[test]
    fn test_shoulder_angle_arm_in_front_is_positive_for_right() {
        // Shooter faces +x (right-handed camera convention): hip below, elbow forward.
        let hip = p(0.5, 0.8);
        let shoulder = p(0.5, 0.5);
        let elbow = p(0.6, 0.5);
        let right = shoulder_angle(&hip, &shoulder, &elbow, ShootingSide::Right);
        let left = shoulder_angle(&hip, &shoulder, &elbow, ShootingSide::Left);
        assert!((right - 90.0).abs() < EPS);
        assert!((left + 90.0).abs() < EPS);
    }

    #[test]
    fn test_body_lean_upright_is_zero() {
        let lean = body_lean(&p(0.5, 0.3), &p(0.5, 0.7), ShootingSide::Right);
        assert!(lean.abs() < EPS);
    }

    #[test]
    fn test_body_lean_mirrors_for_left() {
        let shoulder = p(0.55, 0.3);
        let hip = p(0.5, 0.7);
        let right = body_lean(&shoulder, &hip, ShootingSide::Right);
        let left = body_lean(&shoulder, &hip, ShootingSide::Left);
        assert!(right > 0.0);
        assert!((right + left).abs() < EPS);
    }

    #[test]
    fn test_forearm_vertical() {
        let dev = forearm_alignment(&p(0.5, 0.5), &p(0.5, 0.3), ShootingSide::Right);
        assert!(dev.abs() < EPS);
        let dev = forearm_alignment(&p(0.5, 0.5), &p(0.6, 0.4), ShootingSide::Right);
        assert!((dev - 45.0).abs() < EPS);
    }

    #[test]
    fn test_straight_wrist_is_180() {
        let w = wrist_angle(&p(0.5, 0.6), &p(0.5, 0.4), &p(0.5, 0.3), ShootingSide::Right);
        assert!((w - 180.0).abs() < EPS);
    }

    #[test]
    fn test_wrist_flexion_folds_around_180() {
        let elbow = p(0.5, 0.6);
        let wrist = p(0.5, 0.4);
        let index = p(0.6, 0.3);
        let right = wrist_angle(&elbow, &wrist, &index, ShootingSide::Right);
        let left = wrist_angle(&elbow, &wrist, &index, ShootingSide::Left);
        assert!((right - 180.0).abs() > 1.0);
        assert!(((right - 180.0) + (left - 180.0)).abs() < EPS);
    }

    #[test]
    fn test_angle_set_wrist_is_unfolded_for_both_flex_directions() {
        let (s, c) = 15f64.to_radians().sin_cos();
        for dx in [s, -s] {
            let lm = LandmarkBundle {
                elbow: p(0.5, 0.6),
                wrist: p(0.5, 0.4),
                index_finger: p(0.5 + dx * 0.1, 0.4 - c * 0.1),
                ..LandmarkBundle::default()
            };
            for side in [ShootingSide::Right, ShootingSide::Left] {
                let angles = AngleSet::compute(&lm, side);
                assert!((angles.wrist - 165.0).abs() < 1e-6, "{dx} {side:?}: {}", angles.wrist);
            }
        }
    }

    #[test]
    fn test_wrist_height_normalized_by_torso() {
        let h = wrist_height(&p(0.5, 0.1), &p(0.5, 0.2), &p(0.5, 0.3), &p(0.5, 0.7));
        assert!((h - 2.5).abs() < EPS);
    }

    #[test]
    fn test_wrist_height_zero_torso() {
        let h = wrist_height(&p(0.5, 0.1), &p(0.5, 0.2), &p(0.5, 0.5), &p(0.4, 0.5));
        assert_eq!(h, 0.0);
    }

    #[test]
    fn test_elbow_eye_height_ignores_torso_length() {
        // The torso length changes but the result does not: this measurement is
        // deliberately not normalized, unlike wrist_height.
        let elbow = p(0.5, 0.18);
        let eye = p(0.5, 0.2);
        let short = elbow_eye_height(&elbow, &eye, &p(0.5, 0.3), &p(0.5, 0.4));
        let long = elbow_eye_height(&elbow, &eye, &p(0.5, 0.3), &p(0.5, 0.9));
        assert!((short - 10.0).abs() < EPS);
        assert_eq!(short, long);
    }

    #[test]
    fn test_release_setpoint_sign_per_side() {
        let index = p(0.52, 0.1);
        let eye = p(0.5, 0.2);
        let right = release_setpoint(&index, &eye, ShootingSide::Right);
        let left = release_setpoint(&index, &eye, ShootingSide::Left);
        assert!((right - 10.0).abs() < EPS);
        assert!((left + 10.0).abs() < EPS);
    }

    #[test]
    fn test_head_angle() {
        assert!(head_angle(&p(0.6, 0.5), &p(0.5, 0.5)).abs() < EPS);
        // Eye above the ear: positive tilt
        let tilt = head_angle(&p(0.6, 0.4), &p(0.5, 0.5));
        assert!((tilt - 45.0).abs() < EPS);
    }
}
