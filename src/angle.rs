use crate::pose::{Joint, JointSet, Point2D, Side};

/// Unsigned angle at vertex `b`, in degrees, between the rays `b -> a` and
/// `b -> c`. Always in `[0, 180]` regardless of winding.
pub(crate) fn angle(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let degrees = (bc.y.atan2(bc.x) - ba.y.atan2(ba.x)).to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Flexion of the knee: 0 for a straight leg, approaching 180 for a deep bend.
pub(crate) fn knee_angle(joints: &JointSet, side: Side) -> f64 {
    180.0
        - angle(
            joints[Joint::hip(side)],
            joints[Joint::knee(side)],
            joints[Joint::ankle(side)],
        )
}

/// Flexion of the hip, measured between the torso and the thigh.
pub(crate) fn hip_angle(joints: &JointSet, side: Side) -> f64 {
    180.0
        - angle(
            joints[Joint::shoulder(side)],
            joints[Joint::hip(side)],
            joints[Joint::knee(side)],
        )
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct AngleSet {
    pub(crate) r_knee: f64,
    pub(crate) l_knee: f64,
    pub(crate) r_hip: f64,
    pub(crate) l_hip: f64,
}

impl AngleSet {
    pub(crate) fn from_joints(joints: &JointSet) -> Self {
        Self {
            r_knee: knee_angle(joints, Side::Right),
            l_knee: knee_angle(joints, Side::Left),
            r_hip: hip_angle(joints, Side::Right),
            l_hip: hip_angle(joints, Side::Left),
        }
    }
}
