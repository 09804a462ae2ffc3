use crate::error::Error;
use num_traits::ToPrimitive;
use std::ops::{Index, Sub};

/// The 33-point body model emitted by the pose source, in output order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub(crate) enum BodyLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyLandmark {
    pub(crate) fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::LandmarkVariantToUSize(self))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Side {
    Right,
    Left,
}

/// The joints the counter looks at, in canonical feature order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Joint {
    RightShoulder,
    LeftShoulder,
    RightHip,
    LeftHip,
    RightKnee,
    LeftKnee,
    RightAnkle,
    LeftAnkle,
}

pub(crate) const NUM_JOINTS: usize = 8;

impl Joint {
    pub(crate) const ALL: [Joint; NUM_JOINTS] = [
        Joint::RightShoulder,
        Joint::LeftShoulder,
        Joint::RightHip,
        Joint::LeftHip,
        Joint::RightKnee,
        Joint::LeftKnee,
        Joint::RightAnkle,
        Joint::LeftAnkle,
    ];

    pub(crate) fn landmark(self) -> BodyLandmark {
        match self {
            Joint::RightShoulder => BodyLandmark::RightShoulder,
            Joint::LeftShoulder => BodyLandmark::LeftShoulder,
            Joint::RightHip => BodyLandmark::RightHip,
            Joint::LeftHip => BodyLandmark::LeftHip,
            Joint::RightKnee => BodyLandmark::RightKnee,
            Joint::LeftKnee => BodyLandmark::LeftKnee,
            Joint::RightAnkle => BodyLandmark::RightAnkle,
            Joint::LeftAnkle => BodyLandmark::LeftAnkle,
        }
    }

    pub(crate) fn shoulder(side: Side) -> Self {
        match side {
            Side::Right => Joint::RightShoulder,
            Side::Left => Joint::LeftShoulder,
        }
    }

    pub(crate) fn hip(side: Side) -> Self {
        match side {
            Side::Right => Joint::RightHip,
            Side::Left => Joint::LeftHip,
        }
    }

    pub(crate) fn knee(side: Side) -> Self {
        match side {
            Side::Right => Joint::RightKnee,
            Side::Left => Joint::LeftKnee,
        }
    }

    pub(crate) fn ankle(side: Side) -> Self {
        match side {
            Side::Right => Joint::RightAnkle,
            Side::Left => Joint::LeftAnkle,
        }
    }

    fn position(self) -> usize {
        self as usize
    }
}

/// A normalized landmark as produced by the pose source, in fractions of the
/// frame width and height.
#[derive(Debug, Copy, Clone, PartialEq, Default, serde::Deserialize)]
pub(crate) struct Landmark {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// A point in pixel space.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub(crate) struct Point2D {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Point2D {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Sub for Point2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Pixel positions of every [`Joint`] for a single frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct JointSet {
    points: [Point2D; NUM_JOINTS],
}

impl JointSet {
    pub(crate) fn new(points: [Point2D; NUM_JOINTS]) -> Self {
        Self { points }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Joint, Point2D)> + '_ {
        (0..NUM_JOINTS).map(move |i| (Joint::ALL[i], self.points[i]))
    }
}

impl Index<Joint> for JointSet {
    type Output = Point2D;

    fn index(&self, joint: Joint) -> &Self::Output {
        &self.points[joint.position()]
    }
}

#[cfg(test)]
mod tests {
    use super::{BodyLandmark, Joint};

    #[test]
    fn joint_landmark_indices() {
        let indices = Joint::ALL
            .iter()
            .map(|joint| joint.landmark().idx().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![12, 11, 24, 23, 26, 25, 28, 27]);
    }

    #[test]
    fn last_landmark_index() {
        assert_eq!(BodyLandmark::RightFootIndex.idx().unwrap(), 32);
    }
}
