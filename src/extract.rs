use crate::{
    error::Error,
    pose::{Joint, JointSet, Landmark, Point2D, NUM_JOINTS},
};

/// Landmarks a person must carry for every joint to be present: the right
/// ankle is the highest index used.
pub(crate) const MIN_LANDMARKS: usize = 29;

/// Select the counted joints of the first detected person and scale them into
/// pixel space.
pub(crate) fn extract_joints<P>(persons: &[P], width: u32, height: u32) -> Result<JointSet, Error>
where
    P: AsRef<[Landmark]>,
{
    if width == 0 || height == 0 {
        return Err(Error::InvalidFrameDimensions(width, height));
    }

    let landmarks = persons.first().ok_or(Error::NoPersonDetected)?.as_ref();
    if landmarks.len() < MIN_LANDMARKS {
        return Err(Error::InsufficientLandmarks {
            expected: MIN_LANDMARKS,
            actual: landmarks.len(),
        });
    }

    let (width, height) = (f64::from(width), f64::from(height));
    let mut points = [Point2D::default(); NUM_JOINTS];
    for (point, joint) in points.iter_mut().zip(Joint::ALL.iter()) {
        let Landmark { x, y } = landmarks[joint.landmark().idx()?];
        *point = Point2D::new(f64::from(x) * width, f64::from(y) * height);
    }
    Ok(JointSet::new(points))
}
