use crate::{angle::AngleSet, pose::JointSet};
use std::ops::Deref;

pub(crate) const NUM_FEATURES: usize = 20;

/// Classifier input: normalized joint coordinates in canonical joint order
/// followed by the four flexion angles.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct FeatureVector([f32; NUM_FEATURES]);

impl FeatureVector {
    pub(crate) fn new(joints: &JointSet, angles: &AngleSet, width: u32, height: u32) -> Self {
        let (width, height) = (f64::from(width), f64::from(height));
        let mut features = [0.0; NUM_FEATURES];

        for (pair, (_, point)) in features.chunks_exact_mut(2).zip(joints.iter()) {
            pair[0] = (point.x / width) as f32;
            pair[1] = (point.y / height) as f32;
        }

        let AngleSet {
            r_knee,
            l_knee,
            r_hip,
            l_hip,
        } = *angles;
        features[16..].copy_from_slice(&[r_knee as f32, l_knee as f32, r_hip as f32, l_hip as f32]);

        Self(features)
    }
}

impl Deref for FeatureVector {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
