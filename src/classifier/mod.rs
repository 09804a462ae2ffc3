mod dense;
mod model_file;

pub(crate) use dense::DenseClassifier;

use crate::{error::Error, stability::PostureLabel};

/// A posture classifier over a single feature vector.
///
/// Implementations may fail on any call; the caller degrades a failure to
/// [`PostureLabel::Unknown`].
pub(crate) trait Classifier: Send {
    fn predict(&mut self, features: &[f32]) -> Result<PostureLabel, Error>;

    /// Release any resources held by the backend. Called at most once.
    fn close(&mut self) {}
}

impl<F> Classifier for F
where
    F: FnMut(&[f32]) -> Result<PostureLabel, Error> + Send,
{
    fn predict(&mut self, features: &[f32]) -> Result<PostureLabel, Error> {
        self(features)
    }
}
