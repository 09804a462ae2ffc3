use crate::pose::BodyLandmark;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("no person detected in frame")]
    NoPersonDetected,

    #[error("expected at least {expected} landmarks, got {actual}")]
    InsufficientLandmarks { expected: usize, actual: usize },

    #[error("frame dimensions must be positive, got {0}x{1}")]
    InvalidFrameDimensions(u32, u32),

    #[error("failed to convert landmark variant to usize: {0:?}")]
    LandmarkVariantToUSize(BodyLandmark),

    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("expected {expected} features, got {actual}")]
    FeatureLength { expected: usize, actual: usize },

    #[error("failed to open model file: {1:?}")]
    OpenModel(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to parse model description")]
    ParseModel(#[source] serde_json::Error),

    #[error("model layer {layer} has inconsistent shape: {reason}")]
    ModelShape { layer: usize, reason: String },

    #[error("failed to construct array from model weights")]
    ConstructArray(#[source] ndarray::ShapeError),

    #[error("model produced {0} class scores, expected 3")]
    ClassScoreCount(usize),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("model produced class index {0} which is not a posture label")]
    ConvertClassIndex(usize),
}
