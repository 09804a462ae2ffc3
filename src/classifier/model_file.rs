use serde::Deserialize;

/// On-disk description of a dense posture model.
///
/// ```json
/// {
///   "scaler": { "mean": [...20], "scale": [...20] },
///   "layers": [
///     { "weights": [[...], ...], "bias": [...], "activation": "relu" },
///     { "weights": [[...], ...], "bias": [0.0, 0.0, 0.0], "activation": "softmax" }
///   ]
/// }
/// ```
///
/// `weights` is stored input-major: one row per input unit, one column per
/// output unit.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModelFile {
    #[serde(default)]
    pub(crate) scaler: Option<ScalerFile>,
    pub(crate) layers: Vec<LayerFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ScalerFile {
    pub(crate) mean: Vec<f32>,
    pub(crate) scale: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LayerFile {
    pub(crate) weights: Vec<Vec<f32>>,
    pub(crate) bias: Vec<f32>,
    #[serde(default)]
    pub(crate) activation: Activation,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Activation {
    Linear,
    Relu,
    Softmax,
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Linear
    }
}
