use super::{
    model_file::{Activation, LayerFile, ModelFile, ScalerFile},
    Classifier,
};
use crate::{error::Error, features::NUM_FEATURES, stability::PostureLabel};
use ndarray::{Array1, Array2, ArrayView1};
use num_traits::FromPrimitive;
use ordered_float::NotNan;
use std::{convert::TryFrom, fs::File, io::BufReader, io::Read, path::Path};
use tracing::debug;

const NUM_CLASSES: usize = 3;

struct Scaler {
    mean: Array1<f32>,
    scale: Array1<f32>,
}

struct Dense {
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

impl Dense {
    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        let mut output = input.dot(&self.weights) + &self.bias;
        match self.activation {
            Activation::Linear => {}
            Activation::Relu => output.mapv_inplace(|v| v.max(0.0)),
            Activation::Softmax => {
                let max = output.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
                output.mapv_inplace(|v| (v - max).exp());
                let sum = output.sum();
                output /= sum;
            }
        }
        output
    }
}

/// A feed-forward posture classifier with an optional standard scaler in
/// front of the first layer, evaluated on the CPU.
pub(crate) struct DenseClassifier {
    scaler: Option<Scaler>,
    layers: Vec<Dense>,
    closed: bool,
}

impl DenseClassifier {
    pub(crate) fn from_path<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenModel(e, path.to_path_buf()))?;
        let classifier = Self::from_reader(BufReader::new(file))?;
        debug!(
            message = "loaded dense classifier",
            path = ?path,
            layers = classifier.layers.len()
        );
        Ok(classifier)
    }

    pub(crate) fn from_reader<R>(reader: R) -> Result<Self, Error>
    where
        R: Read,
    {
        let model: ModelFile = serde_json::from_reader(reader).map_err(Error::ParseModel)?;
        Self::try_from(model)
    }

    fn scores(&self, features: &[f32]) -> Result<Array1<f32>, Error> {
        if self.closed {
            return Err(Error::ClassifierUnavailable(
                "classifier has been closed".to_owned(),
            ));
        }
        if features.len() != NUM_FEATURES {
            return Err(Error::FeatureLength {
                expected: NUM_FEATURES,
                actual: features.len(),
            });
        }

        let mut activations = Array1::from(features.to_vec());
        if let Some(Scaler { mean, scale }) = &self.scaler {
            activations = (activations - mean) / scale;
        }
        Ok(self
            .layers
            .iter()
            .fold(activations, |input, layer| layer.forward(&input)))
    }
}

/// Index of the highest score; the first one wins on ties.
fn arg_max(scores: ArrayView1<'_, f32>) -> Result<usize, Error> {
    let mut best: Option<(usize, NotNan<f32>)> = None;
    for (index, &score) in scores.iter().enumerate() {
        let score = NotNan::new(score).map_err(|e| Error::ConstructNotNan(e, score))?;
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
        .ok_or(Error::ClassScoreCount(scores.len()))
}

impl Classifier for DenseClassifier {
    fn predict(&mut self, features: &[f32]) -> Result<PostureLabel, Error> {
        let scores = self.scores(features)?;
        if scores.len() != NUM_CLASSES {
            return Err(Error::ClassScoreCount(scores.len()));
        }
        let index = arg_max(scores.view())?;
        PostureLabel::from_usize(index).ok_or(Error::ConvertClassIndex(index))
    }

    fn close(&mut self) {
        self.layers.clear();
        self.scaler = None;
        self.closed = true;
    }
}

fn shape_error(layer: usize, reason: String) -> Error {
    Error::ModelShape { layer, reason }
}

fn build_scaler(scaler: ScalerFile) -> Result<Scaler, Error> {
    let ScalerFile { mean, scale } = scaler;
    if mean.len() != NUM_FEATURES || scale.len() != NUM_FEATURES {
        return Err(shape_error(
            0,
            format!(
                "scaler expects {} features, got mean {} and scale {}",
                NUM_FEATURES,
                mean.len(),
                scale.len()
            ),
        ));
    }
    if scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
        return Err(shape_error(0, "scaler scale must be finite and non-zero".to_owned()));
    }
    Ok(Scaler {
        mean: Array1::from(mean),
        scale: Array1::from(scale),
    })
}

fn build_layer(index: usize, inputs: usize, layer: LayerFile) -> Result<Dense, Error> {
    let LayerFile {
        weights,
        bias,
        activation,
    } = layer;
    if weights.len() != inputs {
        return Err(shape_error(
            index,
            format!("expected {} weight rows, got {}", inputs, weights.len()),
        ));
    }
    let outputs = bias.len();
    if outputs == 0 {
        return Err(shape_error(index, "bias is empty".to_owned()));
    }
    if let Some(row) = weights.iter().position(|row| row.len() != outputs) {
        return Err(shape_error(
            index,
            format!(
                "weight row {} has {} columns, expected {}",
                row,
                weights[row].len(),
                outputs
            ),
        ));
    }

    let weights = Array2::from_shape_vec(
        (inputs, outputs),
        weights.into_iter().flatten().collect(),
    )
    .map_err(Error::ConstructArray)?;

    Ok(Dense {
        weights,
        bias: Array1::from(bias),
        activation,
    })
}

impl TryFrom<ModelFile> for DenseClassifier {
    type Error = Error;

    fn try_from(model: ModelFile) -> Result<Self, Self::Error> {
        let scaler = model.scaler.map(build_scaler).transpose()?;

        let mut inputs = NUM_FEATURES;
        let mut layers = Vec::with_capacity(model.layers.len());
        for (index, layer) in model.layers.into_iter().enumerate() {
            let dense = build_layer(index, inputs, layer)?;
            inputs = dense.bias.len();
            layers.push(dense);
        }

        if inputs != NUM_CLASSES {
            return Err(Error::ClassScoreCount(inputs));
        }

        Ok(Self {
            scaler,
            layers,
            closed: false,
        })
    }
}
