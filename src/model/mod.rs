//! Pretrained artifacts consumed by the scoring pipeline: default classifier,
//! feature scaler, optional attribution model.

mod artifacts;
mod onnx;
mod scaler;

pub use artifacts::{init_shared, shared, ModelArtifacts};
pub use onnx::{OnnxAttributor, OnnxClassifier};
pub use scaler::StandardScaler;

use crate::error::Result;

/// Default classifier. Input is the scaled feature vector in model order.
pub trait Classifier: Send + Sync {
    /// Probability of default in [0, 1].
    fn predict_probability(&self, scaled: &[f64]) -> Result<f64>;
}

/// Per-feature signed contribution to the default-risk output.
/// Negative values lower risk.
pub trait Attributor: Send + Sync {
    fn attribute(&self, scaled: &[f64]) -> Result<Vec<f64>>;
}
