//! ONNX Runtime sessions for the default classifier and the attribution model.
//! Input: [1, 11] f32 (scaled features).

use super::{Attributor, Classifier};
use crate::error::{Result, ScoringError};
use crate::features::FEATURE_COUNT;
use ndarray::{Array2, CowArray};
use ort::{Environment, GraphOptimizationLevel, Session, SessionBuilder, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

static ORT_ENV: OnceLock<Arc<Environment>> = OnceLock::new();

fn init_env() -> Result<Arc<Environment>> {
    if let Some(env) = ORT_ENV.get() {
        return Ok(env.clone());
    }
    let env = Environment::builder()
        .with_name("ledgerscore")
        .build()?
        .into_arc();
    Ok(ORT_ENV.get_or_init(|| env).clone())
}

/// A loaded session with its chosen output.
struct OnnxSession {
    session: Session,
    output_index: usize,
    path: PathBuf,
}

impl OnnxSession {
    fn load(path: &Path, threads: usize, pick_output: impl Fn(&str) -> bool) -> Result<Self> {
        if !path.exists() {
            return Err(ScoringError::artifact(path, "file not found"));
        }
        let env = init_env()?;
        let session = SessionBuilder::new(&env)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(threads.clamp(1, i16::MAX as usize) as i16)?
            .with_model_from_file(path)?;

        let output_index = session
            .outputs
            .iter()
            .position(|o| pick_output(&o.name))
            .unwrap_or_else(|| session.outputs.len().saturating_sub(1));

        info!(
            path = %path.display(),
            output = session.outputs.get(output_index).map(|o| o.name.as_str()).unwrap_or(""),
            "ONNX model loaded"
        );

        Ok(Self {
            session,
            output_index,
            path: path.to_path_buf(),
        })
    }

    /// Run on one row; returns the selected output's shape and data.
    fn run(&self, scaled: &[f64]) -> Result<(Vec<usize>, Vec<f32>)> {
        let row: Vec<f32> = scaled.iter().map(|&v| v as f32).collect();
        let arr = Array2::from_shape_vec((1, row.len()), row)
            .map_err(|e| ScoringError::artifact(&self.path, e.to_string()))?;
        let input = CowArray::from(arr.into_dyn());
        let value = Value::from_array(self.session.allocator(), &input)?;

        let outputs = self.session.run(vec![value])?;
        let out = outputs
            .get(self.output_index)
            .ok_or_else(|| ScoringError::artifact(&self.path, "model produced no output"))?;
        let tensor = out.try_extract::<f32>()?;
        let view = tensor.view();
        Ok((view.shape().to_vec(), view.iter().copied().collect()))
    }
}

/// Gradient-boosted default classifier exported to ONNX.
pub struct OnnxClassifier {
    inner: OnnxSession,
}

impl OnnxClassifier {
    pub fn load(path: &Path, threads: usize) -> Result<Self> {
        let inner = OnnxSession::load(path, threads, |name| name.contains("prob"))?;
        Ok(Self { inner })
    }
}

/// Default-class probability from a [batch, classes] or [classes] tensor.
fn default_probability(shape: &[usize], data: &[f32]) -> f64 {
    let classes = shape.last().copied().unwrap_or(data.len());
    let p = match classes {
        0 => None,
        1 => data.first(),
        _ => data.get(1),
    };
    p.or_else(|| data.last())
        .map(|&v| v as f64)
        .unwrap_or(0.5)
        .clamp(0.0, 1.0)
}

impl Classifier for OnnxClassifier {
    fn predict_probability(&self, scaled: &[f64]) -> Result<f64> {
        let (shape, data) = self.inner.run(scaled)?;
        let p = default_probability(&shape, &data);
        debug!(probability = p, "classifier inference");
        Ok(p)
    }
}

/// Model emitting per-feature signed contributions (optionally followed by a bias term).
pub struct OnnxAttributor {
    inner: OnnxSession,
}

impl OnnxAttributor {
    pub fn load(path: &Path, threads: usize) -> Result<Self> {
        let inner = OnnxSession::load(path, threads, |name| name.contains("contrib"))?;
        Ok(Self { inner })
    }
}

impl Attributor for OnnxAttributor {
    fn attribute(&self, scaled: &[f64]) -> Result<Vec<f64>> {
        let (_, data) = self.inner.run(scaled)?;
        if data.len() < FEATURE_COUNT {
            return Err(ScoringError::artifact(
                &self.inner.path,
                format!("expected {} contributions, got {}", FEATURE_COUNT, data.len()),
            ));
        }
        Ok(data[..FEATURE_COUNT].iter().map(|&v| v as f64).collect())
    }
}
