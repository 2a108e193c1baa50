//! Process-wide, read-only artifact set. Loaded once at startup; shared by
//! every assessment without locking.

use super::{Attributor, Classifier, OnnxAttributor, OnnxClassifier, StandardScaler};
use crate::config::ArtifactsConfig;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static SHARED: OnceLock<Arc<ModelArtifacts>> = OnceLock::new();

/// Load artifacts from config and install them as the process-wide set.
/// Later calls return the set installed by the first.
pub fn init_shared(config: &ArtifactsConfig) -> Arc<ModelArtifacts> {
    SHARED
        .get_or_init(|| Arc::new(ModelArtifacts::load(config)))
        .clone()
}

/// The process-wide set, or an empty one (heuristic mode) if never initialized.
pub fn shared() -> Arc<ModelArtifacts> {
    SHARED
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(ModelArtifacts::empty()))
}

#[derive(Default)]
pub struct ModelArtifacts {
    classifier: Option<Box<dyn Classifier>>,
    scaler: Option<StandardScaler>,
    attributor: Option<Box<dyn Attributor>>,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("classifier", &self.classifier.is_some())
            .field("scaler", &self.scaler.is_some())
            .field("attributor", &self.attributor.is_some())
            .finish()
    }
}

impl ModelArtifacts {
    /// No artifacts: prediction and explanation run on heuristics.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load whatever is available. Missing or invalid files are logged and
    /// left out; this never fails.
    pub fn load(config: &ArtifactsConfig) -> Self {
        let mut artifacts = Self::empty();

        match StandardScaler::load(&config.scaler_path) {
            Ok(s) => artifacts.scaler = Some(s),
            Err(e) => warn!(path = %config.scaler_path.display(), error = %e, "scaler unavailable"),
        }

        match OnnxClassifier::load(&config.model_path, config.onnx_threads) {
            Ok(c) => artifacts.classifier = Some(Box::new(c)),
            Err(e) => warn!(path = %config.model_path.display(), error = %e, "classifier unavailable"),
        }

        if let Some(ref path) = config.attribution_path {
            match OnnxAttributor::load(path, config.onnx_threads) {
                Ok(a) => artifacts.attributor = Some(Box::new(a)),
                Err(e) => warn!(path = %path.display(), error = %e, "attribution model unavailable"),
            }
        }

        if artifacts.classifier().is_none() {
            warn!("running degraded: heuristic predictions until model and scaler are provided");
        } else {
            info!(attribution = artifacts.attributor().is_some(), "model artifacts ready");
        }
        artifacts
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn with_attributor(mut self, attributor: impl Attributor + 'static) -> Self {
        self.attributor = Some(Box::new(attributor));
        self
    }

    /// Classifier with its scaler; unusable without both.
    pub fn classifier(&self) -> Option<(&dyn Classifier, &StandardScaler)> {
        Some((self.classifier.as_deref()?, self.scaler.as_ref()?))
    }

    /// Attribution model with its scaler; unusable without both.
    pub fn attributor(&self) -> Option<(&dyn Attributor, &StandardScaler)> {
        Some((self.attributor.as_deref()?, self.scaler.as_ref()?))
    }

    pub fn is_degraded(&self) -> bool {
        self.classifier().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::path::PathBuf;

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn predict_probability(&self, _scaled: &[f64]) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_load_missing_files_is_degraded() {
        let config = ArtifactsConfig {
            model_path: PathBuf::from("nonexistent/model.onnx"),
            scaler_path: PathBuf::from("nonexistent/scaler.json"),
            attribution_path: Some(PathBuf::from("nonexistent/attr.onnx")),
            onnx_threads: 1,
        };
        let a = ModelArtifacts::load(&config);
        assert!(a.is_degraded());
        assert!(a.attributor().is_none());
    }

    #[test]
    fn test_classifier_requires_scaler() {
        let a = ModelArtifacts::empty().with_classifier(Fixed(0.2));
        assert!(a.classifier().is_none());
        let a = a.with_scaler(StandardScaler::identity());
        assert!(a.classifier().is_some());
        assert!(!a.is_degraded());
    }

    #[test]
    fn test_shared_defaults_to_empty() {
        let a = shared();
        assert!(a.attributor().is_none());
    }
}
