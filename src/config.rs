//! Scorer configuration. Every section has defaults so a missing file still
//! yields a working (possibly degraded) scorer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Pretrained classifier, scaler, attribution model
    pub artifacts: ArtifactsConfig,
    /// Optional text-generation service for citizen narratives
    pub narrative: NarrativeConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// ONNX default classifier
    pub model_path: PathBuf,
    /// JSON scaler parameters (mean/scale/feature_names)
    pub scaler_path: PathBuf,
    /// ONNX attribution model; heuristic explanations when absent
    pub attribution_path: Option<PathBuf>,
    /// Intra-op threads per ONNX session
    pub onnx_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub enabled: bool,
    /// Base URL; the model id is appended
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token. Unset disables the call.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_new_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("data/model.onnx"),
            scaler_path: PathBuf::from("data/scaler.json"),
            attribution_path: None,
            onnx_threads: 1,
        }
    }
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            timeout_secs: 10,
            max_new_tokens: 150,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl NarrativeConfig {
    /// Token from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl ScorerConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str::<ScorerConfig>(&data) {
                    Ok(c) => return c,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults")
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable config; using defaults")
                }
            }
        }
        Self::default()
    }
}
