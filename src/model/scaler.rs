//! Standard scaler exported by the training job as JSON:
//! `{"mean": [...], "scale": [...], "feature_names": [...]}`.

use crate::error::{Result, ScoringError};
use crate::features::{ModelFeature, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerFile {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names: Vec<String>,
}

/// Per-feature mean/scale in classifier input order.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        Self { mean, scale }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self::new([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT])
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data).map_err(|e| match e {
            ScoringError::Ingest(reason) => ScoringError::artifact(path, reason),
            other => other,
        })
    }

    /// Parse the exported JSON. When `feature_names` is present the columns are
    /// reordered to match the classifier input order.
    pub fn from_json(data: &str) -> Result<Self> {
        let file: ScalerFile = serde_json::from_str(data)?;
        let n = file.mean.len();
        if n != file.scale.len() {
            return Err(ScoringError::ingest(format!(
                "scaler mean has {} entries but scale has {}",
                n,
                file.scale.len()
            )));
        }

        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        for (i, feature) in ModelFeature::ALL.iter().enumerate() {
            let src = if file.feature_names.is_empty() {
                i
            } else {
                file.feature_names
                    .iter()
                    .position(|name| name == feature.name())
                    .ok_or_else(|| {
                        ScoringError::ingest(format!("scaler lacks feature {}", feature.name()))
                    })?
            };
            if src >= n {
                return Err(ScoringError::ingest(format!(
                    "scaler has {} features, expected {}",
                    n, FEATURE_COUNT
                )));
            }
            mean[i] = file.mean[src];
            scale[i] = file.scale[src];
        }
        Ok(Self { mean, scale })
    }

    /// `(x - mean) / scale`; a zero scale passes the centered value through.
    pub fn transform(&self, values: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let s = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            out[i] = (values[i] - self.mean[i]) / s;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_centers_and_scales() {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];
        mean[0] = 10.0;
        scale[0] = 2.0;
        scale[1] = 0.0;
        let s = StandardScaler::new(mean, scale);
        let mut v = [1.0; FEATURE_COUNT];
        v[0] = 14.0;
        let out = s.transform(&v);
        assert_eq!(out[0], 2.0);
        assert_eq!(out[1], 1.0);
    }

    #[test]
    fn test_from_json_reorders_by_name() {
        let mut names: Vec<&str> = ModelFeature::ALL.iter().map(|f| f.name()).collect();
        names.reverse();
        let mean: Vec<f64> = (0..FEATURE_COUNT).map(|i| i as f64).collect();
        let json = serde_json::json!({
            "mean": mean,
            "scale": vec![1.0; FEATURE_COUNT],
            "feature_names": names,
        });
        let s = StandardScaler::from_json(&json.to_string()).unwrap();
        // LIMIT_BAL was last in the file
        assert_eq!(s.mean[0], (FEATURE_COUNT - 1) as f64);
        assert_eq!(s.mean[FEATURE_COUNT - 1], 0.0);
    }

    #[test]
    fn test_from_json_rejects_short_vectors() {
        let json = r#"{"mean":[1.0,2.0],"scale":[1.0,1.0]}"#;
        assert!(StandardScaler::from_json(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_missing_feature() {
        let json = serde_json::json!({
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
            "feature_names": vec!["X"; FEATURE_COUNT],
        });
        assert!(StandardScaler::from_json(&json.to_string()).is_err());
    }
}
