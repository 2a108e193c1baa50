//! Explanation engine: ranked positive/negative factors for a prediction.
//!
//! Two strategies share one contract. [`AttributionStrategy`] ranks the
//! attribution model's signed per-feature contributions; [`HeuristicStrategy`]
//! applies fixed thresholds when no attribution model is loaded. The
//! [`Explainer`] picks one at construction from the loaded artifacts.

mod attribution;
mod heuristic;

pub use attribution::AttributionStrategy;
pub use heuristic::HeuristicStrategy;

use crate::features::{ModelFeatures, RawFeatureSet};
use crate::model::ModelArtifacts;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Factors kept per side.
pub const MAX_FACTORS: usize = 3;

/// Heuristic fillers used when no rule fires on a side.
pub const NO_POSITIVE_FACTORS: &str = "Account in good standing";
pub const NO_NEGATIVE_FACTORS: &str = "No significant negative factors";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Factors helping the score, most important first
    pub positive: Vec<String>,
    /// Factors hurting the score, most severe first
    pub negative: Vec<String>,
    /// Feature name → signed contribution to default risk. Empty for heuristics.
    pub feature_importance: BTreeMap<String, f64>,
}

pub trait ExplanationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `vector` is the unscaled classifier input in model order.
    fn explain(&self, vector: &[f64], values: &ModelFeatures, raw: &RawFeatureSet) -> Explanation;
}

pub struct Explainer {
    strategy: Box<dyn ExplanationStrategy>,
}

impl Explainer {
    /// Attribution when the artifacts carry an attribution model and scaler,
    /// heuristics otherwise.
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        if artifacts.attributor().is_some() {
            Self::with_strategy(AttributionStrategy::new(artifacts))
        } else {
            Self::with_strategy(HeuristicStrategy)
        }
    }

    pub fn with_strategy(strategy: impl ExplanationStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn explain(&self, vector: &[f64], values: &ModelFeatures, raw: &RawFeatureSet) -> Explanation {
        self.strategy.explain(vector, values, raw)
    }
}

/// Append unless an existing factor already covers it (substring either way).
fn push_unique(list: &mut Vec<String>, factor: &str) {
    if list
        .iter()
        .any(|f| f.contains(factor) || factor.contains(f.as_str()))
    {
        return;
    }
    list.push(factor.to_string());
}

/// Overdraft, income and savings insights from the behavioral metrics,
/// layered onto whatever the strategy already produced.
fn add_raw_insights(positive: &mut Vec<String>, negative: &mut Vec<String>, raw: &RawFeatureSet) {
    if raw.overdraft_frequency == 0.0 {
        push_unique(positive, "No overdraft occurrences");
    } else if raw.overdraft_frequency > 0.1 {
        push_unique(negative, "Frequent overdrafts detected");
    }

    if raw.income_stability < 0.3 {
        push_unique(positive, "Stable, consistent income");
    } else if raw.income_stability > 0.7 {
        push_unique(negative, "Irregular income patterns");
    }

    if raw.expense_ratio < 0.6 {
        push_unique(positive, "Good savings rate");
    } else if raw.expense_ratio > 0.95 {
        push_unique(negative, "High expense-to-income ratio");
    }
}

fn finish(
    mut positive: Vec<String>,
    mut negative: Vec<String>,
    feature_importance: BTreeMap<String, f64>,
) -> Explanation {
    positive.truncate(MAX_FACTORS);
    negative.truncate(MAX_FACTORS);
    Explanation {
        positive,
        negative,
        feature_importance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique_substring() {
        let mut list = vec!["No overdraft occurrences".to_string()];
        push_unique(&mut list, "No overdraft");
        push_unique(&mut list, "No overdraft occurrences");
        push_unique(&mut list, "Good savings rate");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_raw_insights() {
        let raw = RawFeatureSet {
            overdraft_frequency: 0.3,
            income_stability: 0.9,
            expense_ratio: 0.99,
            ..Default::default()
        };
        let (mut pos, mut neg) = (Vec::new(), Vec::new());
        add_raw_insights(&mut pos, &mut neg, &raw);
        assert!(pos.is_empty());
        assert_eq!(
            neg,
            vec![
                "Frequent overdrafts detected",
                "Irregular income patterns",
                "High expense-to-income ratio"
            ]
        );
    }

    #[test]
    fn test_explainer_without_attribution_is_heuristic() {
        let explainer = Explainer::new(Arc::new(ModelArtifacts::empty()));
        assert_eq!(explainer.strategy_name(), "heuristic");
    }
}
