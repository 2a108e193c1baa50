//! Combines the classifier's default probability with deterministic score caps;
//! produces score, category and probability.

use super::category::{probability_to_score, RiskCategory};
use crate::features::{ModelFeatureVector, ModelFeatures, RawFeatureSet};
use crate::model::ModelArtifacts;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Business rule that caps the model-derived score. Caps only ever lower it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCap {
    /// At least one month late: below "Good".
    LatePayment,
    /// Two or more months late: top of "Poor".
    SeriouslyLatePayment,
    /// Overdraft frequency above 0.2.
    HeavyOverdraft,
    /// Overdraft frequency above 0.1.
    FrequentOverdraft,
    /// Any overdraft: cannot be "Excellent".
    AnyOverdraft,
    /// Transaction volatility above 1.0.
    VolatileSpending,
    /// Expense ratio above 0.95.
    HighExpenseRatio,
}

impl ScoreCap {
    pub fn ceiling(&self) -> i32 {
        match self {
            ScoreCap::LatePayment => 660,
            ScoreCap::SeriouslyLatePayment => 579,
            ScoreCap::HeavyOverdraft => 550,
            ScoreCap::FrequentOverdraft => 620,
            ScoreCap::AnyOverdraft => 740,
            ScoreCap::VolatileSpending => 720,
            ScoreCap::HighExpenseRatio => 650,
        }
    }

    /// Caps that apply to this profile. Overdraft caps are exclusive tiers.
    pub fn triggered(features: &ModelFeatures, raw: &RawFeatureSet) -> Vec<ScoreCap> {
        let mut caps = Vec::new();
        if features.pay_0 >= 1 {
            caps.push(ScoreCap::LatePayment);
        }
        if features.pay_0 >= 2 {
            caps.push(ScoreCap::SeriouslyLatePayment);
        }
        if raw.overdraft_frequency > 0.2 {
            caps.push(ScoreCap::HeavyOverdraft);
        } else if raw.overdraft_frequency > 0.1 {
            caps.push(ScoreCap::FrequentOverdraft);
        } else if raw.overdraft_frequency > 0.0 {
            caps.push(ScoreCap::AnyOverdraft);
        }
        if raw.transaction_volatility > 1.0 {
            caps.push(ScoreCap::VolatileSpending);
        }
        if raw.expense_ratio > 0.95 {
            caps.push(ScoreCap::HighExpenseRatio);
        }
        caps
    }
}

/// Apply every triggered cap; the result is the minimum of the score and all
/// ceilings, independent of evaluation order.
pub fn apply_overrides(
    score: i32,
    features: &ModelFeatures,
    raw: &RawFeatureSet,
) -> (i32, Vec<ScoreCap>) {
    let caps = ScoreCap::triggered(features, raw);
    let capped = caps.iter().map(ScoreCap::ceiling).fold(score, i32::min);
    (capped, caps)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Final score after caps, in [300, 850]
    pub score: i32,
    pub category: RiskCategory,
    pub probability_of_default: f64,
    /// Score implied by the probability alone
    pub base_score: i32,
    pub feature_values: ModelFeatures,
    pub raw_features: RawFeatureSet,
    /// Unscaled values in classifier input order
    pub feature_vector: Vec<f64>,
    pub source: PredictionSource,
    pub overrides: Vec<ScoreCap>,
}

pub struct RiskEngine {
    artifacts: Arc<ModelArtifacts>,
}

impl RiskEngine {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    /// Always produces a result: the classifier when available, otherwise the
    /// heuristic predictor. Caps apply to both.
    pub fn predict(&self, fv: &ModelFeatureVector) -> PredictionResult {
        let values = fv.values();
        let (probability, source) = match self.model_probability(&values) {
            Some(p) => (p, PredictionSource::Model),
            None => (
                heuristic_probability(&fv.features),
                PredictionSource::Heuristic,
            ),
        };

        let base_score = probability_to_score(probability);
        let (score, overrides) = apply_overrides(base_score, &fv.features, &fv.raw);
        if !overrides.is_empty() {
            debug!(base_score, score, caps = ?overrides, "score caps applied");
        }

        PredictionResult {
            score,
            category: RiskCategory::from_score(score),
            probability_of_default: (probability * 10_000.0).round() / 10_000.0,
            base_score,
            feature_values: fv.features.clone(),
            raw_features: fv.raw.clone(),
            feature_vector: values.to_vec(),
            source,
            overrides,
        }
    }

    fn model_probability(&self, values: &[f64; crate::features::FEATURE_COUNT]) -> Option<f64> {
        let (classifier, scaler) = self.artifacts.classifier()?;
        let scaled = scaler.transform(values);
        match classifier.predict_probability(&scaled) {
            Ok(p) if p.is_finite() => Some(p.clamp(0.0, 1.0)),
            Ok(p) => {
                warn!(probability = p, "classifier returned non-finite probability; using heuristic");
                None
            }
            Err(e) => {
                warn!(error = %e, "classifier failed; using heuristic");
                None
            }
        }
    }
}

/// Blend of payment-status risk, utilization and payment shortfall, clamped to [0.05, 0.95].
pub fn heuristic_probability(features: &ModelFeatures) -> f64 {
    let pay_risk = features.pay_0.max(0) as f64 / 6.0;
    let utilization = features.bill_amt1 / (features.limit_bal + 1.0);
    let payment_ratio = features.pay_amt1 / (features.bill_amt1 + 1.0);
    let p = pay_risk * 0.4 + utilization * 0.3 + (1.0 - payment_ratio.min(1.0)) * 0.3;
    if p.is_finite() {
        p.clamp(0.05, 0.95)
    } else {
        0.95
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoringError};
    use crate::model::{Classifier, StandardScaler};

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn predict_probability(&self, _scaled: &[f64]) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn predict_probability(&self, _scaled: &[f64]) -> Result<f64> {
            Err(ScoringError::ingest("boom"))
        }
    }

    fn engine_with(p: f64) -> RiskEngine {
        RiskEngine::new(Arc::new(
            ModelArtifacts::empty()
                .with_classifier(Fixed(p))
                .with_scaler(StandardScaler::identity()),
        ))
    }

    fn clean_profile() -> ModelFeatureVector {
        let mut fv = ModelFeatureVector::default();
        fv.features.pay_0 = -1;
        fv.raw.overdraft_frequency = 0.0;
        fv.raw.transaction_volatility = 0.3;
        fv.raw.expense_ratio = 0.5;
        fv
    }

    #[test]
    fn test_model_score_without_caps() {
        let r = engine_with(0.02).predict(&clean_profile());
        assert_eq!(r.source, PredictionSource::Model);
        assert_eq!(r.score, 839);
        assert_eq!(r.category, RiskCategory::Excellent);
        assert!(r.overrides.is_empty());
    }

    #[test]
    fn test_late_payment_caps() {
        let mut fv = clean_profile();
        fv.features.pay_0 = 1;
        let r = engine_with(0.0).predict(&fv);
        assert_eq!(r.score, 660);
        assert_eq!(r.category, RiskCategory::Fair);

        fv.features.pay_0 = 3;
        let r = engine_with(0.0).predict(&fv);
        assert_eq!(r.score, 579);
        assert_eq!(r.category, RiskCategory::Poor);
    }

    #[test]
    fn test_tightest_cap_wins() {
        let mut fv = clean_profile();
        fv.features.pay_0 = 1;
        fv.raw.overdraft_frequency = 0.3;
        fv.raw.transaction_volatility = 1.4;
        fv.raw.expense_ratio = 0.99;
        let (score, caps) = apply_overrides(850, &fv.features, &fv.raw);
        assert_eq!(score, 550);
        assert_eq!(caps.len(), 4);
    }

    #[test]
    fn test_overdraft_tiers_are_exclusive() {
        let features = ModelFeatures::default();
        let mut raw = RawFeatureSet::default();
        raw.overdraft_frequency = 0.05;
        assert_eq!(apply_overrides(850, &features, &raw).0, 740);
        raw.overdraft_frequency = 0.15;
        assert_eq!(apply_overrides(850, &features, &raw).0, 620);
        raw.overdraft_frequency = 0.25;
        let (score, caps) = apply_overrides(850, &features, &raw);
        assert_eq!(score, 550);
        assert_eq!(caps, vec![ScoreCap::HeavyOverdraft]);
    }

    #[test]
    fn test_caps_never_raise() {
        let mut fv = clean_profile();
        fv.features.pay_0 = 2;
        fv.raw.overdraft_frequency = 0.5;
        for base in [300, 420, 549, 551, 700, 850] {
            let (score, _) = apply_overrides(base, &fv.features, &fv.raw);
            assert!(score <= base);
        }
    }

    #[test]
    fn test_heuristic_when_no_artifacts() {
        let engine = RiskEngine::new(Arc::new(ModelArtifacts::empty()));
        let r = engine.predict(&ModelFeatureVector::default());
        assert_eq!(r.source, PredictionSource::Heuristic);
        assert!(r.probability_of_default >= 0.05 && r.probability_of_default <= 0.95);
        assert_eq!(r.category, RiskCategory::from_score(r.score));
        assert_eq!(r.feature_vector.len(), crate::features::FEATURE_COUNT);
    }

    #[test]
    fn test_classifier_failure_falls_back() {
        let engine = RiskEngine::new(Arc::new(
            ModelArtifacts::empty()
                .with_classifier(Broken)
                .with_scaler(StandardScaler::identity()),
        ));
        let r = engine.predict(&clean_profile());
        assert_eq!(r.source, PredictionSource::Heuristic);
    }

    #[test]
    fn test_heuristic_probability_blend() {
        let f = ModelFeatures {
            pay_0: -1,
            bill_amt1: 0.0,
            pay_amt1: 0.0,
            ..Default::default()
        };
        // no delay, no utilization, full shortfall on a zero bill
        assert!((heuristic_probability(&f) - 0.3).abs() < 1e-9);

        let f = ModelFeatures {
            pay_0: 6,
            limit_bal: 1000.0,
            bill_amt1: 5000.0,
            pay_amt1: 0.0,
            ..Default::default()
        };
        assert_eq!(heuristic_probability(&f), 0.95);
    }
}
