use super::heuristic::HeuristicStrategy;
use super::{add_raw_insights, finish, Explanation, ExplanationStrategy};
use crate::features::{ModelFeature, ModelFeatures, RawFeatureSet, FEATURE_COUNT};
use crate::model::ModelArtifacts;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Contributions considered before splitting into positive and negative.
const TOP_CONTRIBUTIONS: usize = 6;

/// Ranks signed contributions to default risk. A negative contribution lowers
/// risk and becomes a positive factor.
pub struct AttributionStrategy {
    artifacts: Arc<ModelArtifacts>,
}

impl AttributionStrategy {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    fn contributions(&self, vector: &[f64]) -> Option<Vec<f64>> {
        let (attributor, scaler) = self.artifacts.attributor()?;
        let mut input = [0.0; FEATURE_COUNT];
        for (slot, v) in input.iter_mut().zip(vector) {
            *slot = *v;
        }
        let scaled = scaler.transform(&input);
        match attributor.attribute(&scaled) {
            Ok(c) if c.len() >= FEATURE_COUNT && c.iter().all(|v| v.is_finite()) => Some(c),
            Ok(c) => {
                warn!(len = c.len(), "attribution output unusable; using heuristic explanation");
                None
            }
            Err(e) => {
                warn!(error = %e, "attribution failed; using heuristic explanation");
                None
            }
        }
    }
}

impl ExplanationStrategy for AttributionStrategy {
    fn name(&self) -> &'static str {
        "attribution"
    }

    fn explain(&self, vector: &[f64], values: &ModelFeatures, raw: &RawFeatureSet) -> Explanation {
        let Some(contributions) = self.contributions(vector) else {
            return HeuristicStrategy.explain(vector, values, raw);
        };

        let mut ranked: Vec<(ModelFeature, f64)> = ModelFeature::ALL
            .into_iter()
            .zip(contributions.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for &(feature, weight) in ranked.iter().take(TOP_CONTRIBUTIONS) {
            let value = values.get(feature);
            if weight < 0.0 {
                positive.push(positive_factor(feature, value));
            } else {
                negative.push(negative_factor(feature, value));
            }
        }

        add_raw_insights(&mut positive, &mut negative, raw);

        let importance = ranked
            .into_iter()
            .map(|(f, w)| (f.name().to_string(), w))
            .collect();
        finish(positive, negative, importance)
    }
}

fn positive_factor(feature: ModelFeature, value: f64) -> String {
    if feature.is_payment_status() && value <= 0.0 {
        "Consistent on-time payments".to_string()
    } else if feature == ModelFeature::LimitBal {
        format!("Good credit limit of ${}", thousands(value))
    } else if feature.is_payment_amount() {
        "Strong payment amounts".to_string()
    } else {
        format!("Good {}", feature.description().to_lowercase())
    }
}

fn negative_factor(feature: ModelFeature, value: f64) -> String {
    if feature.is_payment_status() && value > 0.0 {
        format!("Payment delays detected ({} months late)", value as i64)
    } else if feature.is_bill_amount() {
        "High outstanding balance".to_string()
    } else if feature.is_payment_amount() {
        "Low payment amounts".to_string()
    } else {
        format!("Consider improving {}", feature.description().to_lowercase())
    }
}

/// Whole-number amount with comma grouping.
fn thousands(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoringError};
    use crate::explain::Explainer;
    use crate::model::{Attributor, StandardScaler};

    struct Canned(Vec<f64>);

    impl Attributor for Canned {
        fn attribute(&self, _scaled: &[f64]) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl Attributor for Failing {
        fn attribute(&self, _scaled: &[f64]) -> Result<Vec<f64>> {
            Err(ScoringError::ingest("attribution offline"))
        }
    }

    fn explainer(attributor: impl Attributor + 'static) -> Explainer {
        Explainer::new(Arc::new(
            ModelArtifacts::empty()
                .with_attributor(attributor)
                .with_scaler(StandardScaler::identity()),
        ))
    }

    fn neutral_raw() -> RawFeatureSet {
        RawFeatureSet {
            overdraft_frequency: 0.05,
            income_stability: 0.5,
            expense_ratio: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_ranks_by_magnitude_and_splits_by_sign() {
        // LIMIT_BAL, AGE, PAY_0, PAY_2, PAY_3, BILL1..3, PAY_AMT1..3
        let contributions = vec![-0.4, 0.01, 0.9, 0.02, 0.03, 0.5, 0.0, 0.0, -0.3, 0.0, 0.0];
        let e = explainer(Canned(contributions));
        assert_eq!(e.strategy_name(), "attribution");

        let values = ModelFeatures {
            pay_0: 2,
            limit_bal: 45_000.0,
            ..Default::default()
        };
        let out = e.explain(&values.to_vector(), &values, &neutral_raw());
        assert_eq!(
            out.negative,
            vec![
                "Payment delays detected (2 months late)",
                "High outstanding balance",
                "Consider improving payment status (3 months ago)"
            ]
        );
        assert_eq!(
            out.positive,
            vec!["Good credit limit of $45,000", "Strong payment amounts"]
        );
        assert_eq!(out.feature_importance.len(), FEATURE_COUNT);
        assert_eq!(out.feature_importance["PAY_0"], 0.9);
    }

    #[test]
    fn test_failure_falls_back_to_heuristic() {
        let values = ModelFeatures::default();
        let out = explainer(Failing).explain(&values.to_vector(), &values, &neutral_raw());
        assert!(out.feature_importance.is_empty());
        assert!(!out.positive.is_empty());
        assert!(!out.negative.is_empty());
    }

    #[test]
    fn test_short_output_falls_back() {
        let values = ModelFeatures::default();
        let out = explainer(Canned(vec![0.1; 3])).explain(&values.to_vector(), &values, &neutral_raw());
        assert!(out.feature_importance.is_empty());
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(30_000.0), "30,000");
        assert_eq!(thousands(1_234_567.4), "1,234,567");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(-4_500.0), "-4,500");
    }
}
