use super::{
    add_raw_insights, finish, push_unique, Explanation, ExplanationStrategy, NO_NEGATIVE_FACTORS,
    NO_POSITIVE_FACTORS,
};
use crate::features::{ModelFeatures, RawFeatureSet};
use std::collections::BTreeMap;

/// Threshold rules over payment status, payment gap, utilization and payment
/// ratio. Both lists are always non-empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicStrategy;

impl ExplanationStrategy for HeuristicStrategy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn explain(&self, _vector: &[f64], values: &ModelFeatures, raw: &RawFeatureSet) -> Explanation {
        let mut positive = Vec::new();
        let mut negative = Vec::new();

        if values.pay_0 <= 0 {
            positive.push("On-time payment history".to_string());
        } else if values.pay_0 >= 2 {
            negative.push("Recent late payments detected".to_string());
        }

        if raw.payment_consistency <= 35.0 {
            push_unique(&mut positive, "Consistent payment schedule");
        } else if raw.payment_consistency > 60.0 {
            negative.push("Irregular payment gaps > 60 days".to_string());
        }

        let utilization = values.utilization();
        if utilization < 0.3 {
            positive.push("Low credit utilization ratio".to_string());
        } else if utilization > 0.7 {
            negative.push("High credit utilization ratio".to_string());
        }

        let bill = values.bill_amt1;
        if values.pay_amt1 > bill * 0.5 {
            positive.push("Strong payment amounts relative to balance".to_string());
        } else if values.pay_amt1 < bill * 0.1 {
            negative.push("Low payment amounts relative to balance".to_string());
        }

        add_raw_insights(&mut positive, &mut negative, raw);

        if positive.is_empty() {
            positive.push(NO_POSITIVE_FACTORS.to_string());
        }
        if negative.is_empty() {
            negative.push(NO_NEGATIVE_FACTORS.to_string());
        }

        finish(positive, negative, BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    fn explain(values: &ModelFeatures, raw: &RawFeatureSet) -> Explanation {
        HeuristicStrategy.explain(&[0.0; FEATURE_COUNT], values, raw)
    }

    #[test]
    fn test_healthy_profile() {
        let values = ModelFeatures {
            pay_0: -1,
            limit_bal: 100_000.0,
            bill_amt1: 1_000.0,
            pay_amt1: 1_050.0,
            ..Default::default()
        };
        let raw = RawFeatureSet {
            payment_consistency: 30.0,
            overdraft_frequency: 0.0,
            ..Default::default()
        };
        let e = explain(&values, &raw);
        assert_eq!(
            e.positive,
            vec![
                "On-time payment history",
                "Consistent payment schedule",
                "Low credit utilization ratio"
            ]
        );
        assert_eq!(e.negative, vec!["No significant negative factors"]);
        assert!(e.feature_importance.is_empty());
    }

    #[test]
    fn test_risky_profile() {
        let values = ModelFeatures {
            pay_0: 3,
            limit_bal: 30_000.0,
            bill_amt1: 25_000.0,
            pay_amt1: 1_000.0,
            ..Default::default()
        };
        let raw = RawFeatureSet {
            payment_consistency: 90.0,
            overdraft_frequency: 0.4,
            income_stability: 0.5,
            expense_ratio: 0.9,
            ..Default::default()
        };
        let e = explain(&values, &raw);
        assert_eq!(e.positive, vec!["Account in good standing"]);
        assert_eq!(
            e.negative,
            vec![
                "Recent late payments detected",
                "Irregular payment gaps > 60 days",
                "High credit utilization ratio"
            ]
        );
    }

    #[test]
    fn test_lists_bounded() {
        let e = explain(&ModelFeatures::default(), &RawFeatureSet::default());
        assert!(!e.positive.is_empty() && e.positive.len() <= 3);
        assert!(!e.negative.is_empty() && e.negative.len() <= 3);
    }
}
