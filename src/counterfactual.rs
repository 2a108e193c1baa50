//! Counterfactual improvement suggestions with estimated point impact.

use crate::features::{ModelFeatures, RawFeatureSet};
use crate::risk::SCORE_MAX;
use serde::{Deserialize, Serialize};

/// Suggestions shown to a caller; the generator itself returns all of them.
pub const MAX_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    PaymentStatus,
    Utilization,
    PaymentAmount,
    ExpenseRatio,
    Overdraft,
    IncomeStability,
    SpendingConsistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Indicator {
    fn base_impact(&self) -> f64 {
        match self {
            Indicator::PaymentStatus => 50.0,
            Indicator::Utilization => 40.0,
            Indicator::PaymentAmount => 35.0,
            Indicator::ExpenseRatio => 30.0,
            Indicator::Overdraft => 25.0,
            Indicator::IncomeStability => 20.0,
            Indicator::SpendingConsistency => 15.0,
        }
    }

    /// Indicators where only overshoot above target counts.
    fn lower_is_better(&self) -> bool {
        !matches!(self, Indicator::PaymentStatus | Indicator::PaymentAmount)
    }

    /// `(action, detail, timeline)`
    fn template(&self) -> (&'static str, &'static str, &'static str) {
        match self {
            Indicator::PaymentStatus => (
                "Make all payments on time",
                "Set up automatic payments to avoid late fees and negative marks",
                "3-6 months",
            ),
            Indicator::Utilization => (
                "Reduce credit utilization",
                "Keep balances below 30% of your credit limit",
                "1-3 months",
            ),
            Indicator::PaymentAmount => (
                "Increase monthly payments",
                "Pay more than the minimum - aim for at least 50% of balance",
                "2-4 months",
            ),
            Indicator::ExpenseRatio => (
                "Reduce expense-to-income ratio",
                "Create a budget to track and reduce non-essential spending",
                "1-3 months",
            ),
            Indicator::Overdraft => (
                "Eliminate overdrafts",
                "Maintain a buffer in your account and set up low balance alerts",
                "1-2 months",
            ),
            Indicator::IncomeStability => (
                "Stabilize income patterns",
                "Consider regular income sources or consistent freelance scheduling",
                "3-6 months",
            ),
            Indicator::SpendingConsistency => (
                "Reduce spending volatility",
                "Smooth out large purchases over time when possible",
                "2-4 months",
            ),
        }
    }

    /// `base × (0.5 + 0.5 × scale)`, truncated. Lower-is-better indicators
    /// saturate at a 0.5 overshoot; the others at a distance of 3.
    pub fn impact(&self, current: f64, target: f64) -> u32 {
        let scale = if self.lower_is_better() {
            ((current - target).max(0.0) / 0.5).min(1.0)
        } else {
            ((current - target).abs() / 3.0).min(1.0)
        };
        (self.base_impact() * (0.5 + 0.5 * scale)) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub indicator: Indicator,
    pub action: String,
    pub detail: String,
    /// "+N points"
    pub impact: String,
    pub impact_value: u32,
    pub priority: Priority,
    pub timeline: String,
    pub current: String,
    pub target: String,
    pub potential_score: i32,
}

impl Improvement {
    fn new(
        indicator: Indicator,
        impact_value: u32,
        priority: Priority,
        current: String,
        target: &str,
    ) -> Self {
        let (action, detail, timeline) = indicator.template();
        Self {
            indicator,
            action: action.to_string(),
            detail: detail.to_string(),
            impact: format!("+{} points", impact_value),
            impact_value,
            priority,
            timeline: timeline.to_string(),
            current,
            target: target.to_string(),
            potential_score: 0,
        }
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CounterfactualGenerator;

impl CounterfactualGenerator {
    /// Every triggered suggestion, highest impact first.
    pub fn generate_improvements(
        &self,
        values: &ModelFeatures,
        raw: &RawFeatureSet,
        current_score: i32,
    ) -> Vec<Improvement> {
        let mut out = Vec::new();

        if values.pay_0 > 0 {
            let months = values.pay_0 as f64;
            out.push(Improvement::new(
                Indicator::PaymentStatus,
                Indicator::PaymentStatus.impact(months, 0.0),
                if values.pay_0 >= 2 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                format!("{} months late", values.pay_0),
                "On-time payments",
            ));
        }

        let utilization = values.utilization();
        if utilization > 0.3 {
            out.push(Improvement::new(
                Indicator::Utilization,
                Indicator::Utilization.impact(utilization, 0.3),
                if utilization > 0.7 {
                    Priority::High
                } else {
                    Priority::Medium
                },
                format!("{} utilization", percent(utilization)),
                "30% utilization",
            ));
        }

        let payment_ratio = if values.bill_amt1 > 0.0 {
            values.pay_amt1 / values.bill_amt1
        } else {
            1.0
        };
        if payment_ratio < 0.5 {
            out.push(Improvement::new(
                Indicator::PaymentAmount,
                Indicator::PaymentAmount.impact(payment_ratio, 0.5),
                Priority::Medium,
                format!("Paying {} of balance", percent(payment_ratio)),
                "Pay 50%+ of balance",
            ));
        }

        if raw.expense_ratio > 0.85 {
            out.push(Improvement::new(
                Indicator::ExpenseRatio,
                Indicator::ExpenseRatio.impact(raw.expense_ratio, 0.7),
                Priority::Medium,
                format!("{} expense ratio", percent(raw.expense_ratio)),
                "70% expense ratio",
            ));
        }

        if raw.overdraft_frequency > 0.0 {
            out.push(Improvement::new(
                Indicator::Overdraft,
                Indicator::Overdraft.impact(raw.overdraft_frequency, 0.0),
                Priority::High,
                format!("{} transactions overdraft", percent(raw.overdraft_frequency)),
                "No overdrafts",
            ));
        }

        if raw.income_stability > 0.5 {
            out.push(Improvement::new(
                Indicator::IncomeStability,
                Indicator::IncomeStability.impact(raw.income_stability, 0.2),
                Priority::Low,
                "Variable income".to_string(),
                "Stable income",
            ));
        }

        if raw.transaction_volatility > 0.5 {
            out.push(Improvement::new(
                Indicator::SpendingConsistency,
                Indicator::SpendingConsistency.impact(raw.transaction_volatility, 0.3),
                Priority::Low,
                "High spending volatility".to_string(),
                "Consistent spending",
            ));
        }

        out.sort_by(|a, b| b.impact_value.cmp(&a.impact_value));
        for imp in &mut out {
            imp.potential_score = (current_score + imp.impact_value as i32).min(SCORE_MAX);
        }
        out
    }
}
