//! Lender-facing bundle: decision, limit, pricing tier, monitoring and conditions.

use crate::explain::Explanation;
use crate::features::RawFeatureSet;
use crate::risk::RiskCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    ApproveWithConditions,
    ManualReview,
}

impl Decision {
    pub fn for_category(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Excellent | RiskCategory::VeryGood | RiskCategory::Good => {
                Decision::Approve
            }
            RiskCategory::Fair => Decision::ApproveWithConditions,
            RiskCategory::Poor => Decision::ManualReview,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateTier {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl RateTier {
    pub fn for_category(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Excellent => RateTier::APlus,
            RiskCategory::VeryGood => RateTier::A,
            RiskCategory::Good => RateTier::B,
            RiskCategory::Fair => RateTier::C,
            RiskCategory::Poor => RateTier::D,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_probability(p: f64) -> Self {
        if p < 0.1 {
            RiskLevel::Low
        } else if p < 0.25 {
            RiskLevel::Medium
        } else if p < 0.5 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringFlag {
    PaymentHistory,
    Utilization,
    SpendingVolatility,
    OverdraftRisk,
    IncomeStability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecommendations {
    pub decision: Decision,
    pub suggested_limit: u64,
    pub interest_rate_tier: RateTier,
    pub risk_level: RiskLevel,
    pub monitoring_flags: Vec<MonitoringFlag>,
    pub conditions: Vec<String>,
    pub confidence: Confidence,
}

/// Multiple of estimated annual income offered as a limit.
pub fn limit_multiplier(category: RiskCategory) -> f64 {
    match category {
        RiskCategory::Excellent => 3.5,
        RiskCategory::VeryGood => 3.0,
        RiskCategory::Good => 2.0,
        RiskCategory::Fair => 1.0,
        RiskCategory::Poor => 0.5,
    }
}

/// Annualised estimate of monthly income (40% of average balance) times the
/// category multiplier. Negative balances give a zero limit.
pub fn suggested_limit(category: RiskCategory, raw: &RawFeatureSet) -> u64 {
    let monthly_income = raw.avg_balance * 0.4;
    let limit = (monthly_income * 12.0 * limit_multiplier(category)).round();
    if limit.is_finite() && limit > 0.0 {
        limit as u64
    } else {
        0
    }
}

/// Flags from keywords in the negative factors plus overdraft and income thresholds.
pub fn monitoring_flags(explanation: &Explanation, raw: &RawFeatureSet) -> Vec<MonitoringFlag> {
    let mut flags = Vec::new();
    let mut raise = |flag: MonitoringFlag| {
        if !flags.contains(&flag) {
            flags.push(flag);
        }
    };

    for factor in &explanation.negative {
        let f = factor.to_lowercase();
        if f.contains("payment") || f.contains("late") {
            raise(MonitoringFlag::PaymentHistory);
        }
        if f.contains("utilization") || f.contains("balance") {
            raise(MonitoringFlag::Utilization);
        }
        if f.contains("volatility") || f.contains("inconsistent") {
            raise(MonitoringFlag::SpendingVolatility);
        }
        if f.contains("overdraft") {
            raise(MonitoringFlag::OverdraftRisk);
        }
        if f.contains("income") {
            raise(MonitoringFlag::IncomeStability);
        }
    }

    if raw.overdraft_frequency > 0.1 {
        raise(MonitoringFlag::OverdraftRisk);
    }
    if raw.income_stability > 0.6 {
        raise(MonitoringFlag::IncomeStability);
    }
    flags
}

pub fn approval_conditions(category: RiskCategory, raw: &RawFeatureSet) -> Vec<String> {
    let mut conditions: Vec<String> = match category {
        RiskCategory::Fair => vec![
            "Require income verification".into(),
            "Consider lower initial limit with increase option".into(),
        ],
        RiskCategory::Poor => vec![
            "Require secured deposit or co-signer".into(),
            "Mandatory financial counseling".into(),
            "Monthly account review for first 6 months".into(),
        ],
        _ => Vec::new(),
    };
    if raw.overdraft_frequency > 0.1 {
        conditions.push("Set up overdraft protection".into());
    }
    if raw.income_stability > 0.6 {
        conditions.push("Provide 3 months of pay stubs".into());
    }
    conditions
}

/// Data sufficiency first, then behavioral stability.
pub fn confidence(raw: &RawFeatureSet) -> Confidence {
    if raw.transaction_count < 5 {
        Confidence::Low
    } else if raw.transaction_count < 20 && raw.account_age < 90.0 {
        Confidence::Medium
    } else if raw.transaction_volatility > 1.5 {
        Confidence::Medium
    } else {
        Confidence::High
    }
}

pub fn bank_recommendations(
    category: RiskCategory,
    probability_of_default: f64,
    explanation: &Explanation,
    raw: &RawFeatureSet,
) -> BankRecommendations {
    BankRecommendations {
        decision: Decision::for_category(category),
        suggested_limit: suggested_limit(category, raw),
        interest_rate_tier: RateTier::for_category(category),
        risk_level: RiskLevel::from_probability(probability_of_default),
        monitoring_flags: monitoring_flags(explanation, raw),
        conditions: approval_conditions(category, raw),
        confidence: confidence(raw),
    }
}
