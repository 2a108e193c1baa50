//! Feature extraction: transactions → behavioral metrics → classifier-native vector.

mod behavioral;
mod pipeline;

pub use behavioral::CashFlow;
pub use pipeline::{payment_status_for_gap, FeatureExtractor};

use serde::{Deserialize, Serialize};

/// Number of inputs the classifier expects.
pub const FEATURE_COUNT: usize = 11;

/// Behavioral metrics derived from a transaction history. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureSet {
    pub transaction_count: usize,
    pub avg_transaction: f64,
    /// Coefficient of variation of transaction amounts.
    pub transaction_volatility: f64,
    /// Expenses over income.
    pub expense_ratio: f64,
    /// Largest gap in days between consecutive credits.
    pub payment_consistency: f64,
    /// Fraction of transactions leaving a negative balance.
    pub overdraft_frequency: f64,
    /// Coefficient of variation of credit amounts.
    pub income_stability: f64,
    pub category_diversity: f64,
    /// Days between first and last transaction.
    pub account_age: f64,
    pub avg_balance: f64,
}

impl Default for RawFeatureSet {
    /// Profile used when no transactions are available.
    fn default() -> Self {
        Self {
            transaction_count: 0,
            avg_transaction: 500.0,
            transaction_volatility: 0.5,
            expense_ratio: 0.8,
            payment_consistency: 7.0,
            overdraft_frequency: 0.0,
            income_stability: 0.3,
            category_diversity: 0.5,
            account_age: 180.0,
            avg_balance: 5000.0,
        }
    }
}

/// Classifier input fields, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelFeature {
    #[serde(rename = "LIMIT_BAL")]
    LimitBal,
    #[serde(rename = "AGE")]
    Age,
    #[serde(rename = "PAY_0")]
    Pay0,
    #[serde(rename = "PAY_2")]
    Pay2,
    #[serde(rename = "PAY_3")]
    Pay3,
    #[serde(rename = "BILL_AMT1")]
    BillAmt1,
    #[serde(rename = "BILL_AMT2")]
    BillAmt2,
    #[serde(rename = "BILL_AMT3")]
    BillAmt3,
    #[serde(rename = "PAY_AMT1")]
    PayAmt1,
    #[serde(rename = "PAY_AMT2")]
    PayAmt2,
    #[serde(rename = "PAY_AMT3")]
    PayAmt3,
}

impl ModelFeature {
    pub const ALL: [ModelFeature; FEATURE_COUNT] = [
        ModelFeature::LimitBal,
        ModelFeature::Age,
        ModelFeature::Pay0,
        ModelFeature::Pay2,
        ModelFeature::Pay3,
        ModelFeature::BillAmt1,
        ModelFeature::BillAmt2,
        ModelFeature::BillAmt3,
        ModelFeature::PayAmt1,
        ModelFeature::PayAmt2,
        ModelFeature::PayAmt3,
    ];

    /// Column name in the training data.
    pub fn name(&self) -> &'static str {
        match self {
            ModelFeature::LimitBal => "LIMIT_BAL",
            ModelFeature::Age => "AGE",
            ModelFeature::Pay0 => "PAY_0",
            ModelFeature::Pay2 => "PAY_2",
            ModelFeature::Pay3 => "PAY_3",
            ModelFeature::BillAmt1 => "BILL_AMT1",
            ModelFeature::BillAmt2 => "BILL_AMT2",
            ModelFeature::BillAmt3 => "BILL_AMT3",
            ModelFeature::PayAmt1 => "PAY_AMT1",
            ModelFeature::PayAmt2 => "PAY_AMT2",
            ModelFeature::PayAmt3 => "PAY_AMT3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ModelFeature::LimitBal => "Credit limit",
            ModelFeature::Age => "Account age",
            ModelFeature::Pay0 => "Recent payment status",
            ModelFeature::Pay2 => "Payment status (2 months ago)",
            ModelFeature::Pay3 => "Payment status (3 months ago)",
            ModelFeature::BillAmt1 => "Recent bill amount",
            ModelFeature::BillAmt2 => "Bill amount (2 months ago)",
            ModelFeature::BillAmt3 => "Bill amount (3 months ago)",
            ModelFeature::PayAmt1 => "Recent payment amount",
            ModelFeature::PayAmt2 => "Payment amount (2 months ago)",
            ModelFeature::PayAmt3 => "Payment amount (3 months ago)",
        }
    }

    pub fn is_payment_status(&self) -> bool {
        matches!(self, ModelFeature::Pay0 | ModelFeature::Pay2 | ModelFeature::Pay3)
    }

    pub fn is_bill_amount(&self) -> bool {
        matches!(
            self,
            ModelFeature::BillAmt1 | ModelFeature::BillAmt2 | ModelFeature::BillAmt3
        )
    }

    pub fn is_payment_amount(&self) -> bool {
        matches!(
            self,
            ModelFeature::PayAmt1 | ModelFeature::PayAmt2 | ModelFeature::PayAmt3
        )
    }
}

/// Classifier-native fields synthesized from the behavioral metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatures {
    pub limit_bal: f64,
    pub age: f64,
    /// Payment-status codes: -1 on time, positive = months late.
    pub pay_0: i32,
    pub pay_2: i32,
    pub pay_3: i32,
    pub bill_amt1: f64,
    pub bill_amt2: f64,
    pub bill_amt3: f64,
    pub pay_amt1: f64,
    pub pay_amt2: f64,
    pub pay_amt3: f64,
}

impl Default for ModelFeatures {
    fn default() -> Self {
        Self {
            limit_bal: 50_000.0,
            age: 35.0,
            pay_0: 0,
            pay_2: 0,
            pay_3: 0,
            bill_amt1: 10_000.0,
            bill_amt2: 9_500.0,
            bill_amt3: 9_000.0,
            pay_amt1: 5_000.0,
            pay_amt2: 4_750.0,
            pay_amt3: 4_500.0,
        }
    }
}

impl ModelFeatures {
    pub fn get(&self, feature: ModelFeature) -> f64 {
        match feature {
            ModelFeature::LimitBal => self.limit_bal,
            ModelFeature::Age => self.age,
            ModelFeature::Pay0 => self.pay_0 as f64,
            ModelFeature::Pay2 => self.pay_2 as f64,
            ModelFeature::Pay3 => self.pay_3 as f64,
            ModelFeature::BillAmt1 => self.bill_amt1,
            ModelFeature::BillAmt2 => self.bill_amt2,
            ModelFeature::BillAmt3 => self.bill_amt3,
            ModelFeature::PayAmt1 => self.pay_amt1,
            ModelFeature::PayAmt2 => self.pay_amt2,
            ModelFeature::PayAmt3 => self.pay_amt3,
        }
    }

    /// Values in classifier input order.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        ModelFeature::ALL.map(|f| self.get(f))
    }

    /// Outstanding bill over estimated credit limit.
    pub fn utilization(&self) -> f64 {
        if self.limit_bal > 0.0 {
            self.bill_amt1 / self.limit_bal
        } else {
            0.0
        }
    }
}

/// Output of extraction: the model fields plus the metrics they came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatureVector {
    pub features: ModelFeatures,
    pub raw: RawFeatureSet,
}

impl ModelFeatureVector {
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.features.to_vector()
    }
}
