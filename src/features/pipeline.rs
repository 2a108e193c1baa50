//! Extraction pipeline: transactions → sorted history → behavioral metrics → model fields.

use super::{CashFlow, ModelFeatureVector, ModelFeatures, RawFeatureSet};
use crate::ingest::Transaction;
use tracing::debug;

/// Age is not observable from bank data; the classifier gets a fixed value.
const DEFAULT_AGE: f64 = 35.0;
const MIN_ESTIMATED_LIMIT: f64 = 30_000.0;
/// Decay applied to synthesize months 2 and 3 from a single period.
const HISTORY_DECAY: [f64; 3] = [1.0, 0.95, 0.9];
const MAX_PAYMENT_STATUS: i32 = 8;

/// Map the longest gap between credits to a payment-status code
/// (-1 on time, 0 revolving, n = months late).
pub fn payment_status_for_gap(max_gap_days: f64) -> i32 {
    if max_gap_days <= 32.0 {
        -1
    } else if max_gap_days <= 40.0 {
        0
    } else if max_gap_days <= 65.0 {
        1
    } else if max_gap_days <= 95.0 {
        2
    } else {
        ((max_gap_days / 30.0) as i32).min(MAX_PAYMENT_STATUS)
    }
}

/// Stateless; safe to share between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the feature set. Empty input yields the default profile.
    pub fn extract(&self, transactions: &[Transaction]) -> ModelFeatureVector {
        let mut sorted = transactions.to_vec();
        // Undated entries go last, like missing timestamps in an export.
        sorted.sort_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let flow = CashFlow::from_transactions(&sorted);
        let Some(raw) = RawFeatureSet::from_transactions(&sorted, &flow) else {
            debug!("no transactions; using default feature set");
            return ModelFeatureVector::default();
        };

        let features = self.map_to_model(&raw, &flow);
        debug!(
            count = raw.transaction_count,
            pay_status = features.pay_0,
            overdraft_frequency = raw.overdraft_frequency,
            "features extracted"
        );
        ModelFeatureVector { features, raw }
    }

    /// Synthesize classifier-native fields from behavioral metrics.
    pub fn map_to_model(&self, raw: &RawFeatureSet, flow: &CashFlow) -> ModelFeatures {
        // Stable spenders get 10x income, erratic ones 3x.
        let limit_multiplier = (10.0 - raw.transaction_volatility * 10.0).max(3.0);
        let limit_bal = (flow.total_income * limit_multiplier).max(MIN_ESTIMATED_LIMIT);

        let mut pay_status = payment_status_for_gap(raw.payment_consistency);
        // Chronic overdrafts outweigh an on-time looking income cadence.
        if raw.overdraft_frequency > 0.2 {
            pay_status = pay_status.max(2);
        }

        let bill = if flow.total_expenses > 0.0 {
            flow.total_expenses / 3.0
        } else {
            raw.avg_balance * 0.3
        };
        let payment = if flow.total_income > flow.total_expenses {
            bill * 1.05
        } else {
            bill * (flow.total_income / (flow.total_expenses + 1.0))
        };

        ModelFeatures {
            limit_bal,
            age: DEFAULT_AGE,
            pay_0: pay_status,
            pay_2: pay_status,
            pay_3: pay_status,
            bill_amt1: bill * HISTORY_DECAY[0],
            bill_amt2: bill * HISTORY_DECAY[1],
            bill_amt3: bill * HISTORY_DECAY[2],
            pay_amt1: payment * HISTORY_DECAY[0],
            pay_amt2: payment * HISTORY_DECAY[1],
            pay_amt3: payment * HISTORY_DECAY[2],
        }
    }
}
