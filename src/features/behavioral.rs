//! Behavioral statistics over a transaction history.

use super::RawFeatureSet;
use crate::ingest::Transaction;
use std::collections::HashSet;

/// Payment gap assumed when fewer than two dated credits exist.
const DEFAULT_PAYMENT_GAP_DAYS: f64 = 30.0;
const DEFAULT_ACCOUNT_AGE_DAYS: f64 = 30.0;
const DEFAULT_VOLATILITY: f64 = 0.5;
const DEFAULT_INCOME_STABILITY: f64 = 0.5;
/// Distinct categories at which diversity saturates.
const CATEGORY_SATURATION: f64 = 10.0;

/// Income and expense totals over the history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CashFlow {
    pub total_income: f64,
    pub total_expenses: f64,
}

impl CashFlow {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions.iter().fold(Self::default(), |mut acc, t| {
            if t.is_credit() {
                acc.total_income += t.amount;
            } else {
                acc.total_expenses += t.amount;
            }
            acc
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1); undefined below two values.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Coefficient of variation with a +1 guard on the mean.
fn dampened_cv(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let s = sample_std(values)?;
    let cv = s / (m + 1.0);
    cv.is_finite().then_some(cv)
}

impl RawFeatureSet {
    /// Compute metrics from transactions, which must already be sorted by date.
    /// Returns `None` for an empty history.
    pub fn from_transactions(sorted: &[Transaction], flow: &CashFlow) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        let n = sorted.len() as f64;
        let amounts: Vec<f64> = sorted.iter().map(|t| t.amount).collect();
        let credits: Vec<&Transaction> = sorted.iter().filter(|t| t.is_credit()).collect();
        let credit_amounts: Vec<f64> = credits.iter().map(|t| t.amount).collect();

        let avg_transaction = mean(&amounts).unwrap_or(500.0);

        let transaction_volatility = if avg_transaction > 0.0 {
            dampened_cv(&amounts).unwrap_or(DEFAULT_VOLATILITY)
        } else {
            DEFAULT_VOLATILITY
        };

        let expense_ratio = if flow.total_income > 0.0 {
            flow.total_expenses / (flow.total_income + 1.0)
        } else {
            1.0
        };

        // Max gap rather than spread: a freelancer paid every 10-25 days is
        // fine, a missed month is not.
        let credit_dates: Vec<_> = credits.iter().filter_map(|t| t.date).collect();
        let payment_consistency = credit_dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |a| a.max(gap))))
            .unwrap_or(DEFAULT_PAYMENT_GAP_DAYS);

        let overdrafts = sorted.iter().filter(|t| t.balance < 0.0).count() as f64;
        let overdraft_frequency = overdrafts / n;

        let income_stability = if credit_amounts.len() > 1 {
            dampened_cv(&credit_amounts).unwrap_or(DEFAULT_INCOME_STABILITY)
        } else {
            DEFAULT_INCOME_STABILITY
        };

        let categories: HashSet<&str> = sorted.iter().map(|t| t.category.as_str()).collect();
        let category_diversity = (categories.len() as f64 / CATEGORY_SATURATION).min(1.0);

        let dates: Vec<_> = sorted.iter().filter_map(|t| t.date).collect();
        let account_age = match (dates.iter().min(), dates.iter().max()) {
            (Some(first), Some(last)) if sorted.len() > 1 => (*last - *first).num_days() as f64,
            _ => DEFAULT_ACCOUNT_AGE_DAYS,
        };

        let balances: Vec<f64> = sorted.iter().map(|t| t.balance).collect();
        let avg_balance = mean(&balances).unwrap_or(5000.0);

        Some(Self {
            transaction_count: sorted.len(),
            avg_transaction,
            transaction_volatility,
            expense_ratio,
            payment_consistency,
            overdraft_frequency,
            income_stability,
            category_diversity,
            account_age,
            avg_balance,
        })
    }
}
