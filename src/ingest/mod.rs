//! Transaction ingestion: the typed transaction model and the coercions that
//! turn loosely-shaped input (JSON records, delimited text) into it.
//!
//! Nothing here fails on bad field values. Unparseable numbers become 0,
//! unparseable dates become `None`, and missing types are inferred from the
//! amount's sign.

mod delimited;

pub use delimited::parse_csv;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CATEGORY: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" | "cr" | "deposit" | "income" => Some(Self::Credit),
            "debit" | "dr" | "withdrawal" | "expense" => Some(Self::Debit),
            _ => None,
        }
    }

    /// Positive amounts are credits; zero and negative amounts are debits.
    pub fn infer(signed_amount: f64) -> Self {
        if signed_amount > 0.0 {
            Self::Credit
        } else {
            Self::Debit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// One bank-account transaction. `amount` is always non-negative; direction
/// lives in `kind`. `balance` is the signed post-transaction balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub balance: f64,
}

impl Transaction {
    pub fn new(date: NaiveDate, amount: f64, kind: TransactionType, balance: f64) -> Self {
        Self {
            date: Some(date),
            amount: amount.abs(),
            category: DEFAULT_CATEGORY.to_string(),
            kind,
            balance,
        }
    }

    pub fn credit(date: NaiveDate, amount: f64, balance: f64) -> Self {
        Self::new(date, amount, TransactionType::Credit, balance)
    }

    pub fn debit(date: NaiveDate, amount: f64, balance: f64) -> Self {
        Self::new(date, amount, TransactionType::Debit, balance)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_credit(&self) -> bool {
        self.kind == TransactionType::Credit
    }

    /// Amount with its direction applied: credits add, debits subtract.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
        }
    }
}

/// Loose JSON shape of a transaction as it arrives from callers. Every field
/// is optional and numbers may be sent as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "loose_number")]
    pub balance: Option<f64>,
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => Some(parse_amount(&s)),
        Some(serde_json::Value::Bool(b)) => Some(if b { 1.0 } else { 0.0 }),
        _ => None,
    })
}

/// Convert records in order. A record without a balance gets the running sum
/// of signed amounts seen so far.
pub fn from_records(records: Vec<TransactionRecord>) -> Vec<Transaction> {
    let mut running = 0.0;
    records
        .into_iter()
        .map(|r| {
            let raw_amount = r.amount.filter(|a| a.is_finite()).unwrap_or(0.0);
            let kind = r
                .kind
                .as_deref()
                .and_then(TransactionType::parse)
                .unwrap_or_else(|| TransactionType::infer(raw_amount));
            let amount = raw_amount.abs();
            running += match kind {
                TransactionType::Credit => amount,
                TransactionType::Debit => -amount,
            };
            let balance = r.balance.filter(|b| b.is_finite()).unwrap_or(running);
            let category = r
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            Transaction {
                date: r.date.as_deref().and_then(parse_date),
                amount,
                category,
                kind,
                balance,
            }
        })
        .collect()
}

/// Parse the date formats seen in bank exports. Time components are dropped.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Lenient numeric parse: strips currency symbols and thousands separators,
/// treats `(x)` as negative, and yields 0 for anything unparseable.
pub fn parse_amount(s: &str) -> f64 {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' '))
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v
            } else {
                v
            }
        }
        _ => 0.0,
    }
}
