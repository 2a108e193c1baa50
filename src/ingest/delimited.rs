//! Delimited-text adapter (CSV exports from banks and spreadsheets).

use super::{from_records, Transaction, TransactionRecord};
use crate::error::{Result, ScoringError};
use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, Trim};

/// Header spellings seen in exports, mapped to canonical column names.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("transaction_date", "date"),
    ("trans_date", "date"),
    ("transaction_amount", "amount"),
    ("trans_amount", "amount"),
    ("transaction_type", "type"),
    ("trans_type", "type"),
    ("account_balance", "balance"),
    ("running_balance", "balance"),
    ("transaction_category", "category"),
    ("trans_category", "category"),
];

#[derive(Default)]
struct Columns {
    date: Option<usize>,
    amount: Option<usize>,
    category: Option<usize>,
    kind: Option<usize>,
    balance: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut cols = Columns::default();
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim().to_ascii_lowercase();
            let canonical = COLUMN_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, c)| *c)
                .unwrap_or(name.as_str());
            let slot = match canonical {
                "date" => &mut cols.date,
                "amount" => &mut cols.amount,
                "category" => &mut cols.category,
                "type" => &mut cols.kind,
                "balance" => &mut cols.balance,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }
        cols
    }
}

/// Parse CSV text with a header row into transactions.
///
/// Missing optional columns are filled in: category becomes "other", balance
/// becomes the running sum of signed amounts, type is inferred from the sign
/// of the amount, and a missing date column stamps every row with today.
pub fn parse_csv(text: &str) -> Result<Vec<Transaction>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let cols = Columns::from_headers(&headers);
    if cols.amount.is_none() && cols.balance.is_none() {
        return Err(ScoringError::ingest(
            "no amount or balance column in header",
        ));
    }
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|field| field.is_empty()) {
            continue;
        }
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(TransactionRecord {
            date: match cols.date {
                Some(_) => field(cols.date),
                None => Some(today.clone()),
            },
            amount: Some(field(cols.amount).map_or(0.0, |v| super::parse_amount(&v))),
            category: field(cols.category),
            kind: field(cols.kind),
            balance: field(cols.balance).map(|v| super::parse_amount(&v)),
        });
    }

    Ok(from_records(records))
}
