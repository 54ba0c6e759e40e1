use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendsort_core::{Money, Polarity, Transaction, TransactionId};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

pub const DETAILS_COLUMN: &str = "Details";
pub const POSTING_DATE_COLUMN: &str = "Posting Date";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const TYPE_COLUMN: &str = "Type";

/// How the statement writes the sign of `Amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// Debits are already negative.
    #[default]
    Signed,
    /// Every amount is a magnitude; the sign comes from `Details`.
    Unsigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    pub date_format: String,
    pub sign_convention: SignConvention,
    /// Columns discarded when present. Missing ones are ignored.
    pub drop_columns: Vec<String>,
    pub delimiter: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_format: "%m/%d/%Y".to_string(),
            sign_convention: SignConvention::Signed,
            drop_columns: vec!["Check or Slip #".to_string()],
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Line {line}: missing value for column {column}")]
    MissingField { line: u64, column: String },
    #[error("Line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },
    #[error("Line {line}: invalid amount '{value}'")]
    InvalidAmount { line: u64, value: String },
    #[error("Line {line}: invalid details '{value}', expected DEBIT or CREDIT")]
    InvalidDetails { line: u64, value: String },
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    details: usize,
    posting_date: usize,
    description: usize,
    amount: usize,
    kind: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord, options: &LoadOptions) -> Result<Self, LoadError> {
        let kept: Vec<(usize, &str)> = headers
            .iter()
            .map(str::trim)
            .enumerate()
            .filter(|(_, name)| {
                let dropped = is_anonymous(name)
                    || options.drop_columns.iter().any(|d| d.trim() == *name);
                if dropped {
                    tracing::debug!("Dropping column '{name}'");
                }
                !dropped
            })
            .collect();

        let find = |column: &str| kept.iter().find(|(_, name)| *name == column).map(|(i, _)| *i);
        let require = |column: &str| find(column).ok_or_else(|| LoadError::MissingColumn(column.to_string()));

        Ok(ColumnIndex {
            details: require(DETAILS_COLUMN)?,
            posting_date: require(POSTING_DATE_COLUMN)?,
            description: require(DESCRIPTION_COLUMN)?,
            amount: require(AMOUNT_COLUMN)?,
            kind: find(TYPE_COLUMN),
        })
    }
}

/// Index columns left behind by earlier exports (`Unnamed: 0`) or blank
/// header cells from trailing delimiters.
fn is_anonymous(name: &str) -> bool {
    name.is_empty() || name.starts_with("Unnamed")
}

/// Parses a statement export into transactions, in file order.
///
/// Any bad row fails the whole load; there is no partial result.
pub fn load_transactions<R: Read>(
    data: R,
    options: &LoadOptions,
) -> Result<Vec<Transaction>, LoadError> {
    let delimiter = options
        .delimiter
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers, options)?;

    let mut transactions = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |idx: usize, column: &str| {
            record.get(idx).ok_or_else(|| LoadError::MissingField {
                line,
                column: column.to_string(),
            })
        };

        let details_raw = field(columns.details, DETAILS_COLUMN)?;
        let details = details_raw
            .parse::<Polarity>()
            .map_err(|_| LoadError::InvalidDetails {
                line,
                value: details_raw.trim().to_string(),
            })?;

        let date_raw = field(columns.posting_date, POSTING_DATE_COLUMN)?;
        let posting_date = parse_date(date_raw, &options.date_format).ok_or_else(|| {
            LoadError::InvalidDate {
                line,
                value: date_raw.trim().to_string(),
            }
        })?;

        let amount_raw = field(columns.amount, AMOUNT_COLUMN)?;
        let amount = parse_amount(amount_raw).ok_or_else(|| LoadError::InvalidAmount {
            line,
            value: amount_raw.trim().to_string(),
        })?;
        let amount = normalize_sign(amount, details, options.sign_convention);

        let description = field(columns.description, DESCRIPTION_COLUMN)?.trim().to_string();
        let kind = columns
            .kind
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let mut tx = Transaction::new(
            TransactionId(transactions.len()),
            details,
            posting_date,
            description,
            amount,
        );
        tx.kind = kind;
        transactions.push(tx);
    }

    tracing::info!("Loaded {} transactions", transactions.len());
    Ok(transactions)
}

fn parse_date(s: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), format).ok()
}

fn parse_amount(s: &str) -> Option<Money> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let s = s.replace([',', '$', ' '], "");
    let dec = Decimal::from_str(&s).ok()?;
    // Sub-cent values are refused rather than rounded.
    if dec.normalize().scale() > 2 {
        return None;
    }
    Some(Money::from_decimal(if negative { -dec } else { dec }))
}

/// Debits negative, credits positive.
fn normalize_sign(amount: Money, details: Polarity, convention: SignConvention) -> Money {
    match (convention, details) {
        (SignConvention::Signed, _) => amount,
        (SignConvention::Unsigned, Polarity::Debit) => -amount.abs(),
        (SignConvention::Unsigned, Polarity::Credit) => amount.abs(),
    }
}
