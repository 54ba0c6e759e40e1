//! Request/response layer between a presentation shell and [`Session`].
//!
//! Inputs are plain strings and numbers; outputs are serializable views.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendsort_core::{CategoryTotal, Money, Polarity, Transaction, TransactionFilter, TransactionId};
use spendsort_import::{CategorizeOutcome, LoadOptions};
use std::path::Path;
use std::str::FromStr;

use crate::session::{Session, SessionError};

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<SessionError> for CommandError {
    fn from(e: SessionError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError { message }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionOutput {
    pub id: usize,
    pub details: String,
    pub posting_date: String,
    pub description: String,
    pub kind: Option<String>,
    pub amount: String,
    pub category: String,
    pub overridden: bool,
}

impl From<&Transaction> for TransactionOutput {
    fn from(tx: &Transaction) -> Self {
        TransactionOutput {
            id: tx.id.0,
            details: tx.details.to_string(),
            posting_date: tx.posting_date.format("%Y-%m-%d").to_string(),
            description: tx.description.clone().unwrap_or_default(),
            kind: tx.kind.clone(),
            amount: tx.amount.to_string(),
            category: tx.category.to_string(),
            overridden: tx.category.is_overridden(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryTotalOutput {
    pub category: String,
    pub count: usize,
    pub total: String,
}

impl From<&CategoryTotal> for CategoryTotalOutput {
    fn from(t: &CategoryTotal) -> Self {
        CategoryTotalOutput {
            category: t.category.clone(),
            count: t.count,
            total: t.total.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryOutput {
    pub total_income: String,
    pub total_expenses: String,
    pub net_balance: String,
    pub categories: Vec<CategoryTotalOutput>,
}

#[derive(Debug, Serialize)]
pub struct RuleOutput {
    pub category: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverrideInput {
    pub transaction_id: usize,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterInput {
    pub category: String,
    pub amount: Option<String>,
}

pub fn parse_polarity(s: &str) -> Result<Polarity, CommandError> {
    Ok(s.parse::<Polarity>()?)
}

pub fn parse_money(s: &str) -> Result<Money, CommandError> {
    let dec = Decimal::from_str(s.trim()).map_err(|e| CommandError {
        message: format!("Invalid amount '{s}': {e}"),
    })?;
    Ok(Money::from_decimal(dec))
}

/// `"12=Groceries"` as used on the command line.
pub fn parse_override(s: &str) -> Result<OverrideInput, CommandError> {
    let (id, category) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected ID=CATEGORY, got '{s}'"))?;
    let transaction_id = id
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid transaction id '{id}'"))?;
    Ok(OverrideInput {
        transaction_id,
        category: category.trim().to_string(),
    })
}

pub fn load_statement(
    session: &mut Session,
    path: &Path,
    options: &LoadOptions,
) -> Result<CategorizeOutcome, CommandError> {
    let file = std::fs::File::open(path).map_err(|e| CommandError {
        message: format!("Error processing file {}: {e}", path.display()),
    })?;
    let outcome = session.load_csv(file, options).map_err(|e| CommandError {
        message: format!("Error processing file {}: {e}", path.display()),
    })?;
    Ok(outcome)
}

pub fn get_rules(session: &Session) -> Vec<RuleOutput> {
    session
        .rules()
        .iter()
        .map(|(category, keywords)| RuleOutput {
            category: category.to_string(),
            keywords: keywords.to_vec(),
        })
        .collect()
}

pub fn add_category(session: &mut Session, name: &str) -> Result<bool, CommandError> {
    Ok(session.add_category(name)?)
}

pub fn add_keyword(session: &mut Session, category: &str, keyword: &str) -> Result<bool, CommandError> {
    Ok(session.add_keyword(category, keyword)?)
}

pub fn get_transactions(session: &Session, polarity: Option<Polarity>) -> Vec<TransactionOutput> {
    match polarity {
        Some(p) => session.by_polarity(p).into_iter().map(Into::into).collect(),
        None => session.transactions().iter().map(Into::into).collect(),
    }
}

pub fn get_summary(session: &Session, polarity: Option<Polarity>) -> SummaryOutput {
    let summary = session.summary();
    SummaryOutput {
        total_income: summary.total_income.to_string(),
        total_expenses: summary.total_expenses.to_string(),
        net_balance: summary.net_balance.to_string(),
        categories: session
            .category_totals(polarity)
            .iter()
            .map(Into::into)
            .collect(),
    }
}

pub fn set_override(session: &mut Session, input: &OverrideInput) -> Result<(), CommandError> {
    Ok(session.override_category(TransactionId(input.transaction_id), &input.category)?)
}

pub fn stage_override(session: &mut Session, input: &OverrideInput) -> Result<(), CommandError> {
    Ok(session.stage_override(TransactionId(input.transaction_id), &input.category)?)
}

pub fn commit_overrides(session: &mut Session) -> Result<usize, CommandError> {
    Ok(session.commit_overrides()?)
}

pub fn filter_transactions(
    session: &Session,
    input: &FilterInput,
) -> Result<Vec<TransactionOutput>, CommandError> {
    let mut filter = TransactionFilter::category(input.category.as_str());
    if let Some(amount) = &input.amount {
        filter = filter.with_amount(parse_money(amount)?);
    }
    Ok(session.filter(&filter).into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_override_splits_on_equals() {
        let o = parse_override("12= Groceries ").unwrap();
        assert_eq!(o.transaction_id, 12);
        assert_eq!(o.category, "Groceries");
        assert!(parse_override("Groceries").is_err());
        assert!(parse_override("x=Groceries").is_err());
    }

    #[test]
    fn parse_money_accepts_signed_decimals() {
        assert_eq!(parse_money("-725").unwrap(), Money::from_cents(-72500));
        assert!(parse_money("seven").is_err());
    }

    #[test]
    fn parse_polarity_reports_bad_input() {
        assert_eq!(parse_polarity("debit").unwrap(), Polarity::Debit);
        let err = parse_polarity("both").unwrap_err();
        assert!(err.message.contains("BOTH"));
    }
}
