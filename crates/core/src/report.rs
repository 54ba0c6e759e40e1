//! Aggregation over labeled transactions.
//!
//! Everything here is order-preserving: partitions and filters return the
//! input transactions in statement order.

use serde::Serialize;
use thiserror::Error;

use super::category::UNCATEGORIZED;
use super::money::Money;
use super::transaction::{CategoryLabel, Transaction, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("Transaction not found: {0}")]
    UnknownTransaction(TransactionId),
}

/// Splits transactions into `(debits, credits)`.
pub fn partition_by_polarity(transactions: &[Transaction]) -> (Vec<&Transaction>, Vec<&Transaction>) {
    transactions.iter().partition(|tx| tx.is_debit())
}

pub fn sum_amount<'a, I>(transactions: I) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().map(|tx| tx.amount).sum()
}

/// Transactions whose label is exactly `category`. Unlabeled transactions
/// are selected by `"Uncategorized"`.
pub fn partition_by_category<'a>(transactions: &'a [Transaction], category: &str) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.category.display_name() == category)
        .collect()
}

/// Sets a manual category, bypassing the rules. The category name is not
/// validated against the rule set.
pub fn apply_override(
    transactions: &mut [Transaction],
    id: TransactionId,
    new_category: &str,
) -> Result<(), ReportError> {
    let tx = transactions
        .iter_mut()
        .find(|tx| tx.id == id)
        .ok_or(ReportError::UnknownTransaction(id))?;
    tx.category = CategoryLabel::Overridden(new_category.to_string());
    Ok(())
}

/// Category match combined with an optional exact amount, e.g. rent
/// payments of exactly -725.00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionFilter {
    pub category: String,
    pub amount: Option<Money>,
}

impl TransactionFilter {
    pub fn category(category: impl Into<String>) -> Self {
        TransactionFilter {
            category: category.into(),
            amount: None,
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.category.display_name() == self.category
            && self.amount.map_or(true, |amount| tx.amount == amount)
    }

    pub fn filter<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub total: Money,
}

/// Per-category count and sum in order of first appearance, with
/// unlabeled transactions last.
pub fn category_totals<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut uncategorized = CategoryTotal {
        category: UNCATEGORIZED.to_string(),
        count: 0,
        total: Money::zero(),
    };

    for tx in transactions {
        let slot = match tx.category.name() {
            None => &mut uncategorized,
            Some(name) => match totals.iter().position(|t| t.category == name) {
                Some(idx) => &mut totals[idx],
                None => {
                    totals.push(CategoryTotal {
                        category: name.to_string(),
                        count: 0,
                        total: Money::zero(),
                    });
                    let last = totals.len() - 1;
                    &mut totals[last]
                }
            },
        };
        slot.count += 1;
        slot.total = slot.total + tx.amount;
    }

    if uncategorized.count > 0 {
        totals.push(uncategorized);
    }
    totals
}

/// Statement-level totals. Expenses are reported as a positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_balance: Money,
}

impl FinancialSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let (debits, credits) = partition_by_polarity(transactions);
        let total_income = sum_amount(credits);
        let total_expenses = sum_amount(debits).abs();
        FinancialSummary {
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Polarity, RuleSource};
    use chrono::NaiveDate;

    fn tx(id: usize, details: Polarity, desc: &str, cents: i64, category: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(
            TransactionId(id),
            details,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            desc,
            Money::from_cents(cents),
        );
        if let Some(name) = category {
            tx.category = CategoryLabel::Matched {
                category: name.to_string(),
                source: RuleSource::User,
            };
        }
        tx
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(0, Polarity::Debit, "DUNKIN", -1000, Some("Food")),
            tx(1, Polarity::Credit, "PAYROLL", 250000, None),
            tx(2, Polarity::Debit, "ZELLE TO LANDLORD", -72500, Some("RENT")),
            tx(3, Polarity::Debit, "ZELLE TO LANDLORD", -70000, Some("RENT")),
            tx(4, Polarity::Debit, "DOORDASH", -550, Some("Food")),
        ]
    }

    #[test]
    fn polarity_partition_preserves_order() {
        let txs = sample();
        let (debits, credits) = partition_by_polarity(&txs);
        let ids: Vec<usize> = debits.iter().map(|t| t.id.0).collect();
        assert_eq!(ids, [0, 2, 3, 4]);
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].id, TransactionId(1));
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(sum_amount(&Vec::<Transaction>::new()), Money::zero());
    }

    #[test]
    fn sum_of_two_debits() {
        let txs = vec![
            tx(0, Polarity::Debit, "A", -1000, None),
            tx(1, Polarity::Debit, "B", -550, None),
        ];
        assert_eq!(sum_amount(&txs), Money::from_cents(-1550));
    }

    #[test]
    fn category_partition_is_exact_match() {
        let txs = sample();
        assert_eq!(partition_by_category(&txs, "Food").len(), 2);
        assert!(partition_by_category(&txs, "FOOD").is_empty());
        assert_eq!(partition_by_category(&txs, UNCATEGORIZED).len(), 1);
    }

    #[test]
    fn rent_filter_requires_exact_amount() {
        let txs = sample();
        let rent = TransactionFilter::category("RENT").with_amount(Money::from_cents(-72500));
        let matched = rent.filter(&txs);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, TransactionId(2));
        assert_eq!(TransactionFilter::category("RENT").filter(&txs).len(), 2);
    }

    #[test]
    fn override_sets_label() {
        let mut txs = sample();
        apply_override(&mut txs, TransactionId(0), "Custom").unwrap();
        assert_eq!(txs[0].category, CategoryLabel::Overridden("Custom".to_string()));
        assert_eq!(
            apply_override(&mut txs, TransactionId(99), "Custom"),
            Err(ReportError::UnknownTransaction(TransactionId(99)))
        );
    }

    #[test]
    fn totals_group_by_category_with_uncategorized_last() {
        let totals = category_totals(&sample());
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, ["Food", "RENT", UNCATEGORIZED]);
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[0].total, Money::from_cents(-1550));
        assert_eq!(totals[1].total, Money::from_cents(-142500));
    }

    #[test]
    fn totals_accept_a_filtered_iterator() {
        let txs = sample();
        let totals = category_totals(txs.iter().filter(|tx| tx.is_debit()));
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, ["Food", "RENT"]);
        assert_eq!(totals[1].count, 2);
    }

    #[test]
    fn summary_reports_expense_magnitude() {
        let summary = FinancialSummary::from_transactions(&sample());
        assert_eq!(summary.total_income, Money::from_cents(250000));
        assert_eq!(summary.total_expenses, Money::from_cents(144050));
        assert_eq!(summary.net_balance, Money::from_cents(105950));
    }
}
