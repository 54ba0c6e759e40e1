use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::UNCATEGORIZED;
use super::money::Money;

/// Position of a transaction in the statement it was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub usize);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Debit,
    Credit,
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Debit => write!(f, "DEBIT"),
            Polarity::Credit => write!(f, "CREDIT"),
        }
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBIT" => Ok(Polarity::Debit),
            "CREDIT" => Ok(Polarity::Credit),
            other => Err(format!("Unknown transaction details: '{other}'")),
        }
    }
}

/// Which rule table produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleSource {
    User,
    Default,
}

/// The category state of a transaction.
///
/// `Unlabeled` is distinct from any category name, so a user category that
/// happens to be called "Uncategorized" is still a real label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryLabel {
    #[default]
    Unlabeled,
    Matched { category: String, source: RuleSource },
    /// Manual assignment. Never replaced by a categorization pass.
    Overridden(String),
}

impl CategoryLabel {
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryLabel::Unlabeled => None,
            CategoryLabel::Matched { category, .. } => Some(category),
            CategoryLabel::Overridden(category) => Some(category),
        }
    }

    /// Name used for display and for category filters.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNCATEGORIZED)
    }

    pub fn is_unlabeled(&self) -> bool {
        matches!(self, CategoryLabel::Unlabeled)
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, CategoryLabel::Overridden(_))
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One bank statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub details: Polarity,
    pub posting_date: NaiveDate,
    /// `None` only for records built outside the loader.
    pub description: Option<String>,
    /// The statement's optional `Type` column.
    pub kind: Option<String>,
    pub amount: Money,
    pub category: CategoryLabel,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        details: Polarity,
        posting_date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
    ) -> Self {
        Transaction {
            id,
            details,
            posting_date,
            description: Some(description.into()),
            kind: None,
            amount,
            category: CategoryLabel::Unlabeled,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn is_debit(&self) -> bool {
        self.details == Polarity::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.details == Polarity::Credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn polarity_parses_case_insensitively() {
        assert_eq!("DEBIT".parse::<Polarity>().unwrap(), Polarity::Debit);
        assert_eq!(" credit ".parse::<Polarity>().unwrap(), Polarity::Credit);
        assert!("CHECK".parse::<Polarity>().is_err());
    }

    #[test]
    fn unlabeled_displays_as_uncategorized() {
        assert_eq!(CategoryLabel::Unlabeled.to_string(), "Uncategorized");
        assert_eq!(CategoryLabel::Unlabeled.name(), None);
    }

    #[test]
    fn category_named_uncategorized_is_still_a_label() {
        let label = CategoryLabel::Matched {
            category: "Uncategorized".to_string(),
            source: RuleSource::User,
        };
        assert!(!label.is_unlabeled());
        assert_eq!(label.name(), Some("Uncategorized"));
    }

    #[test]
    fn new_transaction_starts_unlabeled() {
        let tx = Transaction::new(
            TransactionId(0),
            Polarity::Debit,
            date(2024, 3, 1),
            "AMAZON MKTPL",
            Money::from_cents(-1999),
        )
        .with_kind("ACH_DEBIT");
        assert!(tx.category.is_unlabeled());
        assert!(tx.is_debit());
        assert_eq!(tx.kind.as_deref(), Some("ACH_DEBIT"));
        assert_eq!(tx.description.as_deref(), Some("AMAZON MKTPL"));
    }
}
