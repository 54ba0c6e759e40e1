use spendsort_core::{
    apply_override, category_totals, partition_by_polarity, CategoryRuleSet, CategoryTotal,
    FinancialSummary, Polarity, ReportError, Transaction, TransactionFilter, TransactionId,
};
use spendsort_import::{
    load_transactions, CategorizationEngine, CategorizeError, CategorizeOutcome, LoadError,
    LoadOptions,
};
use spendsort_storage::{RuleStore, StoreError};
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Categorize(#[from] CategorizeError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One user's working state: the rule store, the loaded statement and any
/// category picks not yet applied.
///
/// Rule edits re-run categorization over the loaded statement. Overrides
/// stay in place until a new statement is loaded.
pub struct Session {
    store: RuleStore,
    engine: CategorizationEngine,
    transactions: Vec<Transaction>,
    staged: BTreeMap<TransactionId, String>,
}

impl Session {
    pub fn new(store: RuleStore, engine: CategorizationEngine) -> Self {
        Session {
            store,
            engine,
            transactions: Vec::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn rules(&self) -> &CategoryRuleSet {
        self.store.rules()
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn engine(&self) -> &CategorizationEngine {
        &self.engine
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Replaces the loaded statement. On error the previous statement is kept.
    pub fn load_csv<R: Read>(
        &mut self,
        data: R,
        options: &LoadOptions,
    ) -> Result<CategorizeOutcome, SessionError> {
        let mut transactions = load_transactions(data, options)?;
        let outcome = self.engine.categorize(self.store.rules(), &mut transactions)?;
        self.transactions = transactions;
        self.staged.clear();
        Ok(outcome)
    }

    /// Replaces the loaded statement with records built by the caller.
    pub fn set_transactions(
        &mut self,
        mut transactions: Vec<Transaction>,
    ) -> Result<CategorizeOutcome, SessionError> {
        let outcome = self.engine.categorize(self.store.rules(), &mut transactions)?;
        self.transactions = transactions;
        self.staged.clear();
        Ok(outcome)
    }

    pub fn recategorize(&mut self) -> Result<CategorizeOutcome, SessionError> {
        Ok(self
            .engine
            .categorize(self.store.rules(), &mut self.transactions)?)
    }

    pub fn add_category(&mut self, name: &str) -> Result<bool, SessionError> {
        Ok(self.store.add_category(name)?)
    }

    /// Adds a keyword and relabels the statement. A failed save is returned
    /// as an error and the statement is not relabeled.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, SessionError> {
        let added = self.store.add_keyword(category, keyword)?;
        if added {
            self.recategorize()?;
        }
        Ok(added)
    }

    /// Assigns a category by hand. The name is not checked against the rule
    /// set; use [`Session::override_with_new_category`] to register it too.
    pub fn override_category(
        &mut self,
        id: TransactionId,
        category: &str,
    ) -> Result<(), SessionError> {
        apply_override(&mut self.transactions, id, category)?;
        self.staged.remove(&id);
        tracing::debug!("Transaction {id} overridden to '{category}'");
        Ok(())
    }

    pub fn override_with_new_category(
        &mut self,
        id: TransactionId,
        category: &str,
    ) -> Result<(), SessionError> {
        self.ensure_loaded(id)?;
        self.store.add_category(category)?;
        self.override_category(id, category.trim())
    }

    /// Records a pick without applying it. Picking again replaces the
    /// earlier pick for the same transaction.
    pub fn stage_override(&mut self, id: TransactionId, category: &str) -> Result<(), SessionError> {
        self.ensure_loaded(id)?;
        self.staged.insert(id, category.to_string());
        Ok(())
    }

    pub fn staged_overrides(&self) -> &BTreeMap<TransactionId, String> {
        &self.staged
    }

    /// Applies every staged pick. Returns how many were applied.
    pub fn commit_overrides(&mut self) -> Result<usize, SessionError> {
        let staged = std::mem::take(&mut self.staged);
        for (id, category) in &staged {
            apply_override(&mut self.transactions, *id, category)?;
        }
        tracing::info!("Applied {} category changes", staged.len());
        Ok(staged.len())
    }

    pub fn summary(&self) -> FinancialSummary {
        FinancialSummary::from_transactions(&self.transactions)
    }

    pub fn by_polarity(&self, polarity: Polarity) -> Vec<&Transaction> {
        let (debits, credits) = partition_by_polarity(&self.transactions);
        match polarity {
            Polarity::Debit => debits,
            Polarity::Credit => credits,
        }
    }

    /// Category totals, optionally limited to one side of the statement.
    pub fn category_totals(&self, polarity: Option<Polarity>) -> Vec<CategoryTotal> {
        match polarity {
            None => category_totals(&self.transactions),
            Some(p) => category_totals(self.transactions.iter().filter(|tx| tx.details == p)),
        }
    }

    pub fn filter(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        filter.filter(&self.transactions)
    }

    fn ensure_loaded(&self, id: TransactionId) -> Result<(), SessionError> {
        if self.transactions.iter().any(|tx| tx.id == id) {
            Ok(())
        } else {
            Err(ReportError::UnknownTransaction(id).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendsort_core::{CategoryLabel, Money, RuleSource};

    const STATEMENT: &str = "\
Details,Posting Date,Description,Amount
DEBIT,04/01/2024,DUNKIN #331,-4.50
DEBIT,04/01/2024,ZELLE TO LANDLORD,-725.00
CREDIT,04/02/2024,PAYROLL ACME,1500.00
DEBIT,04/03/2024,CORNER BODEGA,-6.25
";

    fn session(dir: &tempfile::TempDir) -> Session {
        let store = RuleStore::open(dir.path().join("categories.json")).unwrap();
        let mut session = Session::new(store, CategorizationEngine::default());
        session
            .load_csv(STATEMENT.as_bytes(), &LoadOptions::default())
            .unwrap();
        session
    }

    #[test]
    fn load_labels_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        assert_eq!(s.transactions().len(), 4);
        assert_eq!(
            s.transactions()[0].category,
            CategoryLabel::Matched {
                category: "Food".to_string(),
                source: RuleSource::Default
            }
        );
        assert!(s.transactions()[3].category.is_unlabeled());
    }

    #[test]
    fn failed_load_keeps_previous_statement() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        let bad = "Details,Posting Date,Description,Amount\nDEBIT,2024-04-01,X,-1\n";
        assert!(matches!(
            s.load_csv(bad.as_bytes(), &LoadOptions::default()),
            Err(SessionError::Load(LoadError::InvalidDate { .. }))
        ));
        assert_eq!(s.transactions().len(), 4);
    }

    #[test]
    fn new_keyword_relabels_loaded_statement() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.add_category("RENT").unwrap();
        assert!(s.add_keyword("RENT", "landlord").unwrap());
        assert_eq!(s.transactions()[1].category.name(), Some("RENT"));
    }

    #[test]
    fn keyword_for_unknown_category_leaves_labels_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        let before = s.transactions().to_vec();
        assert!(s.add_keyword("Nope", "bodega").is_err());
        assert_eq!(s.transactions(), &before[..]);
    }

    #[test]
    fn staged_overrides_apply_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.stage_override(TransactionId(3), "Groceries").unwrap();
        s.stage_override(TransactionId(3), "Snacks").unwrap();
        assert!(s.transactions()[3].category.is_unlabeled());

        assert_eq!(s.commit_overrides().unwrap(), 1);
        assert_eq!(
            s.transactions()[3].category,
            CategoryLabel::Overridden("Snacks".to_string())
        );
        assert!(s.staged_overrides().is_empty());
    }

    #[test]
    fn staging_unknown_transaction_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        assert!(matches!(
            s.stage_override(TransactionId(40), "Food"),
            Err(SessionError::Report(ReportError::UnknownTransaction(_)))
        ));
    }

    #[test]
    fn override_with_new_category_registers_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.override_with_new_category(TransactionId(3), " Bodega ").unwrap();
        assert!(s.rules().contains("Bodega"));
        assert_eq!(s.transactions()[3].category.name(), Some("Bodega"));
    }

    #[test]
    fn debit_totals_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        assert_eq!(s.by_polarity(Polarity::Credit).len(), 1);

        let totals = s.category_totals(Some(Polarity::Debit));
        let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, ["Food", "Personal", "Uncategorized"]);

        let summary = s.summary();
        assert_eq!(summary.total_income, Money::from_cents(150000));
        assert_eq!(summary.total_expenses, Money::from_cents(73575));
    }
}
