pub mod category;
pub mod money;
pub mod report;
pub mod transaction;

pub use category::{CategoryRuleSet, RuleSetError, UNCATEGORIZED};
pub use money::Money;
pub use report::{
    apply_override, category_totals, partition_by_category, partition_by_polarity, sum_amount,
    CategoryTotal, FinancialSummary, ReportError, TransactionFilter,
};
pub use transaction::{CategoryLabel, Polarity, RuleSource, Transaction, TransactionId};
