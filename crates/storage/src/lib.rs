pub mod rule_store;

pub use rule_store::{RuleStore, StoreError};
