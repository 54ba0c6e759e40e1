pub mod csv;
pub mod defaults;
pub mod rules;

pub use self::csv::{load_transactions, LoadError, LoadOptions, SignConvention};
pub use defaults::DEFAULT_RULES;
pub use rules::{
    CategorizationEngine, CategorizeError, CategorizeOutcome, EngineOptions, LabelCase,
    MatchFields,
};
