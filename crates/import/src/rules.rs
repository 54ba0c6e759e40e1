use serde::{Deserialize, Serialize};
use spendsort_core::{CategoryLabel, CategoryRuleSet, RuleSource, Transaction, TransactionId};
use thiserror::Error;

use crate::defaults::DEFAULT_RULES;

/// Which text fields keywords are tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFields {
    #[default]
    Description,
    /// Description or the statement's `Type` column.
    DescriptionAndType,
}

impl std::str::FromStr for MatchFields {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "description" => Ok(MatchFields::Description),
            "description_and_type" | "description+type" => Ok(MatchFields::DescriptionAndType),
            other => Err(format!("Unknown match fields: '{other}'")),
        }
    }
}

/// How a matched category name is written onto the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelCase {
    #[default]
    AsDefined,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    pub fields: MatchFields,
    /// Consult [`DEFAULT_RULES`] for transactions no user category matched.
    pub default_fallback: bool,
    pub label_case: LabelCase,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fields: MatchFields::Description,
            default_fallback: true,
            label_case: LabelCase::AsDefined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategorizeError {
    #[error("Transaction {0} has no description")]
    InvalidRecord(TransactionId),
}

/// Label counts after a categorization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategorizeOutcome {
    pub user: usize,
    pub default: usize,
    pub unlabeled: usize,
    pub overridden: usize,
}

/// A category with its keywords lower-cased and trimmed, empty ones dropped.
struct CompiledCategory {
    name: String,
    keywords: Vec<String>,
}

impl CompiledCategory {
    fn new<S: AsRef<str>>(name: &str, keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            name: name.to_string(),
            keywords,
        }
    }

    fn matches(&self, text: &MatchText) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Lower-cased matching text for one transaction.
struct MatchText {
    description: String,
    kind: Option<String>,
}

impl MatchText {
    fn contains(&self, keyword: &str) -> bool {
        self.description.contains(keyword)
            || self.kind.as_deref().is_some_and(|k| k.contains(keyword))
    }
}

/// Labels transactions from the user's rules, falling back to the built-in
/// table.
///
/// User categories are tried in rule-set order, then default categories in
/// declaration order. The first category with any keyword contained in the
/// matching text wins; there is no notion of a better match.
pub struct CategorizationEngine {
    options: EngineOptions,
    defaults: Vec<CompiledCategory>,
}

impl Default for CategorizationEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl CategorizationEngine {
    pub fn new(options: EngineOptions) -> Self {
        let defaults = DEFAULT_RULES
            .iter()
            .map(|(name, keywords)| CompiledCategory::new(name, *keywords))
            .collect();
        Self { options, defaults }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Recomputes every label except overrides.
    ///
    /// All records are checked before anything is written, so an invalid
    /// record leaves the whole set untouched.
    pub fn categorize(
        &self,
        rules: &CategoryRuleSet,
        transactions: &mut [Transaction],
    ) -> Result<CategorizeOutcome, CategorizeError> {
        if let Some(tx) = transactions.iter().find(|tx| tx.description.is_none()) {
            return Err(CategorizeError::InvalidRecord(tx.id));
        }

        let user = compile_user_rules(rules);
        let mut outcome = CategorizeOutcome::default();

        for tx in transactions.iter_mut() {
            if tx.category.is_overridden() {
                outcome.overridden += 1;
                continue;
            }
            let description = tx.description.as_deref().unwrap_or_default();
            let text = self.match_text(description, tx.kind.as_deref());
            tx.category = match self.find(&user, &text) {
                Some((category, source)) => {
                    match source {
                        RuleSource::User => outcome.user += 1,
                        RuleSource::Default => outcome.default += 1,
                    }
                    CategoryLabel::Matched {
                        category: self.label(category),
                        source,
                    }
                }
                None => {
                    outcome.unlabeled += 1;
                    CategoryLabel::Unlabeled
                }
            };
        }

        tracing::debug!(
            user = outcome.user,
            default = outcome.default,
            unlabeled = outcome.unlabeled,
            overridden = outcome.overridden,
            "Categorized {} transactions",
            transactions.len()
        );
        Ok(outcome)
    }

    /// The category a single description (and optional type) would get.
    pub fn classify(
        &self,
        rules: &CategoryRuleSet,
        description: &str,
        kind: Option<&str>,
    ) -> Option<(String, RuleSource)> {
        let user = compile_user_rules(rules);
        let text = self.match_text(description, kind);
        self.find(&user, &text)
            .map(|(category, source)| (self.label(category), source))
    }

    fn find<'a>(
        &'a self,
        user: &'a [CompiledCategory],
        text: &MatchText,
    ) -> Option<(&'a str, RuleSource)> {
        if let Some(cat) = user.iter().find(|c| c.matches(text)) {
            return Some((cat.name.as_str(), RuleSource::User));
        }
        if !self.options.default_fallback {
            return None;
        }
        self.defaults
            .iter()
            .find(|c| c.matches(text))
            .map(|c| (c.name.as_str(), RuleSource::Default))
    }

    fn match_text(&self, description: &str, kind: Option<&str>) -> MatchText {
        let kind = match self.options.fields {
            MatchFields::Description => None,
            MatchFields::DescriptionAndType => kind.map(str::to_lowercase),
        };
        MatchText {
            description: description.to_lowercase(),
            kind,
        }
    }

    fn label(&self, category: &str) -> String {
        match self.options.label_case {
            LabelCase::AsDefined => category.to_string(),
            LabelCase::Upper => category.to_uppercase(),
        }
    }
}

fn compile_user_rules(rules: &CategoryRuleSet) -> Vec<CompiledCategory> {
    rules
        .match_targets()
        .map(|(name, keywords)| CompiledCategory::new(name, keywords))
        .collect()
}
