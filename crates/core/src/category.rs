use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Reserved category that always exists and never takes part in matching.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CategoryEntry {
    name: String,
    keywords: Vec<String>,
}

/// User keyword rules: category name to keywords, kept in insertion order.
///
/// Insertion order is the match order, so it survives a save/load cycle
/// through the JSON object representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRuleSet {
    entries: Vec<CategoryEntry>,
}

impl Default for CategoryRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRuleSet {
    pub fn new() -> Self {
        CategoryRuleSet {
            entries: vec![CategoryEntry {
                name: UNCATEGORIZED.to_string(),
                keywords: Vec::new(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn keywords(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].keywords.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// All categories in insertion order, including the reserved one.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.keywords.as_slice()))
    }

    /// Categories that can match a transaction: everything except the
    /// reserved category and categories without keywords.
    pub fn match_targets(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter()
            .filter(|(name, keywords)| *name != UNCATEGORIZED && !keywords.is_empty())
    }

    /// Returns `true` if the category was inserted.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.entries.push(CategoryEntry {
            name: name.to_string(),
            keywords: Vec::new(),
        });
        true
    }

    /// Appends a trimmed keyword. Returns `Ok(false)` for empty or
    /// already-present keywords; the duplicate check is case-sensitive.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, RuleSetError> {
        let idx = self
            .position(category)
            .ok_or_else(|| RuleSetError::UnknownCategory(category.to_string()))?;
        let keyword = keyword.trim();
        let keywords = &mut self.entries[idx].keywords;
        if keyword.is_empty() || keywords.iter().any(|k| k == keyword) {
            return Ok(false);
        }
        keywords.push(keyword.to_string());
        Ok(true)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn insert_or_replace(&mut self, name: String, keywords: Vec<String>) {
        match self.position(&name) {
            Some(idx) => self.entries[idx].keywords = keywords,
            None => self.entries.push(CategoryEntry { name, keywords }),
        }
    }
}

impl Serialize for CategoryRuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.keywords)?;
        }
        map.end()
    }
}

struct RuleSetVisitor;

impl<'de> Visitor<'de> for RuleSetVisitor {
    type Value = CategoryRuleSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of category names to lists of keywords")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut rules = CategoryRuleSet { entries: Vec::new() };
        while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
            rules.insert_or_replace(name, keywords);
        }
        if !rules.contains(UNCATEGORIZED) {
            rules.entries.insert(
                0,
                CategoryEntry {
                    name: UNCATEGORIZED.to_string(),
                    keywords: Vec::new(),
                },
            );
        }
        Ok(rules)
    }
}

impl<'de> Deserialize<'de> for CategoryRuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RuleSetVisitor)
    }
}
