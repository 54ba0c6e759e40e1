use spendsort_core::{CategoryRuleSet, RuleSetError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read rule file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Rule file {path} is not a map of category names to keyword lists: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write rule file {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    RuleSet(#[from] RuleSetError),
}

/// Reads a rule file. A missing file yields the default rule set.
pub fn load(path: &Path) -> Result<CategoryRuleSet, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No rule file at {}, starting empty", path.display());
            return Ok(CategoryRuleSet::new());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Replaces the rule file in one step: the set is written to a sibling
/// temp file which is then renamed over the target.
pub fn save(path: &Path, rules: &CategoryRuleSet) -> Result<(), StoreError> {
    replace_file(path, |out| {
        serde_json::to_writer_pretty(&mut *out, rules)?;
        out.write_all(b"\n")
    })
    .map_err(|source| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Saved {} categories to {}", rules.len(), path.display());
    Ok(())
}

/// The target is only touched by the final rename, so a failed `write`
/// leaves whatever was there before.
fn replace_file<F>(path: &Path, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The user's category rules together with the file that backs them.
///
/// Every mutation is saved before returning. A failed save leaves the
/// in-memory change in place; the caller sees the error and decides.
#[derive(Debug)]
pub struct RuleStore {
    path: PathBuf,
    rules: CategoryRuleSet,
}

impl RuleStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let rules = load(&path)?;
        tracing::info!("Loaded {} categories from {}", rules.len(), path.display());
        Ok(RuleStore { path, rules })
    }

    /// Like [`RuleStore::open`], but a corrupt file is replaced in memory by
    /// the default rule set. The file itself is left alone until the next save.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        match load(&path) {
            Ok(rules) => Ok(RuleStore { path, rules }),
            Err(e @ StoreError::Corrupt { .. }) => {
                tracing::warn!("{e}; falling back to default categories");
                Ok(RuleStore {
                    path,
                    rules: CategoryRuleSet::new(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &CategoryRuleSet {
        &self.rules
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save(&self.path, &self.rules)
    }

    /// Returns `true` if the category is new.
    pub fn add_category(&mut self, name: &str) -> Result<bool, StoreError> {
        if !self.rules.add_category(name) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Returns `true` if the keyword was appended.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, StoreError> {
        if !self.rules.add_keyword(category, keyword)? {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
