use serde::{Deserialize, Serialize};
use spendsort_import::{EngineOptions, LoadOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";
pub const RULES_FILE: &str = "categories.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

/// Settings read from `config.toml`. Every field has a default, so an
/// empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rule file location. Defaults to `categories.json` next to the config.
    pub rules_path: Option<PathBuf>,
    pub load: LoadOptions,
    pub engine: EngineOptions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn rules_path(&self, config_dir: &Path) -> PathBuf {
        self.rules_path
            .clone()
            .unwrap_or_else(|| config_dir.join(RULES_FILE))
    }
}

/// Platform config directory, e.g. `~/.config/spendsort` on Linux.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    directories::ProjectDirs::from("com", "spendsort", "Spendsort")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}
