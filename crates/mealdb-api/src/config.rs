use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Settings read from `~/.mealdb/config.toml`; every field is optional in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Suggestions shown while typing
    pub suggestion_limit: usize,
    /// Trimmed query length below which no suggestions are fetched
    pub min_suggestion_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 15,
            suggestion_limit: 5,
            min_suggestion_chars: 2,
        }
    }
}

impl Config {
    /// Load the user config (if any), then apply `MEALDB_API_URL`
    pub fn load() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        if let Ok(url) = std::env::var("MEALDB_API_URL") {
            config.api_url = url;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mealdb").join("config.toml"))
}
