use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".renamer";
const CONFIG_FILE: &str = "config.toml";

/// User preferences read from `config.toml`. Never written by the tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Defaults for the numbering rules of `batch`
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Default preview format: "table", "summary" or "none"
    #[serde(default = "default_preview")]
    pub preview_format: String,

    /// Whether to use color output by default (None = auto-detect)
    #[serde(default)]
    pub use_color: Option<bool>,

    /// "host", "probe", "sensitive" or "insensitive"
    #[serde(default = "default_case_policy")]
    pub case_policy: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            preview_format: default_preview(),
            use_color: None,
            case_policy: default_case_policy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    pub number_format: Option<String>,
    pub number_position: Option<String>,
    pub number_start: Option<i64>,
    pub number_separator: Option<String>,
}

fn default_preview() -> String {
    "table".to_string()
}

fn default_case_policy() -> String {
    "host".to_string()
}

impl Config {
    /// Load `./.renamer/config.toml`, else `<config dir>/renamer/config.toml`.
    /// No file means defaults; a file that cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        let local = std::env::current_dir()
            .ok()
            .map(|cwd| cwd.join(CONFIG_DIR).join(CONFIG_FILE));
        let user = dirs::config_dir().map(|dir| dir.join("renamer").join(CONFIG_FILE));

        Self::load_first(local.into_iter().chain(user))
    }

    fn load_first(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self> {
        for path in candidates {
            if path.is_file() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}
