//! Configuration loading for Clarity.
//! Reads clarity.toml from the current directory or the path in the CLARITY_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_kb_path")]
    pub path: PathBuf,
    /// Biomarker key → aliases merged into its pattern at load time.
    #[serde(default = "default_extra_aliases")]
    pub extra_aliases: BTreeMap<String, Vec<String>>,
}

fn default_kb_path() -> PathBuf { PathBuf::from("data/knowledge_base.json") }

fn default_extra_aliases() -> BTreeMap<String, Vec<String>> {
    let mut m = BTreeMap::new();
    m.insert("total_cholesterol".to_string(), vec!["cholesterol".to_string()]);
    m
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
            extra_aliases: default_extra_aliases(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_history_path() -> PathBuf { PathBuf::from("clarity_history.json") }
fn default_max_entries()  -> usize   { 10 }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "clarity_cli=info,clarity_extract=info,warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

mod tests;

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise CLARITY_CONFIG is checked, then
    /// clarity.toml in the current directory; if neither exists the defaults are used.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let path = std::env::var("CLARITY_CONFIG")
            .unwrap_or_else(|_| "clarity.toml".to_string());

        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        Self::from_file(Path::new(&path))
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.history.max_entries == 0 {
            anyhow::bail!("history.max_entries must be at least 1");
        }
        Ok(config)
    }
}
