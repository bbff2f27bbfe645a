//! Config file discovery, parsing and validation

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;
use crate::error::OrchestratorError;

/// Searched in order; the first existing file wins
const SEARCH_PATHS: &[&str] = &[
    "./test-orchestrator.yaml",
    "./test-orchestrator.yml",
    "./test-orchestrator.json",
    "./.test-orchestrator.yaml",
    "~/.config/test-orchestrator/config.yaml",
];

/// On-disk encoding, chosen by extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` is YAML, anything else JSON
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }

    fn parse(self, content: &str) -> Result<AppConfig> {
        Ok(match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        })
    }

    fn render(self, config: &AppConfig) -> Result<String> {
        Ok(match self {
            ConfigFormat::Yaml => serde_yaml::to_string(config)?,
            ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        })
    }
}

impl AppConfig {
    /// First config file present in the search paths
    pub fn find() -> Option<PathBuf> {
        SEARCH_PATHS
            .iter()
            .map(|p| expand_home(p))
            .find(|p| p.is_file())
    }

    /// Discovered config file, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        Self::find().map_or_else(|| Ok(Self::default()), |path| Self::load(path))
    }

    /// Parse and validate a config file; missing keys take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::for_path(path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config = format
            .parse(&content)
            .with_context(|| format!("Invalid {:?} in config {}", format, path.display()))?;

        config
            .validate()
            .with_context(|| format!("Rejected config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = ConfigFormat::for_path(path).render(self)?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Cannot write config {}", path.display()))
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        let orchestrator = &self.orchestrator;
        let problem = if orchestrator.parallel_workers == 0 {
            Some("parallel_workers must be at least 1")
        } else if orchestrator.max_auto_fix_attempts == 0 {
            Some("max_auto_fix_attempts must be at least 1")
        } else if orchestrator.test_timeout_secs == Some(0) {
            Some("test_timeout_secs must be positive when set")
        } else {
            None
        };

        match problem {
            Some(msg) => Err(OrchestratorError::Config(msg.to_string()).into()),
            None => Ok(()),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
