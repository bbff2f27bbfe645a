//! Configuration module
//!
//! Engine settings, the application config file, and environment overrides.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFormat;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings passed explicitly to the scheduler
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Ask the self-healer for fixes on unrecognized failures
    pub enable_self_healing: bool,

    /// Attempt budget when self-healing is enabled
    pub max_auto_fix_attempts: u32,

    /// Concurrent service groups; 1 runs everything sequentially
    pub parallel_workers: usize,

    /// Per-attempt timeout for module invocation
    pub test_timeout_secs: Option<u64>,

    /// Cases carrying any of these tags are skipped
    pub skip_tags: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_self_healing: false,
            max_auto_fix_attempts: 3,
            parallel_workers: 1,
            test_timeout_secs: Some(300),
            skip_tags: Vec::new(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_self_healing(mut self, max_auto_fix_attempts: u32) -> Self {
        self.enable_self_healing = true;
        self.max_auto_fix_attempts = max_auto_fix_attempts;
        self
    }

    pub fn with_workers(mut self, parallel_workers: usize) -> Self {
        self.parallel_workers = parallel_workers;
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.test_timeout_secs = secs;
        self
    }

    pub fn with_skip_tag(mut self, tag: impl Into<String>) -> Self {
        self.skip_tags.push(tag.into());
        self
    }

    /// Attempts allowed before pattern retries are considered
    pub fn base_attempts(&self) -> u32 {
        if self.enable_self_healing {
            self.max_auto_fix_attempts.max(1)
        } else {
            1
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel_workers > 1
    }
}

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine settings
    pub orchestrator: OrchestratorConfig,

    /// Root for the pattern store and execution history
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            orchestrator: OrchestratorConfig::default(),
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn patterns_path(&self) -> PathBuf {
        self.data_dir.join("failure_patterns.json")
    }

    pub fn history_dir(&self) -> PathBuf {
        self.data_dir.join("executions")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("test-orchestrator")
}
