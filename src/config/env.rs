//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

use super::AppConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "TEST_ORCH";

/// Configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// From TEST_ORCH_SELF_HEALING
    pub self_healing: Option<bool>,
    /// From TEST_ORCH_MAX_FIX_ATTEMPTS
    pub max_fix_attempts: Option<u32>,
    /// From TEST_ORCH_WORKERS
    pub workers: Option<usize>,
    /// From TEST_ORCH_TIMEOUT (seconds, 0 disables)
    pub timeout: Option<u64>,
    /// From TEST_ORCH_DATA_DIR
    pub data_dir: Option<String>,
    /// From TEST_ORCH_CONFIG
    pub config_file: Option<String>,
    /// From TEST_ORCH_LOG_LEVEL
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            self_healing: get_env_bool("SELF_HEALING"),
            max_fix_attempts: get_env_parse("MAX_FIX_ATTEMPTS"),
            workers: get_env_parse("WORKERS"),
            timeout: get_env_parse("TIMEOUT"),
            data_dir: get_env("DATA_DIR"),
            config_file: get_env("CONFIG"),
            log_level: get_env("LOG_LEVEL"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.self_healing.is_some()
            || self.max_fix_attempts.is_some()
            || self.workers.is_some()
            || self.timeout.is_some()
            || self.data_dir.is_some()
            || self.config_file.is_some()
            || self.log_level.is_some()
    }

    /// Override file values with whatever is set in the environment
    pub fn apply(&self, config: &mut AppConfig) {
        let orchestrator = &mut config.orchestrator;
        if let Some(enabled) = self.self_healing {
            orchestrator.enable_self_healing = enabled;
        }
        if let Some(attempts) = self.max_fix_attempts {
            orchestrator.max_auto_fix_attempts = attempts;
        }
        if let Some(workers) = self.workers {
            orchestrator.parallel_workers = workers;
        }
        if let Some(timeout) = self.timeout {
            orchestrator.test_timeout_secs = (timeout > 0).then_some(timeout);
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all TEST_ORCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_SELF_HEALING      Enable self-healing (true/false)");
    println!("  {ENV_PREFIX}_MAX_FIX_ATTEMPTS  Attempt budget with self-healing");
    println!("  {ENV_PREFIX}_WORKERS           Concurrent service groups");
    println!("  {ENV_PREFIX}_TIMEOUT           Per-attempt timeout in seconds (0 disables)");
    println!("  {ENV_PREFIX}_DATA_DIR          Pattern store and history directory");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  {ENV_PREFIX}_LOG_LEVEL         Log level (trace, debug, info, warn, error)");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(!config.has_any());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("on"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_apply_overrides() {
        let env = EnvConfig {
            self_healing: Some(true),
            workers: Some(8),
            timeout: Some(0),
            data_dir: Some("/srv/orch".to_string()),
            ..Default::default()
        };
        assert!(env.has_any());

        let mut config = AppConfig::default();
        env.apply(&mut config);

        assert!(config.orchestrator.enable_self_healing);
        assert_eq!(config.orchestrator.parallel_workers, 8);
        assert_eq!(config.orchestrator.test_timeout_secs, None);
        assert_eq!(config.orchestrator.max_auto_fix_attempts, 3);
        assert_eq!(config.data_dir, PathBuf::from("/srv/orch"));
    }

    #[test]
    fn test_load_reads_prefixed_vars() {
        env::set_var("TEST_ORCH_MAX_FIX_ATTEMPTS", "7");
        let config = EnvConfig::load();
        env::remove_var("TEST_ORCH_MAX_FIX_ATTEMPTS");
        assert_eq!(config.max_fix_attempts, Some(7));
    }
}
