//! Orchestrator error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Test module not found: {0}")]
    ModuleNotFound(String),

    #[error("Test module {0} does not expose a run entry point")]
    MissingEntryPoint(String),

    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    Worker(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OrchestratorError {
    /// Loader failures are not retried or healed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OrchestratorError::ModuleNotFound(_)
                | OrchestratorError::MissingEntryPoint(_)
                | OrchestratorError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(OrchestratorError::ModuleNotFound("m".into()).is_configuration());
        assert!(OrchestratorError::MissingEntryPoint("m".into()).is_configuration());
        assert!(!OrchestratorError::Worker("panic".into()).is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::ModuleNotFound("suite/login".into());
        assert_eq!(err.to_string(), "Test module not found: suite/login");
    }
}
