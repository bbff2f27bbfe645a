//! Test modules and the loader that resolves them

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::context::ExecutionContext;
use crate::error::OrchestratorError;

/// Failure raised by a test module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TestFailure {
    pub message: String,
    pub stack_trace: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: String::new(),
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = stack_trace.into();
        self
    }
}

impl From<anyhow::Error> for TestFailure {
    fn from(err: anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            stack_trace: format!("{err:?}"),
        }
    }
}

/// Executable test code behind a `TestCase::module_reference`
#[async_trait]
pub trait TestRunnable: Send + Sync {
    async fn run(&self, ctx: &mut dyn ExecutionContext) -> Result<(), TestFailure>;
}

/// Resolves module references to runnables
pub trait ModuleLoader: Send + Sync {
    fn load(&self, module_reference: &str) -> Result<Arc<dyn TestRunnable>, OrchestratorError>;
}

/// In-process loader populated by a registration step
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Option<Arc<dyn TestRunnable>>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, module_reference: impl Into<String>, runnable: Arc<dyn TestRunnable>) {
        self.modules
            .write()
            .insert(module_reference.into(), Some(runnable));
    }

    /// Builder form of `register`
    pub fn with(self, module_reference: impl Into<String>, runnable: Arc<dyn TestRunnable>) -> Self {
        self.register(module_reference, runnable);
        self
    }

    /// Record a discovered module that has no run entry point
    pub fn declare(&self, module_reference: impl Into<String>) {
        self.modules
            .write()
            .entry(module_reference.into())
            .or_insert(None);
    }

    pub fn contains(&self, module_reference: &str) -> bool {
        self.modules.read().contains_key(module_reference)
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, module_reference: &str) -> Result<Arc<dyn TestRunnable>, OrchestratorError> {
        match self.modules.read().get(module_reference) {
            Some(Some(runnable)) => Ok(runnable.clone()),
            Some(None) => Err(OrchestratorError::MissingEntryPoint(
                module_reference.to_string(),
            )),
            None => Err(OrchestratorError::ModuleNotFound(
                module_reference.to_string(),
            )),
        }
    }
}
