//! Per-attempt execution contexts

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// State handed to a test module for one attempt
#[async_trait]
pub trait ExecutionContext: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Runs after every attempt, whatever its outcome
    async fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Produces a fresh context for each attempt
pub type ContextFactory = Arc<dyn Fn() -> Box<dyn ExecutionContext> + Send + Sync>;

/// Wrap a closure as a `ContextFactory`
pub fn context_factory<F, C>(f: F) -> ContextFactory
where
    F: Fn() -> C + Send + Sync + 'static,
    C: ExecutionContext + 'static,
{
    Arc::new(move || Box::new(f()) as Box<dyn ExecutionContext>)
}

/// Simple key/value context
#[derive(Debug, Default)]
pub struct SharedContext {
    values: HashMap<String, serde_json::Value>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }
}

impl ExecutionContext for SharedContext {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
