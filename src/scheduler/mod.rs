//! Autonomous strategy runner
//!
//! Runs a batch of test cases as one execution, sequentially or across
//! service groups, then persists the record and keeps it in memory for
//! history and statistics queries.

mod stats;

pub use stats::FailureStatistics;

use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{AppConfig, OrchestratorConfig};
use crate::executor::{group_by_service, ParallelExecutor, ProgressCallback, TestExecutor};
use crate::harness::{ContextFactory, ModuleLoader, SelfHealer};
use crate::models::{ExecutionSummary, TestCase, TestExecution, TestResult};
use crate::patterns::FailurePatternStore;
use crate::results::{generate_execution_id, ExecutionStorage};

/// Top-level runner owning the executor, pattern store and history
pub struct AutonomousRunner {
    config: OrchestratorConfig,
    store: Arc<FailurePatternStore>,
    loader: Arc<dyn ModuleLoader>,
    executor: Arc<TestExecutor>,
    storage: ExecutionStorage,
    history: Vec<TestExecution>,
    last_run: Option<usize>,
}

impl AutonomousRunner {
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<FailurePatternStore>,
        loader: Arc<dyn ModuleLoader>,
        storage: ExecutionStorage,
    ) -> Self {
        let executor = Arc::new(TestExecutor::new(
            config.clone(),
            store.clone(),
            loader.clone(),
        ));
        Self {
            config,
            store,
            loader,
            executor,
            storage,
            history: Vec::new(),
            last_run: None,
        }
    }

    /// Build a runner over the data directory of an application config
    pub fn from_app_config(app: &AppConfig, loader: Arc<dyn ModuleLoader>) -> Self {
        let store = Arc::new(FailurePatternStore::open(app.patterns_path()));
        let storage = ExecutionStorage::new(app.history_dir());
        Self::new(app.orchestrator.clone(), store, loader, storage)
    }

    pub fn with_healer(mut self, healer: Arc<dyn SelfHealer>) -> Self {
        self.executor = Arc::new(
            TestExecutor::new(self.config.clone(), self.store.clone(), self.loader.clone())
                .with_healer(healer),
        );
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<FailurePatternStore> {
        &self.store
    }

    pub fn storage(&self) -> &ExecutionStorage {
        &self.storage
    }

    /// Executions recorded by this runner or loaded from storage
    pub fn history(&self) -> &[TestExecution] {
        &self.history
    }

    /// Summary of the most recent execution run by this process
    pub fn current_summary(&self) -> Option<&ExecutionSummary> {
        self.last_run.and_then(|i| self.history.get(i)).map(|e| &e.summary)
    }

    /// Merge persisted executions into memory, returning how many were added
    pub fn load_history(&mut self) -> Result<usize> {
        let known: HashSet<String> = self.history.iter().map(|e| e.id.clone()).collect();
        let loaded = self
            .storage
            .load_all()
            .context("Failed to load execution history")?;

        let before = self.history.len();
        self.history
            .extend(loaded.into_iter().filter(|e| !known.contains(&e.id)));
        let added = self.history.len() - before;

        info!(
            "Loaded {} executions from {}",
            added,
            self.storage.base_dir().display()
        );
        Ok(added)
    }

    /// Run every case once through the executor and record the execution
    pub async fn run_strategy(
        &mut self,
        strategy_id: &str,
        test_cases: Vec<TestCase>,
        context_factory: ContextFactory,
        progress: Option<&ProgressCallback>,
    ) -> Result<TestExecution> {
        let mut execution = TestExecution::start(generate_execution_id(), strategy_id);
        let start = Instant::now();
        info!(
            "Starting execution {} for strategy '{}' ({} cases)",
            execution.id,
            strategy_id,
            test_cases.len()
        );

        let results = if self.config.is_parallel() {
            let groups = group_by_service(test_cases);
            ParallelExecutor::new(self.config.parallel_workers)
                .run_groups(self.executor.clone(), groups, context_factory, progress)
                .await
        } else {
            self.run_sequential(&test_cases, &context_factory, progress)
                .await
        };

        execution.complete(results);
        self.storage
            .save(&execution)
            .with_context(|| format!("Failed to persist execution {}", execution.id))?;

        let summary = &execution.summary;
        info!(
            "Execution {} finished in {}ms: {} ({}/{} passed, {} failed, {} flaky, {} skipped)",
            execution.id,
            start.elapsed().as_millis(),
            execution.status,
            summary.passed,
            summary.total,
            summary.failed,
            summary.flaky,
            summary.skipped
        );
        if summary.failed > 0 {
            warn!("{} test(s) failed in {}", summary.failed, execution.id);
        }

        self.last_run = Some(self.history.len());
        self.history.push(execution.clone());
        Ok(execution)
    }

    async fn run_sequential(
        &self,
        test_cases: &[TestCase],
        context_factory: &ContextFactory,
        progress: Option<&ProgressCallback>,
    ) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(test_cases.len());
        for case in test_cases {
            let result = self.executor.execute(case, context_factory).await;
            if let Some(callback) = progress {
                callback(&result);
            }
            results.push(result);
        }
        results
    }

    /// Executions newest first, optionally filtered by strategy and truncated
    pub fn execution_history(
        &self,
        limit: Option<usize>,
        strategy_id: Option<&str>,
    ) -> Vec<TestExecution> {
        let mut executions: Vec<TestExecution> = self
            .history
            .iter()
            .filter(|e| strategy_id.map_or(true, |id| e.strategy_id == id))
            .cloned()
            .collect();
        executions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        if let Some(limit) = limit {
            executions.truncate(limit);
        }
        executions
    }

    /// Failure counts for executions started within the last `days` days
    pub fn failure_statistics(&self, days: i64) -> FailureStatistics {
        FailureStatistics::from_history(&self.history, days, Utc::now())
    }
}
