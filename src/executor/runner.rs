//! Single test case execution
//!
//! Runs one `TestCase` to a terminal `TestResult`: known failure patterns are
//! retried with their backoff first, then the self-healer is consulted, and
//! anything left is recorded as a terminal failure.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::OrchestratorConfig;
use crate::harness::{
    ContextFactory, ExecutionContext, ModuleLoader, SelfHealer, TestFailure, TestRunnable,
};
use crate::models::{TestCase, TestResult, TestStatus};
use crate::patterns::{FailurePatternStore, RetryStrategyCalculator};

/// Executes individual test cases
pub struct TestExecutor {
    config: OrchestratorConfig,
    store: Arc<FailurePatternStore>,
    loader: Arc<dyn ModuleLoader>,
    healer: Option<Arc<dyn SelfHealer>>,
}

impl TestExecutor {
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<FailurePatternStore>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            config,
            store,
            loader,
            healer: None,
        }
    }

    pub fn with_healer(mut self, healer: Arc<dyn SelfHealer>) -> Self {
        self.healer = Some(healer);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<FailurePatternStore> {
        &self.store
    }

    /// Run a single test case to completion
    pub async fn execute(&self, test_case: &TestCase, context_factory: &ContextFactory) -> TestResult {
        if let Some(tag) = self
            .config
            .skip_tags
            .iter()
            .find(|tag| test_case.has_tag(tag))
        {
            debug!("Skipping {} (tag '{}')", test_case, tag);
            return TestResult::skipped(&test_case.id, format!("Skipped by tag '{tag}'"));
        }

        let mut result = TestResult::pending(&test_case.id);

        let load = AssertUnwindSafe(|| self.loader.load(&test_case.module_reference));
        let loaded = match std::panic::catch_unwind(load) {
            Ok(loaded) => loaded.map_err(|e| e.to_string()),
            Err(panic) => Err(format!("module loader panicked: {}", panic_message(&*panic))),
        };
        let runnable = match loaded {
            Ok(runnable) => runnable,
            Err(message) => {
                error!("Cannot load {}: {}", test_case, message);
                result.attempts = 1;
                result.status = TestStatus::Failed;
                result.error_message = Some(message);
                result.finish();
                return result;
            }
        };

        let base_attempts = self.config.base_attempts();
        let mut retry_granted = false;
        let mut retried = false;
        let mut awaiting_outcome: Option<String> = None;

        result.status = TestStatus::Running;
        info!("Running {}", test_case);

        while result.attempts < base_attempts || retry_granted {
            retry_granted = false;
            result.attempts += 1;
            let attempt = result.attempts;

            // A context that cannot be built fails the attempt and has nothing to tear down
            let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| context_factory())) {
                Ok(mut ctx) => {
                    let outcome = self.invoke(&*runnable, &mut *ctx).await;
                    self.teardown(&mut *ctx, test_case, attempt).await;
                    outcome
                }
                Err(panic) => Err(TestFailure::new(format!(
                    "context setup panicked: {}",
                    panic_message(&*panic)
                ))),
            };

            if let Some(pattern_id) = awaiting_outcome.take() {
                self.store.update_strategy_success(&pattern_id, outcome.is_ok());
            }

            let failure = match outcome {
                Ok(()) => {
                    result.status = if result.healed {
                        TestStatus::Healed
                    } else if retried {
                        TestStatus::Flaky
                    } else {
                        TestStatus::Passed
                    };
                    result.error_message = None;
                    result.stack_trace = None;
                    result.finish();
                    info!("  {}", result);
                    return result;
                }
                Err(failure) => failure,
            };

            debug!(
                "Attempt {} of {} failed: {}",
                attempt, test_case, failure.message
            );
            result.error_message = Some(failure.message.clone());
            result.stack_trace =
                (!failure.stack_trace.is_empty()).then(|| failure.stack_trace.clone());

            if let Some(pattern) = self
                .store
                .detect_pattern(&failure.message, &failure.stack_trace)
            {
                let strategy = self.store.get_strategy(&pattern.pattern_id);
                if attempt <= strategy.max_retries {
                    let delay = RetryStrategyCalculator::delay_duration(&strategy, attempt);
                    info!(
                        "Retrying {} in {}ms ({} pattern {}, retry {}/{})",
                        test_case,
                        delay.as_millis(),
                        pattern.pattern_type,
                        pattern.pattern_id,
                        attempt,
                        strategy.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    awaiting_outcome = Some(pattern.pattern_id);
                    retried = true;
                    retry_granted = true;
                    continue;
                }
            }

            if self.config.enable_self_healing && attempt < base_attempts {
                if let Some(fix) = self.try_heal(test_case, &failure).await {
                    info!("Healed {}: {}", test_case, fix);
                    result.healed = true;
                    result.healing_applied = Some(fix);
                    continue;
                }
            }

            return self.fail(result, test_case, &failure);
        }

        // Budget exhausted without a terminal decision
        warn!("{} exhausted {} attempts", test_case, result.attempts);
        result.status = TestStatus::Failed;
        result.finish();
        result
    }

    /// A panicking healer counts as declining
    async fn try_heal(&self, test_case: &TestCase, failure: &TestFailure) -> Option<String> {
        let healer = self.healer.as_ref()?;
        let heal = healer.attempt_heal(test_case, &failure.message, &failure.stack_trace);
        match AssertUnwindSafe(heal).catch_unwind().await {
            Ok(fix) => fix.filter(|fix| !fix.trim().is_empty()),
            Err(panic) => {
                warn!(
                    "Self-healer panicked on {}: {}",
                    test_case,
                    panic_message(&*panic)
                );
                None
            }
        }
    }

    /// Teardown problems are logged and never change the attempt outcome
    async fn teardown(&self, ctx: &mut dyn ExecutionContext, test_case: &TestCase, attempt: u32) {
        match AssertUnwindSafe(ctx.teardown()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Teardown after attempt {} of {} failed: {:#}", attempt, test_case, e)
            }
            Err(panic) => warn!(
                "Teardown after attempt {} of {} panicked: {}",
                attempt,
                test_case,
                panic_message(&*panic)
            ),
        }
    }

    fn fail(&self, mut result: TestResult, test_case: &TestCase, failure: &TestFailure) -> TestResult {
        result.status = TestStatus::Failed;
        result.finish();

        let pattern = self.store.record_failure(
            &test_case.id,
            &failure.message,
            &failure.stack_trace,
            None,
        );
        error!(
            "{} failed after {} attempt(s) [{} pattern {}]: {}",
            test_case, result.attempts, pattern.pattern_type, pattern.pattern_id, failure.message
        );
        result
    }

    /// Invoke the module once, converting timeouts and panics into failures
    async fn invoke(
        &self,
        runnable: &dyn TestRunnable,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<(), TestFailure> {
        let run = AssertUnwindSafe(runnable.run(ctx)).catch_unwind();

        let outcome = match self.config.test_timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(TestFailure::new(format!(
                        "test execution timed out after {secs} seconds"
                    )))
                }
            },
            None => run.await,
        };

        match outcome {
            Ok(result) => result,
            Err(panic) => Err(TestFailure::new(format!(
                "test panicked: {}",
                panic_message(&*panic)
            ))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
