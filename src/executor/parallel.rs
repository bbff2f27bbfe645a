//! Parallel test execution
//!
//! Runs service groups concurrently on a bounded pool. Cases inside a group
//! run sequentially in submission order; groups themselves are unordered.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info};

use super::runner::TestExecutor;
use super::ProgressCallback;
use crate::error::OrchestratorError;
use crate::harness::ContextFactory;
use crate::models::{TestCase, TestResult, TestStatus};

/// Cases that share a service and must run one after another
#[derive(Clone, Debug)]
pub struct ServiceGroup {
    pub service: String,
    pub cases: Vec<TestCase>,
}

/// Partition cases by service, keeping first-seen service order and intra-group order
pub fn group_by_service(test_cases: Vec<TestCase>) -> Vec<ServiceGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ServiceGroup> = Vec::new();

    for case in test_cases {
        match index.get(&case.service) {
            Some(&i) => groups[i].cases.push(case),
            None => {
                index.insert(case.service.clone(), groups.len());
                groups.push(ServiceGroup {
                    service: case.service.clone(),
                    cases: vec![case],
                });
            }
        }
    }

    groups
}

/// Bounded pool of service-group workers
pub struct ParallelExecutor {
    max_concurrent: usize,
}

impl ParallelExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run all groups, reporting each result as it completes
    ///
    /// Every submitted case yields exactly one result. Cases a dead worker
    /// never reported are recorded as failures.
    pub async fn run_groups(
        &self,
        executor: Arc<TestExecutor>,
        groups: Vec<ServiceGroup>,
        context_factory: ContextFactory,
        progress: Option<&ProgressCallback>,
    ) -> Vec<TestResult> {
        info!(
            "Running {} service groups in parallel (max {} concurrent)",
            groups.len(),
            self.max_concurrent
        );

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let semaphore = semaphore.clone();
            let executor = executor.clone();
            let context_factory = context_factory.clone();
            let tx = tx.clone();
            let group = group.clone();

            handles.push(tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                debug!(
                    "Worker picked up service group {} ({} cases)",
                    group.service,
                    group.cases.len()
                );

                for case in &group.cases {
                    let result = executor.execute(case, &context_factory).await;
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let mut reported = vec![0usize; groups.len()];
        let mut results = Vec::new();
        while let Some((index, result)) = rx.recv().await {
            reported[index] += 1;
            if let Some(callback) = progress {
                callback(&result);
            }
            results.push(result);
        }

        for (index, handle) in handles.into_iter().enumerate() {
            let Err(e) = handle.await else {
                continue;
            };
            let group = &groups[index];
            let err = OrchestratorError::Worker(e.to_string());
            error!("Service group {}: {}", group.service, err);

            for case in group.cases.iter().skip(reported[index]) {
                let mut result = TestResult::pending(&case.id)
                    .with_status(TestStatus::Failed)
                    .with_error(err.to_string(), None);
                result.attempts = 1;
                result.finish();
                if let Some(callback) = progress {
                    callback(&result);
                }
                results.push(result);
            }
        }

        info!(
            "Parallel execution completed in {}ms ({} results)",
            start.elapsed().as_millis(),
            results.len()
        );

        results
    }
}
