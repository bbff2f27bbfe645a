//! Execution records
//!
//! A `TestExecution` aggregates every result produced by one scheduler run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TestResult, TestStatus};

/// Aggregate counters for an execution
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub flaky: usize,
    pub skipped: usize,
    /// Counted independently of the status buckets
    pub healed: usize,
}

impl ExecutionSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match result.status {
                TestStatus::Passed | TestStatus::Healed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Flaky => summary.flaky += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::Pending | TestStatus::Running => {}
            }
            if result.healed {
                summary.healed += 1;
            }
        }

        summary
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            ((self.passed + self.flaky) as f64 / self.total as f64) * 100.0
        }
    }
}

/// Overall status: any FAILED wins, then FLAKY, then any healed result, else PASSED
pub fn aggregate_status(results: &[TestResult]) -> TestStatus {
    if results.iter().any(|r| r.status == TestStatus::Failed) {
        TestStatus::Failed
    } else if results.iter().any(|r| r.status == TestStatus::Flaky) {
        TestStatus::Flaky
    } else if results.iter().any(|r| r.healed) {
        TestStatus::Healed
    } else {
        TestStatus::Passed
    }
}

/// One complete run of a batch of test cases
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestExecution {
    pub id: String,
    pub strategy_id: String,
    pub status: TestStatus,
    pub results: Vec<TestResult>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub summary: ExecutionSummary,
}

impl TestExecution {
    pub fn start(id: impl Into<String>, strategy_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            strategy_id: strategy_id.into(),
            status: TestStatus::Running,
            results: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            summary: ExecutionSummary::default(),
        }
    }

    /// Attach results and derive status and summary
    pub fn complete(&mut self, results: Vec<TestResult>) {
        self.status = aggregate_status(&results);
        self.summary = ExecutionSummary::from_results(&results);
        self.results = results;
        self.completed_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> u64 {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &TestResult> {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Failed)
    }
}

impl fmt::Display for TestExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution {} ({})", self.id, self.strategy_id)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Flaky: {} | Skip: {} | Healed: {}",
            self.summary.total,
            self.summary.passed,
            self.summary.failed,
            self.summary.flaky,
            self.summary.skipped,
            self.summary.healed
        )?;
        writeln!(
            f,
            "Status: {} | Duration: {}ms",
            self.status,
            self.duration_ms()
        )
    }
}
