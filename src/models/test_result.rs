//! Test result models
//!
//! Defines per-case results and their status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Test status lifecycle: `Pending -> Running -> terminal`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Flaky,
    Healed,
    Skipped,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pending => "·",
            TestStatus::Running => "▸",
            TestStatus::Passed => "✓",
            TestStatus::Failed => "✗",
            TestStatus::Flaky => "~",
            TestStatus::Healed => "+",
            TestStatus::Skipped => "○",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending | TestStatus::Running)
    }

    /// Passed in any form (first try, after retry, or after healing)
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TestStatus::Passed | TestStatus::Flaky | TestStatus::Healed
        )
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Pending => "PENDING",
            TestStatus::Running => "RUNNING",
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Flaky => "FLAKY",
            TestStatus::Healed => "HEALED",
            TestStatus::Skipped => "SKIPPED",
        };
        f.pad(s)
    }
}

/// Outcome of one executed test case
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub status: TestStatus,
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
    pub error_message: Option<String>,
    pub stack_trace: Option<String>,
    pub healed: bool,
    pub healing_applied: Option<String>,
}

impl TestResult {
    /// Start a new pending result
    pub fn pending(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            status: TestStatus::Pending,
            attempts: 0,
            started_at: Utc::now(),
            completed_at: None,
            duration_ms: 0,
            error_message: None,
            stack_trace: None,
            healed: false,
            healing_applied: None,
        }
    }

    pub fn skipped(test_id: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::pending(test_id);
        result.status = TestStatus::Skipped;
        result.error_message = Some(reason.into());
        result.finish();
        result
    }

    pub fn with_status(mut self, status: TestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_error(
        mut self,
        message: impl Into<String>,
        stack_trace: Option<String>,
    ) -> Self {
        self.error_message = Some(message.into());
        self.stack_trace = stack_trace;
        self
    }

    /// Stamp completion time and duration
    pub fn finish(&mut self) {
        let now = Utc::now();
        self.duration_ms = (now - self.started_at).num_milliseconds().max(0) as u64;
        self.completed_at = Some(now);
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms, {} attempt(s)]",
            self.status.symbol(),
            self.test_id,
            self.duration_ms,
            self.attempts
        )?;
        if self.healed {
            write!(f, " (healed)")?;
        }
        if let Some(msg) = &self.error_message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}
