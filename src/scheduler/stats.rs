//! Failure statistics over execution history

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{TestExecution, TestStatus};

/// Failure counts for executions started within a trailing window
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailureStatistics {
    pub period_days: i64,
    pub since: DateTime<Utc>,
    pub total_executions: usize,
    pub failed_executions: usize,
    pub total_tests: usize,
    pub total_failures: usize,
    pub failures_by_test: BTreeMap<String, usize>,
}

impl FailureStatistics {
    pub fn from_history<'a>(
        executions: impl IntoIterator<Item = &'a TestExecution>,
        days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        // Windows reaching past the representable range cover all history
        let since = Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut stats = Self {
            period_days: days,
            since,
            total_executions: 0,
            failed_executions: 0,
            total_tests: 0,
            total_failures: 0,
            failures_by_test: BTreeMap::new(),
        };

        for execution in executions.into_iter().filter(|e| e.started_at >= since) {
            stats.total_executions += 1;
            stats.total_tests += execution.results.len();
            if execution.status == TestStatus::Failed {
                stats.failed_executions += 1;
            }
            for result in execution.failed_results() {
                stats.total_failures += 1;
                *stats
                    .failures_by_test
                    .entry(result.test_id.clone())
                    .or_default() += 1;
            }
        }

        stats
    }

    /// Percentage of executed tests that failed
    pub fn failure_rate(&self) -> f64 {
        if self.total_tests == 0 {
            0.0
        } else {
            (self.total_failures as f64 / self.total_tests as f64) * 100.0
        }
    }

    /// Tests with the most failures, ties broken by id
    pub fn top_failing(&self, n: usize) -> Vec<(&str, usize)> {
        let mut tests: Vec<_> = self
            .failures_by_test
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        tests.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tests.truncate(n);
        tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestResult;

    fn execution(days_ago: i64, statuses: &[(&str, TestStatus)]) -> TestExecution {
        let mut exec = TestExecution::start(format!("exec_{days_ago}"), "smoke");
        exec.started_at = Utc::now() - Duration::days(days_ago);
        exec.complete(
            statuses
                .iter()
                .map(|(id, status)| TestResult::pending(*id).with_status(*status))
                .collect(),
        );
        exec
    }

    #[test]
    fn test_window_and_buckets() {
        let history = vec![
            execution(1, &[("login", TestStatus::Failed), ("search", TestStatus::Passed)]),
            execution(2, &[("login", TestStatus::Failed), ("cart", TestStatus::Failed)]),
            execution(3, &[("login", TestStatus::Passed)]),
            execution(30, &[("login", TestStatus::Failed)]),
        ];

        let stats = FailureStatistics::from_history(&history, 7, Utc::now());
        assert_eq!(stats.total_executions, 3);
        assert_eq!(stats.failed_executions, 2);
        assert_eq!(stats.total_tests, 5);
        assert_eq!(stats.total_failures, 3);
        assert_eq!(stats.failures_by_test.get("login"), Some(&2));
        assert_eq!(stats.failures_by_test.get("cart"), Some(&1));
        assert!((stats.failure_rate() - 60.0).abs() < 1e-9);
        assert_eq!(stats.top_failing(1), vec![("login", 2)]);
    }

    #[test]
    fn test_empty_history() {
        let stats = FailureStatistics::from_history(&Vec::<TestExecution>::new(), 7, Utc::now());
        assert_eq!(stats.total_executions, 0);
        assert_eq!(stats.failure_rate(), 0.0);
        assert!(stats.top_failing(5).is_empty());
    }

    #[test]
    fn test_unbounded_window_covers_everything() {
        let history = vec![
            execution(1, &[("login", TestStatus::Failed)]),
            execution(3650, &[("login", TestStatus::Failed)]),
        ];

        for days in [1_000_000_000, i64::MAX] {
            let stats = FailureStatistics::from_history(&history, days, Utc::now());
            assert_eq!(stats.since, DateTime::<Utc>::MIN_UTC);
            assert_eq!(stats.total_executions, 2);
            assert_eq!(stats.failures_by_test.get("login"), Some(&2));
        }
    }
}
