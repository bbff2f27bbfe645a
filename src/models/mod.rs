//! Data models for test orchestration
//!
//! Test descriptors, results, execution records, and failure-learning state.

mod execution;
mod pattern;
mod test_case;
mod test_result;

pub use execution::{aggregate_status, ExecutionSummary, TestExecution};
pub use pattern::{BackoffType, FailurePattern, PatternType, RetryStrategy};
pub use test_case::TestCase;
pub use test_result::{TestResult, TestStatus};
