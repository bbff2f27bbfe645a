//! Test execution engine
//!
//! Per-case execution with retries and healing, plus the service-group pool.

mod parallel;
mod runner;

pub use parallel::{group_by_service, ParallelExecutor, ServiceGroup};
pub use runner::TestExecutor;

use crate::models::TestResult;

/// Invoked once per produced result, in completion order
pub type ProgressCallback = dyn Fn(&TestResult) + Send + Sync;
