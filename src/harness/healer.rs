//! Self-healing collaborator

use async_trait::async_trait;

use crate::models::TestCase;

/// Proposes and applies fixes to failing test cases
#[async_trait]
pub trait SelfHealer: Send + Sync {
    /// Description of the applied fix, or `None` if nothing was applied
    async fn attempt_heal(
        &self,
        test_case: &TestCase,
        error_message: &str,
        stack_trace: &str,
    ) -> Option<String>;
}
