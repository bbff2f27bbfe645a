//! Failure pattern and retry strategy models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Classification of a recurring failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Timeout,
    AssertionError,
    NetworkError,
    RateLimit,
    ServerError,
    Unknown,
}

impl PatternType {
    pub fn name(&self) -> &'static str {
        match self {
            PatternType::Timeout => "timeout",
            PatternType::AssertionError => "assertion_error",
            PatternType::NetworkError => "network_error",
            PatternType::RateLimit => "rate_limit",
            PatternType::ServerError => "server_error",
            PatternType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalized, recurring class of failure
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailurePattern {
    pub pattern_id: String,
    pub pattern_type: PatternType,
    pub signature: String,
    pub frequency: u64,
    pub affected_tests: BTreeSet<String>,
    pub last_seen: DateTime<Utc>,
    pub suggested_fix: Option<String>,
}

impl FailurePattern {
    pub fn new(
        pattern_id: impl Into<String>,
        pattern_type: PatternType,
        signature: impl Into<String>,
        test_id: impl Into<String>,
    ) -> Self {
        let mut affected_tests = BTreeSet::new();
        affected_tests.insert(test_id.into());
        Self {
            pattern_id: pattern_id.into(),
            pattern_type,
            signature: signature.into(),
            frequency: 1,
            affected_tests,
            last_seen: Utc::now(),
            suggested_fix: None,
        }
    }

    /// Register another occurrence
    pub fn touch(&mut self) {
        self.frequency += 1;
        self.last_seen = Utc::now();
    }
}

/// Backoff policy between retries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffType {
    Fixed,
    Linear,
    Exponential,
}

/// Retry policy and observed effectiveness for one pattern
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryStrategy {
    pub pattern_id: String,
    pub max_retries: u32,
    pub backoff_type: BackoffType,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub total_applied: u64,
    pub success_rate: f64,
}

impl RetryStrategy {
    /// Strategy used when a pattern has no stored strategy
    pub fn fallback(pattern_id: impl Into<String>) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            max_retries: 3,
            backoff_type: BackoffType::Exponential,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            total_applied: 0,
            success_rate: 0.0,
        }
    }

    /// Default strategy tuned per pattern classification
    pub fn for_pattern(pattern_id: impl Into<String>, pattern_type: PatternType) -> Self {
        let base = Self::fallback(pattern_id);
        match pattern_type {
            PatternType::Timeout => Self {
                backoff_type: BackoffType::Linear,
                base_delay_ms: 2000,
                ..base
            },
            PatternType::RateLimit => Self {
                backoff_type: BackoffType::Exponential,
                base_delay_ms: 5000,
                max_delay_ms: 60_000,
                ..base
            },
            PatternType::ServerError => Self {
                max_retries: 5,
                ..base
            },
            PatternType::AssertionError | PatternType::NetworkError | PatternType::Unknown => base,
        }
    }

    /// Fold one retry outcome into the running success rate
    pub fn record_outcome(&mut self, success: bool) {
        self.total_applied += 1;
        let n = self.total_applied as f64;
        let outcome = if success { 1.0 } else { 0.0 };
        let rate = (self.success_rate * (n - 1.0) + outcome) / n;
        self.success_rate = rate.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_type() {
        let timeout = RetryStrategy::for_pattern("p", PatternType::Timeout);
        assert_eq!(timeout.backoff_type, BackoffType::Linear);
        assert_eq!(timeout.base_delay_ms, 2000);

        let rate = RetryStrategy::for_pattern("p", PatternType::RateLimit);
        assert_eq!(rate.backoff_type, BackoffType::Exponential);
        assert_eq!(rate.base_delay_ms, 5000);
        assert_eq!(rate.max_delay_ms, 60_000);

        let server = RetryStrategy::for_pattern("p", PatternType::ServerError);
        assert_eq!(server.max_retries, 5);

        let network = RetryStrategy::for_pattern("p", PatternType::NetworkError);
        assert_eq!(network, RetryStrategy::fallback("p"));
    }

    #[test]
    fn test_defaults_respect_delay_ordering() {
        for ty in [
            PatternType::Timeout,
            PatternType::AssertionError,
            PatternType::NetworkError,
            PatternType::RateLimit,
            PatternType::ServerError,
            PatternType::Unknown,
        ] {
            let s = RetryStrategy::for_pattern("p", ty);
            assert!(s.base_delay_ms <= s.max_delay_ms, "{ty}");
        }
    }

    #[test]
    fn test_success_rate_online_average() {
        let mut s = RetryStrategy::fallback("p");
        s.record_outcome(true);
        assert_eq!(s.success_rate, 1.0);
        s.record_outcome(false);
        assert_eq!(s.success_rate, 0.5);
        s.record_outcome(false);
        s.record_outcome(true);
        assert_eq!(s.total_applied, 4);
        assert!((s.success_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_stays_bounded() {
        let mut s = RetryStrategy::fallback("p");
        for i in 0..1000 {
            s.record_outcome(i % 7 == 0);
            assert!((0.0..=1.0).contains(&s.success_rate));
        }
    }

    #[test]
    fn test_pattern_touch() {
        let mut p = FailurePattern::new("id", PatternType::Timeout, "sig", "t1");
        let before = p.last_seen;
        p.touch();
        assert_eq!(p.frequency, 2);
        assert!(p.last_seen >= before);
        assert_eq!(p.affected_tests.len(), 1);
    }
}
