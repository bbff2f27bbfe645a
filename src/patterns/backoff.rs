//! Retry backoff calculation

use std::time::Duration;

use crate::models::{BackoffType, RetryStrategy};

/// Computes capped backoff delays for a strategy
pub struct RetryStrategyCalculator;

impl RetryStrategyCalculator {
    /// Delay in milliseconds before retrying after `attempt` (1-based)
    pub fn delay(strategy: &RetryStrategy, attempt: u32) -> u64 {
        let attempt = attempt.max(1);
        let base = strategy.base_delay_ms;

        let delay = match strategy.backoff_type {
            BackoffType::Fixed => base,
            BackoffType::Linear => base.saturating_mul(u64::from(attempt)),
            BackoffType::Exponential => {
                base.saturating_mul(2u64.saturating_pow(attempt - 1))
            }
        };

        delay.min(strategy.max_delay_ms)
    }

    pub fn delay_duration(strategy: &RetryStrategy, attempt: u32) -> Duration {
        Duration::from_millis(Self::delay(strategy, attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(backoff_type: BackoffType, base: u64, max: u64) -> RetryStrategy {
        RetryStrategy {
            backoff_type,
            base_delay_ms: base,
            max_delay_ms: max,
            ..RetryStrategy::fallback("p")
        }
    }

    #[test]
    fn test_exponential() {
        let s = strategy(BackoffType::Exponential, 1000, 30_000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 1), 1000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 2), 2000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 3), 4000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 6), 30_000);
    }

    #[test]
    fn test_linear() {
        let s = strategy(BackoffType::Linear, 2000, 30_000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 1), 2000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 3), 6000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 20), 30_000);
    }

    #[test]
    fn test_fixed() {
        let s = strategy(BackoffType::Fixed, 750, 30_000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 1), 750);
        assert_eq!(RetryStrategyCalculator::delay(&s, 9), 750);
    }

    #[test]
    fn test_zero_attempt_treated_as_first() {
        let s = strategy(BackoffType::Exponential, 1000, 30_000);
        assert_eq!(RetryStrategyCalculator::delay(&s, 0), 1000);
    }

    #[test]
    fn test_delay_never_exceeds_cap() {
        for backoff_type in [BackoffType::Fixed, BackoffType::Linear, BackoffType::Exponential] {
            for (base, max) in [(1, 10), (1000, 30_000), (5000, 60_000), (u64::MAX / 2, u64::MAX)] {
                let s = strategy(backoff_type, base, max);
                for attempt in [1, 2, 3, 10, 63, 64, 65, u32::MAX] {
                    assert!(RetryStrategyCalculator::delay(&s, attempt) <= max);
                }
            }
        }
    }

    #[test]
    fn test_delay_duration() {
        let s = strategy(BackoffType::Fixed, 250, 1000);
        assert_eq!(
            RetryStrategyCalculator::delay_duration(&s, 4),
            Duration::from_millis(250)
        );
    }
}
