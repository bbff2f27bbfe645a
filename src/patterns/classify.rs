//! Keyword classification of failures

use crate::models::PatternType;

/// Ordered rules; the first rule with a matching keyword wins
const RULES: &[(PatternType, &[&str])] = &[
    (
        PatternType::Timeout,
        &["timeout", "timed out", "deadline exceeded"],
    ),
    (
        PatternType::AssertionError,
        &["assert", "expected", "mismatch"],
    ),
    (
        PatternType::NetworkError,
        &[
            "connection refused",
            "econnrefused",
            "econnreset",
            "connection reset",
            "network",
            "socket",
            "dns",
            "unreachable",
        ],
    ),
    (
        PatternType::RateLimit,
        &["rate limit", "ratelimit", "too many requests", "429"],
    ),
    (
        PatternType::ServerError,
        &[
            "internal server error",
            "server error",
            "bad gateway",
            "service unavailable",
            "500",
            "502",
            "503",
            "504",
        ],
    ),
];

/// Classify an error message by keyword
pub fn classify(error_message: &str) -> PatternType {
    let message = error_message.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| message.contains(k)))
        .map(|(ty, _)| *ty)
        .unwrap_or(PatternType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_type() {
        assert_eq!(classify("Operation timed out"), PatternType::Timeout);
        assert_eq!(classify("assertion failed: left == right"), PatternType::AssertionError);
        assert_eq!(
            classify("Connection refused at 2024-01-01T00:00:00"),
            PatternType::NetworkError
        );
        assert_eq!(classify("HTTP 429 Too Many Requests"), PatternType::RateLimit);
        assert_eq!(classify("502 Bad Gateway"), PatternType::ServerError);
        assert_eq!(classify("something odd happened"), PatternType::Unknown);
    }

    #[test]
    fn test_first_rule_wins() {
        // Both timeout and network keywords present
        assert_eq!(classify("network timeout"), PatternType::Timeout);
        assert_eq!(
            classify("expected 200 but got 503"),
            PatternType::AssertionError
        );
    }
}
