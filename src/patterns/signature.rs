//! Failure signatures
//!
//! Normalizes an error message and stack trace so that failures differing only
//! in timestamps, identifiers, or numbers hash to the same signature.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Characters of stack trace that contribute to a signature
pub const STACK_TRACE_PREFIX_CHARS: usize = 500;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}(?:t\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:z|[+-]\d{2}:?\d{2})?)?")
        .expect("ISO date pattern is valid")
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b")
        .expect("UUID pattern is valid")
});

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Builds stable failure signatures
pub struct FailureSignatureBuilder;

impl FailureSignatureBuilder {
    /// Normalized text a signature is computed from
    pub fn normalize(error_message: &str, stack_trace: &str) -> String {
        let stack: String = stack_trace.chars().take(STACK_TRACE_PREFIX_CHARS).collect();
        let text = format!("{error_message}::{stack}").to_lowercase();

        let text = ISO_DATE.replace_all(&text, "[DATE]");
        let text = UUID.replace_all(&text, "[UUID]");
        DIGITS.replace_all(&text, "[NUM]").into_owned()
    }

    /// SHA-256 of the normalized text, hex encoded
    pub fn signature(error_message: &str, stack_trace: &str) -> String {
        let normalized = Self::normalize(error_message, stack_trace);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Stable pattern identifier derived from a signature
    pub fn pattern_id(signature: &str) -> String {
        signature.chars().take(16).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_placeholders() {
        let text = FailureSignatureBuilder::normalize(
            "Request 42 failed at 2024-01-01T10:00:00Z for 123e4567-e89b-12d3-a456-426614174000",
            "",
        );
        assert_eq!(text, "request [NUM] failed at [DATE] for [UUID]::");
    }

    #[test]
    fn test_signature_ignores_dates() {
        let a = FailureSignatureBuilder::signature("Connection refused at 2024-01-01T00:00:00", "");
        let b = FailureSignatureBuilder::signature("Connection refused at 2025-06-30T23:59:59", "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_ignores_uuids_and_numbers() {
        let a = FailureSignatureBuilder::signature(
            "order 17 for user 0f8fad5b-d9cb-469f-a165-70867728950e not found",
            "at handler.rs:88",
        );
        let b = FailureSignatureBuilder::signature(
            "order 9001 for user 7c9e6679-7425-40de-944b-e07fc1f90ae7 not found",
            "at handler.rs:112",
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_is_case_insensitive() {
        let a = FailureSignatureBuilder::signature("Timeout", "Trace");
        let b = FailureSignatureBuilder::signature("TIMEOUT", "trace");
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_distinguishes_messages() {
        let a = FailureSignatureBuilder::signature("connection refused", "");
        let b = FailureSignatureBuilder::signature("assertion failed", "");
        assert_ne!(a, b);
    }

    #[test]
    fn test_stack_trace_truncated() {
        let prefix = "x".repeat(STACK_TRACE_PREFIX_CHARS);
        let a = FailureSignatureBuilder::signature("err", &format!("{prefix}tail one"));
        let b = FailureSignatureBuilder::signature("err", &format!("{prefix}another tail"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_shape() {
        let sig = FailureSignatureBuilder::signature("err", "trace");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(FailureSignatureBuilder::pattern_id(&sig).len(), 16);
    }
}
