//! Failure pattern learning
//!
//! Signature normalization, keyword classification, retry backoff, and the
//! persistent pattern/strategy store.

mod backoff;
mod classify;
mod signature;
mod store;

pub use backoff::RetryStrategyCalculator;
pub use classify::classify;
pub use signature::{FailureSignatureBuilder, STACK_TRACE_PREFIX_CHARS};
pub use store::FailurePatternStore;
