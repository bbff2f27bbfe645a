//! Output formatting module
//!
//! Renders executions, failure statistics and patterns for the terminal.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
