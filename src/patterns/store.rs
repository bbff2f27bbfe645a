//! Persistent failure pattern store
//!
//! Holds every known `FailurePattern` and its `RetryStrategy`. The whole
//! document is loaded once and rewritten after each mutation; all mutations
//! go through one lock so concurrent executors cannot lose updates.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::classify::classify;
use super::signature::FailureSignatureBuilder;
use crate::error::{OrchestratorError, Result};
use crate::models::{FailurePattern, RetryStrategy};

/// On-disk layout of the store
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    patterns: BTreeMap<String, FailurePattern>,
    #[serde(default)]
    strategies: BTreeMap<String, RetryStrategy>,
}

/// Failure pattern store shared by all executors
pub struct FailurePatternStore {
    path: Option<PathBuf>,
    state: Mutex<StoreDocument>,
}

impl FailurePatternStore {
    /// Open a store backed by `path`; unreadable files start an empty store
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = match load_document(&path) {
            Ok(document) => {
                info!(
                    "Loaded {} failure patterns from {}",
                    document.patterns.len(),
                    path.display()
                );
                document
            }
            Err(e) => {
                warn!(
                    "Starting with empty pattern store ({}): {:#}",
                    path.display(),
                    e
                );
                StoreDocument::default()
            }
        };

        Self {
            path: Some(path),
            state: Mutex::new(document),
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(StoreDocument::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a known pattern, registering this occurrence if found
    pub fn detect_pattern(&self, error_message: &str, stack_trace: &str) -> Option<FailurePattern> {
        let signature = FailureSignatureBuilder::signature(error_message, stack_trace);
        let pattern_id = FailureSignatureBuilder::pattern_id(&signature);

        let mut state = self.state.lock();
        let pattern = state.patterns.get_mut(&pattern_id)?;
        pattern.touch();
        let pattern = pattern.clone();
        debug!(
            "Recognized {} pattern {} (frequency {})",
            pattern.pattern_type, pattern.pattern_id, pattern.frequency
        );

        self.persist_logged(&state);
        Some(pattern)
    }

    /// Record a terminal failure, creating the pattern and its strategy if new
    pub fn record_failure(
        &self,
        test_id: &str,
        error_message: &str,
        stack_trace: &str,
        suggested_fix: Option<&str>,
    ) -> FailurePattern {
        let signature = FailureSignatureBuilder::signature(error_message, stack_trace);
        let pattern_id = FailureSignatureBuilder::pattern_id(&signature);

        let mut state = self.state.lock();
        let pattern = match state.patterns.get_mut(&pattern_id) {
            Some(pattern) => {
                pattern.touch();
                pattern.affected_tests.insert(test_id.to_string());
                if let Some(fix) = suggested_fix {
                    pattern.suggested_fix = Some(fix.to_string());
                }
                pattern.clone()
            }
            None => {
                let pattern_type = classify(error_message);
                let mut pattern =
                    FailurePattern::new(&pattern_id, pattern_type, signature, test_id);
                pattern.suggested_fix = suggested_fix.map(str::to_string);

                info!(
                    "New {} failure pattern {} from {}",
                    pattern_type, pattern_id, test_id
                );
                state
                    .strategies
                    .entry(pattern_id.clone())
                    .or_insert_with(|| RetryStrategy::for_pattern(&pattern_id, pattern_type));
                state.patterns.insert(pattern_id, pattern.clone());
                pattern
            }
        };

        self.persist_logged(&state);
        pattern
    }

    /// Stored strategy, or the fallback if none exists
    pub fn get_strategy(&self, pattern_id: &str) -> RetryStrategy {
        self.state
            .lock()
            .strategies
            .get(pattern_id)
            .cloned()
            .unwrap_or_else(|| RetryStrategy::fallback(pattern_id))
    }

    /// Fold a retry outcome into the pattern's strategy
    pub fn update_strategy_success(&self, pattern_id: &str, success: bool) {
        let mut state = self.state.lock();
        let Some(strategy) = state.strategies.get_mut(pattern_id) else {
            debug!("Ignoring outcome for unknown pattern {}", pattern_id);
            return;
        };
        strategy.record_outcome(success);
        debug!(
            "Strategy {} success rate now {:.2} over {} retries",
            pattern_id, strategy.success_rate, strategy.total_applied
        );

        self.persist_logged(&state);
    }

    pub fn pattern(&self, pattern_id: &str) -> Option<FailurePattern> {
        self.state.lock().patterns.get(pattern_id).cloned()
    }

    /// Snapshot of all patterns, most frequent first
    pub fn patterns(&self) -> Vec<FailurePattern> {
        let mut patterns: Vec<_> = self.state.lock().patterns.values().cloned().collect();
        patterns.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });
        patterns
    }

    pub fn strategies(&self) -> Vec<RetryStrategy> {
        self.state.lock().strategies.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist_logged(&self, document: &StoreDocument) {
        if let Err(e) = self.persist(document) {
            warn!("Failed to persist failure patterns: {}", e);
        }
    }

    /// Rewrite the whole document; called with the state lock held
    ///
    /// The write is synchronous and blocks the calling runtime thread until
    /// the rename lands. Documents are small and written once per terminal
    /// failure or retry outcome.
    fn persist(&self, document: &StoreDocument) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source: std::io::Error| OrchestratorError::Persistence {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush().map_err(io_err)?;
        drop(writer);

        fs::rename(&tmp_path, path).map_err(io_err)?;
        Ok(())
    }
}

fn load_document(path: &Path) -> anyhow::Result<StoreDocument> {
    use anyhow::Context;

    let file = File::open(path).context("Failed to open pattern store")?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("Failed to parse pattern store")
}
