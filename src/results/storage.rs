//! Execution record storage
//!
//! Persists each `TestExecution` as its own JSON file, named by execution id.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{TestExecution, TestStatus};

/// Generate unique execution ID: `exec_<unix-millis>_<suffix>`
pub fn generate_execution_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("exec_{timestamp}_{suffix}")
}

/// Execution history storage
pub struct ExecutionStorage {
    /// Directory holding one file per execution
    base_dir: PathBuf,
}

impl ExecutionStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn execution_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }

    /// Write a completed execution
    pub fn save(&self, execution: &TestExecution) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create history dir {}", self.base_dir.display())
        })?;

        let path = self.execution_path(&execution.id);
        let file = File::create(&path).context("Failed to create execution file")?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, execution)
            .context("Failed to write execution")?;
        writer.flush().context("Failed to flush execution file")?;

        info!("Saved execution {} to {}", execution.id, path.display());
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<TestExecution> {
        self.load_from_path(&self.execution_path(id))
    }

    pub fn load_from_path(&self, path: &Path) -> Result<TestExecution> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open execution file {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse execution file {}", path.display()))
    }

    /// Load every readable execution, newest first
    pub fn load_all(&self) -> Result<Vec<TestExecution>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut executions = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_path(&path) {
                    Ok(execution) => executions.push(execution),
                    Err(e) => debug!("Skipping {}: {:#}", path.display(), e),
                }
            }
        }

        executions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(executions)
    }

    /// Brief listing, newest first
    pub fn list(&self) -> Result<Vec<ExecutionInfo>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|e| ExecutionInfo {
                pass_rate: e.summary.pass_rate(),
                total: e.summary.total,
                id: e.id,
                strategy_id: e.strategy_id,
                status: e.status,
                started_at: e.started_at,
            })
            .collect())
    }

    pub fn latest(&self) -> Result<Option<TestExecution>> {
        Ok(self.load_all()?.into_iter().next())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.execution_path(id);
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Deleted execution: {}", path.display());
        }
        Ok(())
    }

    /// Export an execution to a file
    pub fn export(&self, execution: &TestExecution, path: &Path, format: ExportFormat) -> Result<()> {
        match format {
            ExportFormat::Json => {
                let file = File::create(path)?;
                let writer = BufWriter::new(file);
                serde_json::to_writer_pretty(writer, execution)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;

                writer.write_record([
                    "execution_id",
                    "test_id",
                    "status",
                    "attempts",
                    "duration_ms",
                    "healed",
                    "healing_applied",
                    "error",
                ])?;

                for result in &execution.results {
                    writer.write_record([
                        execution.id.clone(),
                        result.test_id.clone(),
                        result.status.to_string(),
                        result.attempts.to_string(),
                        result.duration_ms.to_string(),
                        result.healed.to_string(),
                        result.healing_applied.clone().unwrap_or_default(),
                        result.error_message.clone().unwrap_or_default(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Exported execution to {}", path.display());
        Ok(())
    }
}

/// Brief execution information
#[derive(Clone, Debug)]
pub struct ExecutionInfo {
    pub id: String,
    pub strategy_id: String,
    pub status: TestStatus,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub pass_rate: f64,
}

/// Export format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestResult;
    use chrono::Duration;
    use tempfile::TempDir;

    fn execution(strategy: &str, minutes_ago: i64) -> TestExecution {
        let mut exec = TestExecution::start(generate_execution_id(), strategy);
        exec.started_at = Utc::now() - Duration::minutes(minutes_ago);
        exec.complete(vec![
            TestResult::pending("t1").with_status(TestStatus::Passed),
            TestResult::pending("t2")
                .with_status(TestStatus::Failed)
                .with_error("boom, \"quoted\"", None),
        ]);
        exec
    }

    #[test]
    fn test_generate_execution_id() {
        let id1 = generate_execution_id();
        let id2 = generate_execution_id();
        assert!(id1.starts_with("exec_"));
        let suffix = id1.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let storage = ExecutionStorage::new(dir.path().join("executions"));
        let exec = execution("smoke", 0);

        let path = storage.save(&exec).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), format!("{}.json", exec.id));

        let loaded = storage.load(&exec.id).unwrap();
        assert_eq!(loaded.id, exec.id);
        assert_eq!(loaded.status, TestStatus::Failed);
        assert_eq!(loaded.summary, exec.summary);
    }

    #[test]
    fn test_load_all_sorted_and_skips_corrupt() {
        let dir = TempDir::new().unwrap();
        let storage = ExecutionStorage::new(dir.path());
        let older = execution("smoke", 30);
        let newer = execution("nightly", 1);
        storage.save(&older).unwrap();
        storage.save(&newer).unwrap();
        fs::write(dir.path().join("garbage.json"), "not json").unwrap();

        let all = storage.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(storage.latest().unwrap().unwrap().id, newer.id);

        let listing = storage.list().unwrap();
        assert_eq!(listing[1].strategy_id, "smoke");
        assert_eq!(listing[1].total, 2);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = ExecutionStorage::new(dir.path().join("none"));
        assert!(storage.load_all().unwrap().is_empty());
        assert!(storage.latest().unwrap().is_none());
    }

    #[test]
    fn test_export_csv() {
        let dir = TempDir::new().unwrap();
        let storage = ExecutionStorage::new(dir.path());
        let exec = execution("smoke", 0);
        let path = dir.path().join("out.csv");

        storage.export(&exec, &path, ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "FAILED");
        assert_eq!(&rows[1][7], "boom, \"quoted\"");
    }

    #[test]
    fn test_export_format() {
        assert_eq!(ExportFormat::from_str("JSON"), Some(ExportFormat::Json));
        assert_eq!(
            ExportFormat::from_extension(Path::new("report.csv")),
            Some(ExportFormat::Csv)
        );
        assert!(ExportFormat::from_str("xml").is_none());
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let storage = ExecutionStorage::new(dir.path());
        let exec = execution("smoke", 0);
        storage.save(&exec).unwrap();
        storage.delete(&exec.id).unwrap();
        assert!(storage.load(&exec.id).is_err());
    }
}
