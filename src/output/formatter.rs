//! Output formatters for executions, statistics and patterns
//!
//! Provides Table, JSON, CSV and summary output formats.

use serde::Serialize;

use crate::models::{FailurePattern, TestExecution, TestResult, TestStatus};
use crate::scheduler::FailureStatistics;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    fn status_label(&self, status: TestStatus) -> String {
        let label = format!("{} {}", status.symbol(), status);
        if !self.colorize {
            return label;
        }
        let color = match status {
            TestStatus::Passed => "32",
            TestStatus::Failed => "31",
            TestStatus::Flaky | TestStatus::Skipped => "33",
            TestStatus::Healed => "36",
            TestStatus::Pending | TestStatus::Running => "90",
        };
        format!("\x1b[{color}m{label}\x1b[0m")
    }

    fn rate_label(&self, rate: f64) -> String {
        let rate_str = format!("{rate:5.1}%");
        if !self.colorize {
            return rate_str;
        }
        if rate >= 90.0 {
            format!("\x1b[32m{rate_str}\x1b[0m")
        } else if rate >= 50.0 {
            format!("\x1b[33m{rate_str}\x1b[0m")
        } else {
            format!("\x1b[31m{rate_str}\x1b[0m")
        }
    }

    /// Format a single test result
    pub fn format_result(&self, result: &TestResult) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(result),
            OutputFormat::Csv => format_result_csv("", result),
            OutputFormat::Summary => format!(
                "{} {} ({}ms)",
                result.status.symbol(),
                result.test_id,
                result.duration_ms
            ),
            OutputFormat::Table => {
                let mut line = format!(
                    "{:30} {:12} {:>2}x [{:>6}ms]",
                    result.test_id,
                    self.status_label(result.status),
                    result.attempts,
                    result.duration_ms
                );
                if let Some(fix) = &result.healing_applied {
                    line.push_str(&format!(" healed: {fix}"));
                }
                if let Some(error) = &result.error_message {
                    line.push_str(&format!("\n{:34}{error}", ""));
                }
                line
            }
        }
    }

    /// Format one execution with its results
    pub fn format_execution(&self, execution: &TestExecution) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(execution),
            OutputFormat::Csv => {
                let mut output = String::from(CSV_RESULT_HEADER);
                for result in &execution.results {
                    output.push_str(&format_result_csv(&execution.id, result));
                    output.push('\n');
                }
                output
            }
            OutputFormat::Summary => self.format_execution_brief(execution),
            OutputFormat::Table => self.format_execution_table(execution),
        }
    }

    fn format_execution_brief(&self, execution: &TestExecution) -> String {
        let summary = &execution.summary;
        format!(
            "{} [{}] {}: {}/{} passed ({:.1}%) in {}ms",
            execution.id,
            execution.strategy_id,
            execution.status,
            summary.passed + summary.flaky,
            summary.total,
            summary.pass_rate(),
            execution.duration_ms()
        )
    }

    fn format_execution_table(&self, execution: &TestExecution) -> String {
        let summary = &execution.summary;
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  {:40} {:>19} ║\n",
            execution.id, execution.strategy_id
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for result in &execution.results {
            output.push_str(&format!("  {}\n", self.format_result(result)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!(
            "║  Total: {:3} | Pass: {:3} | Fail: {:3} | Flaky: {:3} | Skip: {:3} ║\n",
            summary.total, summary.passed, summary.failed, summary.flaky, summary.skipped
        ));
        output.push_str(&format!(
            "║  Status: {} | Pass Rate: {} | Healed: {:3} | {:>6}ms\n",
            self.status_label(execution.status),
            self.rate_label(summary.pass_rate()),
            summary.healed,
            execution.duration_ms()
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Format an execution listing, newest first
    pub fn format_history(&self, executions: &[TestExecution]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(executions),
            OutputFormat::Csv => {
                let mut output =
                    String::from("execution_id,strategy_id,status,started_at,total,passed,failed,flaky,skipped,healed\n");
                for e in executions {
                    let s = &e.summary;
                    output.push_str(&format!(
                        "{},{},{},{},{},{},{},{},{},{}\n",
                        e.id,
                        csv_field(&e.strategy_id),
                        e.status,
                        e.started_at.to_rfc3339(),
                        s.total,
                        s.passed,
                        s.failed,
                        s.flaky,
                        s.skipped,
                        s.healed
                    ));
                }
                output
            }
            OutputFormat::Summary => executions
                .iter()
                .map(|e| self.format_execution_brief(e))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Table => {
                if executions.is_empty() {
                    return "No executions recorded.".to_string();
                }
                let mut output = String::new();
                output.push_str(
                    "\n┌──────────────────────────────┬──────────────┬────────────┬─────────────────────┬───────┬──────────┐\n",
                );
                output.push_str(
                    "│ Execution                    │ Strategy     │ Status     │ Started             │ Total │ Rate     │\n",
                );
                output.push_str(
                    "├──────────────────────────────┼──────────────┼────────────┼─────────────────────┼───────┼──────────┤\n",
                );
                for e in executions {
                    output.push_str(&format!(
                        "│ {:28} │ {:12} │ {:10} │ {} │ {:5} │ {:>8} │\n",
                        e.id,
                        e.strategy_id,
                        e.status,
                        e.started_at.format("%Y-%m-%d %H:%M:%S"),
                        e.summary.total,
                        self.rate_label(e.summary.pass_rate())
                    ));
                }
                output.push_str(
                    "└──────────────────────────────┴──────────────┴────────────┴─────────────────────┴───────┴──────────┘\n",
                );
                output
            }
        }
    }

    /// Format failure statistics
    pub fn format_statistics(&self, stats: &FailureStatistics, top: usize) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(stats),
            OutputFormat::Csv => {
                let mut output = String::from("test_id,failures\n");
                for (test_id, count) in stats.top_failing(usize::MAX) {
                    output.push_str(&format!("{},{}\n", csv_field(test_id), count));
                }
                output
            }
            OutputFormat::Summary => format!(
                "Last {} days: {} executions, {} failed, {} test failures ({:.1}%)",
                stats.period_days,
                stats.total_executions,
                stats.failed_executions,
                stats.total_failures,
                stats.failure_rate()
            ),
            OutputFormat::Table => {
                let mut output = String::new();
                output.push_str("\n═══════════════════════════════════════════════════════════════\n");
                output.push_str(&format!(" Failure Statistics (last {} days)\n", stats.period_days));
                output.push_str("═══════════════════════════════════════════════════════════════\n");
                output.push_str(&format!(" Executions:       {}\n", stats.total_executions));
                output.push_str(&format!(" Failed runs:      {}\n", stats.failed_executions));
                output.push_str(&format!(" Tests executed:   {}\n", stats.total_tests));
                output.push_str(&format!(
                    " Test failures:    {} ({})\n",
                    stats.total_failures,
                    self.rate_label(stats.failure_rate()).trim_start()
                ));

                let failing = stats.top_failing(top);
                if !failing.is_empty() {
                    output.push_str("\n Most failing tests:\n");
                    output.push_str(" ───────────────────────────────────────────────────────────\n");
                    let max = failing[0].1.max(1);
                    for (test_id, count) in failing {
                        let bar_len = count * 20 / max;
                        output.push_str(&format!(
                            " {:30} {}{} {}\n",
                            test_id,
                            "█".repeat(bar_len),
                            "░".repeat(20 - bar_len),
                            count
                        ));
                    }
                }
                output
            }
        }
    }

    /// Format known failure patterns
    pub fn format_patterns(&self, patterns: &[FailurePattern]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(patterns),
            OutputFormat::Csv => {
                let mut output =
                    String::from("pattern_id,pattern_type,frequency,affected_tests,last_seen\n");
                for p in patterns {
                    let tests: Vec<&str> = p.affected_tests.iter().map(String::as_str).collect();
                    output.push_str(&format!(
                        "{},{},{},{},{}\n",
                        p.pattern_id,
                        p.pattern_type,
                        p.frequency,
                        csv_field(&tests.join(";")),
                        p.last_seen.to_rfc3339()
                    ));
                }
                output
            }
            OutputFormat::Summary => format!(
                "{} known patterns, {} recorded failures",
                patterns.len(),
                patterns.iter().map(|p| p.frequency).sum::<u64>()
            ),
            OutputFormat::Table => {
                if patterns.is_empty() {
                    return "No failure patterns recorded.".to_string();
                }
                let mut output = String::new();
                output.push_str(
                    "\n┌──────────────────┬─────────────────┬───────────┬───────┬─────────────────────┐\n",
                );
                output.push_str(
                    "│ Pattern          │ Type            │ Frequency │ Tests │ Last seen           │\n",
                );
                output.push_str(
                    "├──────────────────┼─────────────────┼───────────┼───────┼─────────────────────┤\n",
                );
                for p in patterns {
                    output.push_str(&format!(
                        "│ {:16} │ {:15} │ {:>9} │ {:>5} │ {} │\n",
                        p.pattern_id,
                        p.pattern_type.name(),
                        p.frequency,
                        p.affected_tests.len(),
                        p.last_seen.format("%Y-%m-%d %H:%M:%S")
                    ));
                }
                output.push_str(
                    "└──────────────────┴─────────────────┴───────────┴───────┴─────────────────────┘\n",
                );
                output
            }
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

const CSV_RESULT_HEADER: &str = "execution_id,test_id,status,attempts,duration_ms,healed,error\n";

fn format_result_csv(execution_id: &str, result: &TestResult) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        execution_id,
        csv_field(&result.test_id),
        result.status,
        result.attempts,
        result.duration_ms,
        result.healed,
        csv_field(result.error_message.as_deref().unwrap_or(""))
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatternType, TestStatus};
    use chrono::Utc;

    fn execution() -> TestExecution {
        let mut exec = TestExecution::start("exec_1_abcdefghi", "smoke");
        exec.complete(vec![
            TestResult::pending("login").with_status(TestStatus::Passed),
            TestResult::pending("cart")
                .with_status(TestStatus::Failed)
                .with_error("expected 200, got 500", None),
        ]);
        exec
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("json-pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_str("unknown"), None);
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = ResultFormatter::new(OutputFormat::Json).no_color();
        assert_eq!(formatter.format, OutputFormat::Json);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_format_execution_summary() {
        let formatter = ResultFormatter::new(OutputFormat::Summary);
        let output = formatter.format_execution(&execution());
        assert!(output.contains("exec_1_abcdefghi"));
        assert!(output.contains("FAILED"));
        assert!(output.contains("1/2 passed"));
    }

    #[test]
    fn test_format_execution_csv_quotes_errors() {
        let formatter = ResultFormatter::new(OutputFormat::Csv);
        let output = formatter.format_execution(&execution());
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("\"expected 200, got 500\""));
    }

    #[test]
    fn test_format_history_json() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let output = formatter.format_history(&[execution()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["strategy_id"], "smoke");
        assert_eq!(parsed[0]["status"], "FAILED");
    }

    #[test]
    fn test_format_statistics_table() {
        let stats = FailureStatistics::from_history(&[execution()], 7, Utc::now());
        let output = ResultFormatter::new(OutputFormat::Table)
            .no_color()
            .format_statistics(&stats, 5);
        assert!(output.contains("last 7 days"));
        assert!(output.contains("cart"));
    }

    #[test]
    fn test_format_patterns() {
        let pattern = FailurePattern::new("0123456789abcdef", PatternType::Timeout, "sig", "t1");
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let output = formatter.format_patterns(&[pattern]);
        assert!(output.contains("0123456789abcdef"));
        assert!(output.contains("timeout"));
        assert_eq!(
            formatter.format_patterns(&[]),
            "No failure patterns recorded."
        );
    }
}
