//! Test Orchestrator CLI
//!
//! Inspects what the orchestration engine has recorded: execution history,
//! failure statistics and the learned failure patterns that drive retries.
//!
//! ## Usage
//!
//! ```bash
//! # Recent executions of one strategy
//! test-orchestrator history --strategy smoke --limit 10
//!
//! # Latest execution, exported as CSV
//! test-orchestrator show --export latest.csv
//!
//! # Most failing tests over the last 30 days
//! test-orchestrator stats --days 30
//!
//! # Learned failure patterns
//! test-orchestrator patterns --format json-pretty
//!
//! # Write a default configuration file
//! test-orchestrator config init ./test-orchestrator.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

mod cli;

use cli::Args;
use test_orchestrator::config::{print_env_help, AppConfig, EnvConfig};
use test_orchestrator::harness::ModuleRegistry;
use test_orchestrator::output::{OutputFormat, ResultFormatter};
use test_orchestrator::results::ExportFormat;
use test_orchestrator::scheduler::AutonomousRunner;
use test_orchestrator::utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let app = resolve_config(&args)?;

    let level = LogLevel::from_str(&app.log_level)
        .unwrap_or_default()
        .raised_by(args.verbose);
    init_logger(level);
    debug!("Using data directory {}", app.data_dir.display());

    match args.command {
        cli::Command::History(history_args) => show_history(&app, history_args)?,
        cli::Command::Show(show_args) => show_execution(&app, show_args)?,
        cli::Command::Stats(stats_args) => show_stats(&app, stats_args)?,
        cli::Command::Patterns(patterns_args) => show_patterns(&app, patterns_args),
        cli::Command::Config(config_args) => manage_config(&app, config_args)?,
    }

    Ok(())
}

/// File, then environment, then command-line flags
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let env = EnvConfig::load();

    let mut app = match args.config.as_ref().or(env.config_file.as_ref()) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    env.apply(&mut app);

    if let Some(dir) = &args.data_dir {
        app.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &args.log_level {
        app.log_level = level.clone();
    }

    app.validate()?;
    Ok(app)
}

fn formatter(format: &str) -> ResultFormatter {
    ResultFormatter::new(OutputFormat::from_str(format).unwrap_or(OutputFormat::Table))
}

/// Runner over the configured data directory; the CLI never executes tests
fn query_runner(app: &AppConfig) -> Result<AutonomousRunner> {
    let mut runner = AutonomousRunner::from_app_config(app, Arc::new(ModuleRegistry::new()));
    runner.load_history()?;
    Ok(runner)
}

fn show_history(app: &AppConfig, args: cli::HistoryArgs) -> Result<()> {
    let runner = query_runner(app)?;
    let executions = runner.execution_history(args.limit, args.strategy.as_deref());
    println!("{}", formatter(&args.format).format_history(&executions));
    Ok(())
}

fn show_execution(app: &AppConfig, args: cli::ShowArgs) -> Result<()> {
    let runner = AutonomousRunner::from_app_config(app, Arc::new(ModuleRegistry::new()));
    let storage = runner.storage();

    let execution = match &args.id {
        Some(id) => storage.load(id)?,
        None => storage
            .latest()?
            .context("No executions recorded yet")?,
    };

    if let Some(export) = &args.export {
        let path = Path::new(export);
        let format = ExportFormat::from_extension(path)
            .with_context(|| format!("Cannot infer export format from {export} (use .json or .csv)"))?;
        storage.export(&execution, path, format)?;
        println!("✓ Exported {} to {}", execution.id, export);
    } else {
        println!("{}", formatter(&args.format).format_execution(&execution));
    }
    Ok(())
}

fn show_stats(app: &AppConfig, args: cli::StatsArgs) -> Result<()> {
    if args.days <= 0 {
        anyhow::bail!("--days must be positive");
    }
    let runner = query_runner(app)?;
    let stats = runner.failure_statistics(args.days);
    println!("{}", formatter(&args.format).format_statistics(&stats, args.top));
    Ok(())
}

fn show_patterns(app: &AppConfig, args: cli::PatternsArgs) {
    let runner = AutonomousRunner::from_app_config(app, Arc::new(ModuleRegistry::new()));
    let mut patterns = runner.store().patterns();
    if let Some(limit) = args.limit {
        patterns.truncate(limit);
    }
    println!("{}", formatter(&args.format).format_patterns(&patterns));
}

fn manage_config(app: &AppConfig, args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            AppConfig::default().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                print_env_help();
            } else {
                let output = if format == "json" {
                    serde_json::to_string_pretty(app)?
                } else {
                    serde_yaml::to_string(app)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file
                .map(PathBuf::from)
                .or_else(AppConfig::find)
                .context("No configuration file found")?;

            match AppConfig::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {}", path.display());
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {}", path.display());
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
