//! Test execution orchestration engine
//!
//! Runs batches of independently defined test cases, learns recurring
//! failure patterns, retries known failures with per-pattern backoff and
//! optionally hands unrecognized failures to a self-healer. Every batch is
//! persisted as one execution record.
//!
//! ```no_run
//! use std::sync::Arc;
//! use test_orchestrator::config::AppConfig;
//! use test_orchestrator::harness::{context_factory, ModuleRegistry, SharedContext};
//! use test_orchestrator::models::TestCase;
//! use test_orchestrator::scheduler::AutonomousRunner;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let registry = ModuleRegistry::new();
//! let mut runner = AutonomousRunner::from_app_config(&AppConfig::default(), Arc::new(registry));
//! let execution = runner
//!     .run_strategy(
//!         "smoke",
//!         vec![TestCase::new("login", "auth::login", "auth")],
//!         context_factory(SharedContext::new),
//!         None,
//!     )
//!     .await?;
//! println!("{execution}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod models;
pub mod output;
pub mod patterns;
pub mod results;
pub mod scheduler;
pub mod utils;

pub use config::{AppConfig, OrchestratorConfig};
pub use error::{OrchestratorError, Result};
pub use executor::TestExecutor;
pub use models::{TestCase, TestExecution, TestResult, TestStatus};
pub use patterns::FailurePatternStore;
pub use scheduler::AutonomousRunner;
