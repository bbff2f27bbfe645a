//! Collaborator seams for the engine
//!
//! Test modules, the loader that resolves them, per-attempt contexts, and the
//! self-healing hook. Implementations live outside the engine.

mod context;
mod healer;
mod runnable;

pub use context::{context_factory, ContextFactory, ExecutionContext, SharedContext};
pub use healer::SelfHealer;
pub use runnable::{ModuleLoader, ModuleRegistry, TestFailure, TestRunnable};
