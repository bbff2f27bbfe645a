//! Execution history persistence
//!
//! One JSON record per completed execution, with listing and export helpers.

mod storage;

pub use storage::{generate_execution_id, ExecutionInfo, ExecutionStorage, ExportFormat};
