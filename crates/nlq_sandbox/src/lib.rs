//! Sandboxed Code Executor (C5): validates LLM-generated code against
//! an import allow-list, runs it in a Python guest process with a
//! wall-clock deadline, and captures its `{type, value}` result
//! (spec.md §4.5).

pub mod context;
pub mod error;
pub mod executor;
pub mod policy;
pub mod protocol;
pub mod sql_bridge;
pub mod state;

pub use context::{ExecutionContext, ExecutionStrategy};
pub use error::SandboxError;
pub use executor::{SandboxConfig, SandboxExecutor};
pub use sql_bridge::{NoSqlBridge, SqlBridge};
pub use state::{SandboxOutcome, SandboxState};
