//! Analysis Engine (C10): the facade that ties the Response Taxonomy,
//! Dataset/Schema, Connector Layer, SQL Dialect Adapter, Sandboxed Code
//! Executor, Prompt Builder, LLM Gateway, Alternative Flow and Feedback
//! Store crates together behind one `process_query` entry point, plus
//! the Session/Dataset registry those calls run against (spec.md §3,
//! §4.10, §5).

pub mod config;
pub mod engine;
pub mod error;
pub mod narrate;
pub mod sanitize;
pub mod session;
pub mod viz;

pub use config::EngineConfig;
pub use engine::AnalysisEngine;
pub use error::EngineError;
pub use session::{Session, SessionRegistry};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "nlq_engine=info,nlq_sandbox=info,nlq_llm=info";

/// Initialize tracing for the demo CLI: a single stderr layer filtered
/// by `RUST_LOG`, falling back to a sane per-crate default (mirrors
/// `casparian_logging::init_logging`'s filter-selection, minus the
/// rolling file writer a one-shot CLI invocation has no use for).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .try_init();
}
