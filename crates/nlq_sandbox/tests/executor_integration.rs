//! End-to-end sandbox tests that spawn a real `python3` guest process,
//! mirroring `casparian_worker`'s `bridge_stability.rs` style of test
//! (exercise the actual subprocess protocol, not a mock).

use std::sync::Arc;
use std::time::Duration;

use nlq_sandbox::{
    ExecutionContext, ExecutionStrategy, NoSqlBridge, SandboxConfig, SandboxExecutor, SandboxState,
};
use nlq_schema::Dataset;

fn empty_context() -> ExecutionContext {
    ExecutionContext {
        datasets: Default::default(),
        strategy: ExecutionStrategy::Isolated,
    }
}

fn config() -> SandboxConfig {
    SandboxConfig {
        timeout: Duration::from_secs(5),
        ..SandboxConfig::default()
    }
}

#[test]
fn executes_simple_scalar_result() {
    let executor = SandboxExecutor::new(config(), Arc::new(NoSqlBridge));
    let outcome = executor
        .execute("result = 1 + 1", &empty_context())
        .unwrap();
    assert_eq!(outcome.state, SandboxState::Done);
    assert_eq!(
        outcome.capture,
        Some(serde_json::json!({"type": "scalar", "value": 2}))
    );
}

#[test]
fn rejects_disallowed_import_before_spawning() {
    let executor = SandboxExecutor::new(config(), Arc::new(NoSqlBridge));
    let outcome = executor.execute("import os\nresult = 1", &empty_context());
    assert!(outcome.is_err());
}

#[test]
fn times_out_on_infinite_loop() {
    let mut cfg = config();
    cfg.timeout = Duration::from_millis(500);
    let executor = SandboxExecutor::new(cfg, Arc::new(NoSqlBridge));
    let outcome = executor.execute("while True:\n    pass", &empty_context());
    assert!(outcome.is_err());
}

#[test]
fn exposes_loaded_datasets_by_name() {
    let dataset = Dataset::profile(
        "orders",
        "",
        nlq_schema::Table::new(vec![nlq_schema::Column::new(
            "id",
            vec![nlq_protocol::Value::Integer(1), nlq_protocol::Value::Integer(2)],
        )]),
    );
    let context = ExecutionContext::build(&[dataset]);

    let executor = SandboxExecutor::new(config(), Arc::new(NoSqlBridge));
    let outcome = executor
        .execute("result = len(orders)", &context)
        .unwrap();
    assert_eq!(
        outcome.capture,
        Some(serde_json::json!({"type": "scalar", "value": 2}))
    );
}
