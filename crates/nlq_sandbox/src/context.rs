//! The fixed context exposed to guest code (spec.md §4.5) and the
//! cooperative/isolated strategy choice, grounded on
//! `original_source/core/code_executor.py`'s `_can_use_multiprocessing`:
//! a context of plain serializable values can run in a killable worker
//! process, anything else falls back to a cooperative deadline.

use std::collections::BTreeMap;

use nlq_schema::Dataset;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// The guest runs as its own OS process and can be killed outright
    /// on timeout.
    Isolated,
    /// The guest is asked to enforce its own deadline (a daemon thread
    /// join in the shim) and, on expiry, the caller stops waiting but
    /// cannot forcibly reclaim it.
    Cooperative,
}

/// Row cap per dataset materialized into the guest's JSON context.
/// Datasets larger than this fall back to cooperative execution: the
/// context would otherwise have to carry an unbounded JSON blob, which
/// stops looking like "a context of plain serializable values".
const MAX_MATERIALIZED_ROWS: usize = 200_000;

pub struct ExecutionContext {
    pub datasets: BTreeMap<String, JsonValue>,
    pub strategy: ExecutionStrategy,
}

impl ExecutionContext {
    pub fn build(datasets: &[Dataset]) -> Self {
        let mut materialized = BTreeMap::new();
        let mut all_small = true;

        for dataset in datasets {
            if dataset.row_count() > MAX_MATERIALIZED_ROWS {
                all_small = false;
            }
            materialized.insert(
                dataset.name.clone(),
                JsonValue::Array(dataset.table.rows_as_json(None)),
            );
        }

        let strategy = if all_small {
            ExecutionStrategy::Isolated
        } else {
            ExecutionStrategy::Cooperative
        };

        Self {
            datasets: materialized,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    fn small_dataset() -> Dataset {
        let table = Table::new(vec![Column::new(
            "id",
            vec![Value::Integer(1), Value::Integer(2)],
        )]);
        Dataset::profile("orders", "", table)
    }

    #[test]
    fn small_datasets_select_isolated_strategy() {
        let ctx = ExecutionContext::build(&[small_dataset()]);
        assert_eq!(ctx.strategy, ExecutionStrategy::Isolated);
        assert!(ctx.datasets.contains_key("orders"));
    }
}
