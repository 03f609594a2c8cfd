//! The Session/Dataset registry (spec.md §3, §5): each Session holds
//! exactly one Dataset, one SQL engine, and the last question/result/
//! code. A Session is single-writer — callers take its `Mutex` for the
//! duration of one query — while the registry mapping itself is guarded
//! separately so concurrent sessions never block each other's lookup,
//! the same split the teacher uses for its job-cancellation map
//! (`casparian_mcp::jobs::executor::JobExecutorHandle`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nlq_protocol::{Response, SessionId};
use nlq_schema::Dataset;
use nlq_sql::SqlEngine;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::error::EngineError;

/// One uploaded file's working state (spec.md §3).
pub struct Session {
    pub id: SessionId,
    pub dataset: Dataset,
    pub sql_engine: SqlEngine,
    pub last_question: Option<String>,
    pub last_response: Option<Response>,
    pub last_code: Option<String>,
}

impl Session {
    fn new(dataset: Dataset) -> Result<Self, EngineError> {
        let mut sql_engine = SqlEngine::in_memory()?;
        sql_engine.register_dataset(&dataset)?;
        Ok(Self {
            id: SessionId::new(),
            dataset,
            sql_engine,
            last_question: None,
            last_response: None,
            last_code: None,
        })
    }

    /// Record the outcome of a completed query (spec.md §5: updated
    /// atomically at the end of a successful query).
    pub fn record(&mut self, question: String, response: Response, code: String) {
        self.last_question = Some(question);
        self.last_response = Some(response);
        self.last_code = Some(code);
    }
}

/// INVARIANT: `sessions`' lock is held only for map insert/remove/get,
/// never across a query's execution — the per-session `Mutex` inside
/// each `Arc<Mutex<Session>>` is what serializes a single Session's
/// queries (spec.md §5: single-writer Session, no ordering guarantee
/// across Sessions). That per-session lock is `tokio::sync::Mutex`
/// rather than `std::sync::Mutex`: `process_query` holds its guard
/// across the LLM gateway's `.await` points, and a `std::sync::MutexGuard`
/// held there would make the whole future `!Send` and un-spawnable on
/// the multi-thread runtime.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<AsyncMutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a Session around a freshly profiled Dataset and register it.
    pub fn create(&self, dataset: Dataset) -> Result<SessionId, EngineError> {
        let session = Session::new(dataset)?;
        let id = session.id.clone();
        self.sessions.lock().unwrap().insert(id.clone(), Arc::new(AsyncMutex::new(session)));
        info!(session_id = %id, "session created");
        Ok(id)
    }

    pub fn get(&self, id: &SessionId) -> Result<Arc<AsyncMutex<Session>>, EngineError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))
    }

    pub fn close(&self, id: &SessionId) -> bool {
        let removed = self.sessions.lock().unwrap().remove(id).is_some();
        if removed {
            info!(session_id = %id, "session closed");
        }
        removed
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};

    fn dataset() -> Dataset {
        Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Integer(1)])]),
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let registry = SessionRegistry::new();
        let id = registry.create(dataset()).unwrap();
        let session = registry.get(&id).unwrap();
        assert_eq!(session.lock().await.dataset.name, "orders");
    }

    #[test]
    fn get_on_unknown_id_errors() {
        let registry = SessionRegistry::new();
        let err = registry.get(&SessionId::new()).unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
    }

    #[test]
    fn close_removes_the_session() {
        let registry = SessionRegistry::new();
        let id = registry.create(dataset()).unwrap();
        assert!(registry.close(&id));
        assert!(registry.get(&id).is_err());
    }
}
