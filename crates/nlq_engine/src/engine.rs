//! The Analysis Engine facade (C10, spec.md §4.10): wires every other
//! crate together behind one `process_query` entry point and owns the
//! Session registry.

use std::sync::Arc;

use nlq_altflow::{classify_error, missing_table_response, offer_predefined_options, pre_query_check, rephrase_query};
use nlq_feedback::FeedbackStore;
use nlq_llm::{LlmGateway, LlmProvider};
use nlq_prompt::{FeedbackExample, PromptBuilder};
use nlq_protocol::{parse_response, ErrorKind, RawResult, Response, SessionId};
use nlq_sandbox::{ExecutionContext, SandboxConfig, SandboxExecutor, SandboxOutcome, SqlBridge};
use nlq_schema::{Dataset, SemanticType};
use nlq_sql::SqlEngine;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::session::{Session, SessionRegistry};
use crate::viz::annotate_chart_type;

/// Answers `sql()` calls made from inside one session's guest process
/// by running them against that session's own [`SqlEngine`] (spec.md
/// §4.5: one engine per session, so this bridge is built fresh for
/// every query rather than shared across sessions).
struct SessionSqlBridge<'a> {
    engine: &'a SqlEngine,
    row_cap: usize,
}

impl SqlBridge for SessionSqlBridge<'_> {
    fn query(&self, sql: &str) -> Result<Vec<JsonValue>, String> {
        let result = self.engine.query(sql, self.row_cap).map_err(|e| e.to_string())?;
        Ok(result
            .rows
            .into_iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (name, value) in result.columns.iter().zip(row) {
                    obj.insert(name.clone(), value.to_json());
                }
                JsonValue::Object(obj)
            })
            .collect())
    }
}

pub struct AnalysisEngine {
    config: EngineConfig,
    llm_provider: Arc<dyn LlmProvider>,
    llm_gateway: LlmGateway,
    feedback: FeedbackStore,
    sessions: SessionRegistry,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let feedback = FeedbackStore::new(config.feedback_dir.clone())?;
        let llm_provider = config.build_llm_provider();
        let llm_gateway = LlmGateway::new(llm_provider.clone());
        Ok(Self {
            config,
            llm_provider,
            llm_gateway,
            feedback,
            sessions: SessionRegistry::new(),
        })
    }

    pub fn create_session(&self, dataset: Dataset) -> Result<SessionId, EngineError> {
        self.sessions.create(dataset)
    }

    pub fn close_session(&self, id: &SessionId) -> bool {
        self.sessions.close(id)
    }

    pub fn store_user_feedback(&self, question: &str, feedback: &str) -> Result<(), EngineError> {
        Ok(self.feedback.store_user_feedback(question, feedback)?)
    }

    /// A one-paragraph natural-language gloss of `response`, for the
    /// `analysis` field of the HTTP result shape (spec.md §6).
    pub async fn narrate(&self, response: &Response, question: &str) -> String {
        crate::narrate::generate_analysis(response, question, Some(self.llm_provider.as_ref())).await
    }

    /// Runs the full sanitize -> prompt -> generate -> execute ->
    /// parse loop for one question against one session, retrying via
    /// rephrase up to `config.max_retries` times before falling back to
    /// predefined suggestions (spec.md §4.10).
    pub async fn process_query(&self, session_id: &SessionId, question: &str) -> Result<Response, EngineError> {
        let session_lock = self.sessions.get(session_id)?;
        // Held for the whole call: a Session is single-writer, so a
        // second concurrent query against the same session simply
        // waits its turn rather than racing the SQL engine underneath.
        let mut session = session_lock.lock().await;

        let sanitized = crate::sanitize::sanitize_query(question);
        let datasets = std::slice::from_ref(&session.dataset);

        if let Some(text) = pre_query_check(&sanitized, datasets) {
            let response = Response::Text(text);
            session.record(question.to_string(), response.clone(), String::new());
            return Ok(response);
        }

        let mut current_question = sanitized;
        let mut last_error = String::new();
        let mut last_code = String::new();

        for attempt in 0..=self.config.max_retries {
            let examples = self.feedback_examples(&current_question)?;
            let prompt = PromptBuilder::build(&current_question, datasets, &examples);
            let code = self
                .llm_gateway
                .generate(&prompt.system, &prompt.user, &current_question, datasets)
                .await;
            last_code = code.clone();

            match self.run_once(&session, &code) {
                Ok(mut response) => {
                    if let Response::Chart(chart) = &mut response {
                        let is_time_series = looks_like_time_series(&session.dataset);
                        annotate_chart_type(chart, question, is_time_series);
                    }
                    if !response.is_error() {
                        self.feedback.store_successful_query(question, &code)?;
                    }
                    session.record(question.to_string(), response.clone(), code);
                    return Ok(response);
                }
                Err(message) => {
                    last_error = message;
                    warn!(attempt, error = %last_error, "query attempt failed");

                    let kind = classify_error(&last_error);
                    if kind == ErrorKind::TableNotFound {
                        let text = missing_table_response(&last_error, datasets);
                        let response = Response::Text(text);
                        session.record(question.to_string(), response.clone(), code);
                        return Ok(response);
                    }
                    if !kind.is_retryable() || attempt == self.config.max_retries {
                        break;
                    }
                    current_question =
                        rephrase_query(&current_question, &last_error, datasets, Some(self.llm_provider.as_ref())).await;
                }
            }
        }

        let suggestions = offer_predefined_options(question, &last_error, datasets);
        let response = Response::error(ErrorKind::ExhaustedRetries, suggestions, Some(last_code.clone()));
        session.record(question.to_string(), response.clone(), last_code);
        Ok(response)
    }

    fn feedback_examples(&self, question: &str) -> Result<Vec<FeedbackExample>, EngineError> {
        Ok(self
            .feedback
            .similar_successful_queries(question)?
            .into_iter()
            .map(|q| FeedbackExample {
                question: q.original_question,
                code: q.code,
            })
            .collect())
    }

    /// Execute one piece of generated code against `session` and parse
    /// its capture into a [`Response`]. `Err` carries the raw error
    /// message for classification by the caller.
    fn run_once(&self, session: &Session, code: &str) -> Result<Response, String> {
        let bridge: Arc<dyn SqlBridge> = Arc::new(SessionSqlBridge {
            engine: &session.sql_engine,
            row_cap: self.config.table_row_cap,
        });
        let sandbox_config = SandboxConfig {
            timeout: self.config.code_timeout,
            stdout_cap_bytes: self.config.stdout_cap_bytes,
            ..SandboxConfig::default()
        };
        let executor = SandboxExecutor::new(sandbox_config, bridge);
        let context = ExecutionContext::build(std::slice::from_ref(&session.dataset));

        let outcome: SandboxOutcome = executor.execute(code, &context).map_err(|e| e.to_string())?;

        let capture = outcome
            .capture
            .ok_or_else(|| "generated code produced no result".to_string())?;
        let raw: RawResult = serde_json::from_value(capture).map_err(|e| e.to_string())?;
        let response = parse_response(&raw).map_err(|e| e.to_string())?;
        Ok(normalize_table_cap(response, self.config.table_row_cap))
    }
}

/// Apply the transport row cap to a freshly parsed `Table` response
/// (spec.md §6); other variants pass through unchanged.
fn normalize_table_cap(response: Response, row_cap: usize) -> Response {
    match response {
        Response::Table(table) if table.rows.len() > row_cap => {
            Response::Table(nlq_protocol::TableResult::capped(table.rows))
        }
        other => other,
    }
}

/// Heuristic time-series signal for chart auto-selection: any loaded
/// column typed as a date/datetime (spec.md §6 auto-selection rule).
fn looks_like_time_series(dataset: &Dataset) -> bool {
    dataset
        .columns
        .iter()
        .any(|c| matches!(c.semantic_type, SemanticType::Date | SemanticType::DateTime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlq_protocol::Value;
    use nlq_schema::{Column, Table};
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        Dataset::profile(
            "orders",
            "",
            Table::new(vec![Column::new("id", vec![Value::Integer(1), Value::Integer(2)])]),
        )
    }

    fn engine(feedback_dir: &std::path::Path) -> AnalysisEngine {
        let config = EngineConfig {
            feedback_dir: feedback_dir.to_path_buf(),
            ..EngineConfig::default()
        };
        AnalysisEngine::new(config).unwrap()
    }

    #[test]
    fn create_and_close_session_round_trips() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());
        let id = engine.create_session(dataset()).unwrap();
        assert!(engine.close_session(&id));
        assert!(!engine.close_session(&id));
    }

    #[tokio::test]
    async fn process_query_on_unknown_session_errors() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());
        let err = engine.process_query(&SessionId::new(), "total sales").await.unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn pre_query_check_short_circuits_before_the_sandbox_runs() {
        let dir = TempDir::new().unwrap();
        let engine = engine(dir.path());
        let id = engine.create_session(dataset()).unwrap();
        let response = engine.process_query(&id, "how many employees do we have?").await.unwrap();
        match response {
            Response::Text(text) => assert!(text.contains("employees")),
            other => panic!("expected a Text response, got {:?}", other),
        }
    }
}
