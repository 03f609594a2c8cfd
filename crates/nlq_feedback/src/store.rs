//! Feedback Store (C9, spec.md §4.9): two JSON-backed stores on disk,
//! a successful-query cache and a user-feedback log, grounded on
//! `feedback_manager.py` for the semantics and
//! `casparian_mcp::jobs::store::JobStore` for the idiom (atomic file
//! replace behind a process-wide write lock, per spec.md §5).

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info};

use crate::atomic::atomic_write;
use crate::error::FeedbackError;
use crate::similarity::{is_similar, similarity_score};
use crate::types::{SuccessfulQuery, UserFeedback};

const MAX_SIMILAR_RESULTS: usize = 3;

pub struct FeedbackStore {
    cache_file: PathBuf,
    feedback_file: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackStore {
    /// `base_dir` is the parent of the two on-disk stores: successful
    /// queries live under `{base_dir}/query_cache/successful_queries.json`,
    /// user feedback under `{base_dir}/user_feedback/user_feedback.json`
    /// (spec.md §6, "Persisted state on disk").
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, FeedbackError> {
        let base_dir = base_dir.into();
        let cache_dir = base_dir.join("query_cache");
        let feedback_dir = base_dir.join("user_feedback");
        std::fs::create_dir_all(&cache_dir)?;
        std::fs::create_dir_all(&feedback_dir)?;
        let store = Self {
            cache_file: cache_dir.join("successful_queries.json"),
            feedback_file: feedback_dir.join("user_feedback.json"),
            write_lock: Mutex::new(()),
        };
        info!(dir = %base_dir.display(), "feedback store initialized");
        Ok(store)
    }

    pub fn store_successful_query(&self, question: &str, code: &str) -> Result<(), FeedbackError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut cache = self.load_cache()?;
        cache.insert(
            question.trim().to_lowercase(),
            SuccessfulQuery {
                timestamp: Utc::now().timestamp(),
                original_question: question.to_string(),
                code: code.to_string(),
            },
        );
        self.save_cache(&cache)?;
        debug!(question = %question, "stored successful query");
        Ok(())
    }

    pub fn store_user_feedback(&self, question: &str, feedback: &str) -> Result<(), FeedbackError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut feedbacks = self.load_feedback()?;
        feedbacks.push(UserFeedback {
            timestamp: Utc::now().timestamp(),
            question: question.to_string(),
            feedback: feedback.to_string(),
        });
        self.save_feedback(&feedbacks)?;
        debug!(question = %question, "stored user feedback");
        Ok(())
    }

    /// Up to three successful `(question, code)` pairs similar to
    /// `question`, most similar first (spec.md §4.9).
    pub fn similar_successful_queries(&self, question: &str) -> Result<Vec<SuccessfulQuery>, FeedbackError> {
        let cache = self.load_cache()?;
        let mut matches: Vec<(f64, SuccessfulQuery)> = cache
            .into_values()
            .filter(|entry| is_similar(question, &entry.original_question))
            .map(|entry| (similarity_score(question, &entry.original_question), entry))
            .collect();
        matches.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        matches.truncate(MAX_SIMILAR_RESULTS);
        Ok(matches.into_iter().map(|(_, entry)| entry).collect())
    }

    /// User feedback entries relevant to `question`, most recent first.
    pub fn feedback_for_query(&self, question: &str) -> Result<Vec<UserFeedback>, FeedbackError> {
        let mut feedbacks: Vec<UserFeedback> = self
            .load_feedback()?
            .into_iter()
            .filter(|fb| is_similar(question, &fb.question))
            .collect();
        feedbacks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        feedbacks.truncate(MAX_SIMILAR_RESULTS);
        Ok(feedbacks)
    }

    /// Drop records older than `max_age_days`.
    pub fn cleanup(&self, max_age_days: i64) -> Result<(), FeedbackError> {
        let _guard = self.write_lock.lock().unwrap();
        let cutoff = Utc::now().timestamp() - max_age_days * 24 * 60 * 60;

        let cache = self.load_cache()?;
        let before = cache.len();
        let filtered: std::collections::HashMap<String, SuccessfulQuery> = cache
            .into_iter()
            .filter(|(_, entry)| entry.timestamp >= cutoff)
            .collect();
        let dropped_queries = before - filtered.len();
        self.save_cache(&filtered)?;

        let feedbacks = self.load_feedback()?;
        let before = feedbacks.len();
        let filtered_feedback: Vec<UserFeedback> =
            feedbacks.into_iter().filter(|fb| fb.timestamp >= cutoff).collect();
        let dropped_feedback = before - filtered_feedback.len();
        self.save_feedback(&filtered_feedback)?;

        info!(dropped_queries, dropped_feedback, max_age_days, "feedback store cleanup complete");
        Ok(())
    }

    fn load_cache(&self) -> Result<std::collections::HashMap<String, SuccessfulQuery>, FeedbackError> {
        if !self.cache_file.exists() {
            return Ok(Default::default());
        }
        let contents = std::fs::read_to_string(&self.cache_file)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_cache(&self, cache: &std::collections::HashMap<String, SuccessfulQuery>) -> Result<(), FeedbackError> {
        let json = serde_json::to_string_pretty(cache)?;
        atomic_write(&self.cache_file, json.as_bytes())
    }

    fn load_feedback(&self) -> Result<Vec<UserFeedback>, FeedbackError> {
        if !self.feedback_file.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.feedback_file)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save_feedback(&self, feedbacks: &[UserFeedback]) -> Result<(), FeedbackError> {
        let json = serde_json::to_string_pretty(feedbacks)?;
        atomic_write(&self.feedback_file, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stores_and_retrieves_similar_successful_queries() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path()).unwrap();

        store
            .store_successful_query("total sales by region", "result = sql(...)")
            .unwrap();

        let matches = store.similar_successful_queries("total sales by region").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].original_question, "total sales by region");
    }

    #[test]
    fn caps_similar_results_at_three() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path()).unwrap();

        for i in 0..5 {
            store
                .store_successful_query(&format!("total sales by region {}", i), "code")
                .unwrap();
        }

        let matches = store.similar_successful_queries("total sales by region").unwrap();
        assert!(matches.len() <= 3);
    }

    #[test]
    fn user_feedback_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path()).unwrap();

        store.store_user_feedback("total sales", "chart colors were wrong").unwrap();
        let feedbacks = store.feedback_for_query("total sales").unwrap();
        assert_eq!(feedbacks.len(), 1);
        assert_eq!(feedbacks[0].feedback, "chart colors were wrong");
    }

    #[test]
    fn cleanup_drops_old_records() {
        let dir = TempDir::new().unwrap();
        let store = FeedbackStore::new(dir.path()).unwrap();
        store.store_successful_query("old query", "code").unwrap();

        // Force the stored record to look 60 days old, then clean up
        // anything older than 30 days.
        {
            let mut cache = store.load_cache().unwrap();
            for entry in cache.values_mut() {
                entry.timestamp -= 60 * 24 * 60 * 60;
            }
            store.save_cache(&cache).unwrap();
        }

        store.cleanup(30).unwrap();
        assert!(store.load_cache().unwrap().is_empty());
    }
}
