//! The shape of a past (question, code) pair the Feedback Store (C9)
//! hands back for grounding. Defined locally rather than depending on
//! `nlq_feedback` directly, so the prompt builder stays usable without
//! pulling in the store's on-disk format.

#[derive(Debug, Clone)]
pub struct FeedbackExample {
    pub question: String,
    pub code: String,
}
