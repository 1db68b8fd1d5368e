//! Error taxonomy for the chat engine.
//!
//! Every variant is contained before it reaches the user: a failed corpus
//! load degrades to an empty corpus, a failed enrichment drops one review
//! block, and anything else in a session turns into the apology message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Employee or department list could not be fetched.
    #[error("corpus unavailable: {0}")]
    DataUnavailable(String),

    /// Performance history for one matched employee could not be fetched.
    #[error("performance history unavailable for employee {employee_id}: {reason}")]
    EnrichmentUnavailable { employee_id: String, reason: String },

    /// Reply text could not be written, e.g. a date pattern chrono rejects.
    #[error("failed to assemble response: {0}")]
    SynthesisFailure(String),

    /// Non-success HTTP status, with the response body.
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<std::fmt::Error> for ChatError {
    fn from(e: std::fmt::Error) -> Self {
        ChatError::SynthesisFailure(e.to_string())
    }
}
