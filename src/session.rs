//! Chat session: the corpus, the transcript, and the submission guard.
//!
//! ```text
//!   Idle ──submit(non-blank)──▶ AwaitingResponse ──reply appended──▶ Idle
//! ```
//!
//! Blank input, or input arriving while a reply is in flight, is ignored.
//! The transcript only grows.

use chrono::Utc;

use crate::client::PerformanceApi;
use crate::config::ChatConfig;
use crate::corpus;
use crate::models::{ChatMessage, Corpus, Sender};
use crate::respond::{respond, ResponseOptions};

/// Bot reply when synthesis fails outright.
pub const APOLOGY_RESPONSE: &str = "Sorry, I encountered an error while processing your \
request. Please make sure the backend server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A submission is being answered; further input is ignored.
    AwaitingResponse,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub greeting: String,
    pub response: ResponseOptions,
}

impl From<&ChatConfig> for SessionOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            greeting: config.greeting.clone(),
            response: ResponseOptions {
                date_format: config.date_format.clone(),
            },
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

/// One conversation: the corpus it answers from, its transcript, and whether
/// a reply is being built.
///
/// Owns its backend handle so several sessions can coexist in one process.
pub struct ChatSession {
    api: Box<dyn PerformanceApi>,
    corpus: Corpus,
    transcript: Vec<ChatMessage>,
    state: SessionState,
    options: SessionOptions,
    last_id: u64,
}

impl ChatSession {
    /// New session with an empty corpus and the greeting as its first message.
    pub fn new(api: Box<dyn PerformanceApi>, options: SessionOptions) -> Self {
        let mut session = Self {
            api,
            corpus: Corpus::empty(),
            transcript: Vec::new(),
            state: SessionState::Idle,
            options,
            last_id: 0,
        };
        let greeting = session.options.greeting.clone();
        session.push(greeting, Sender::Bot);
        session
    }

    /// [`ChatSession::new`] followed by the initial corpus load.
    pub async fn start(api: Box<dyn PerformanceApi>, options: SessionOptions) -> Self {
        let mut session = Self::new(api, options);
        session.reload().await;
        session
    }

    /// Replace the corpus with a fresh snapshot, or an empty one if the load fails.
    pub async fn reload(&mut self) {
        self.corpus = corpus::load_or_empty(self.api.as_ref()).await;
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Submit user input and append the bot's reply.
    ///
    /// Returns the reply, or `None` if the input was ignored.
    pub async fn submit(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() || self.state == SessionState::AwaitingResponse {
            return None;
        }

        self.push(input.to_string(), Sender::User);
        self.state = SessionState::AwaitingResponse;

        let reply = match respond(
            input,
            &self.corpus,
            self.api.as_ref(),
            &self.options.response,
        )
        .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "response synthesis failed");
                APOLOGY_RESPONSE.to_string()
            }
        };

        self.push(reply, Sender::Bot);
        self.state = SessionState::Idle;
        self.transcript.last()
    }

    fn push(&mut self, text: String, sender: Sender) {
        let timestamp = Utc::now();
        let millis = u64::try_from(timestamp.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        self.transcript.push(ChatMessage {
            id,
            text,
            sender,
            timestamp,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respond::FALLBACK_RESPONSE;
    use crate::testing::{engineering, john_doe, FakeApi};

    fn options() -> SessionOptions {
        SessionOptions::default()
    }

    #[tokio::test]
    async fn test_new_session_greets() {
        let session = ChatSession::new(Box::new(FakeApi::new(vec![], vec![])), options());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].sender, Sender::Bot);
        assert!(session.transcript()[0].text.starts_with("Hello!"));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_appends_user_and_bot() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]);
        let mut session = ChatSession::start(Box::new(api), options()).await;
        assert_eq!(session.corpus().employees.len(), 1);

        let reply = session.submit("Tell me about John Doe").await.unwrap();
        assert_eq!(reply.sender, Sender::Bot);
        assert!(reply.text.starts_with("**John Doe** (Senior Developer)"));

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].sender, Sender::User);
        assert_eq!(transcript[1].text, "Tell me about John Doe");
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut session = ChatSession::new(Box::new(FakeApi::new(vec![], vec![])), options());
        assert!(session.submit("").await.is_none());
        assert!(session.submit("   \n\t").await.is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_submission_is_ignored() {
        let mut session = ChatSession::new(Box::new(FakeApi::new(vec![], vec![])), options());
        session.state = SessionState::AwaitingResponse;
        assert!(session.submit("hello").await.is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_degrades_to_fallback() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]).fail_employees();
        let mut session = ChatSession::start(Box::new(api), options()).await;
        assert!(session.corpus().is_empty());

        let reply = session.submit("Tell me about John Doe").await.unwrap();
        assert_eq!(reply.text, FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_synthesis_failure_becomes_apology() {
        let api = FakeApi::new(vec![john_doe()], vec![]);
        let mut opts = options();
        opts.response.date_format = "%Q".to_string();
        let mut session = ChatSession::start(Box::new(api), opts).await;

        let reply = session.submit("john doe").await.unwrap();
        assert_eq!(reply.text, APOLOGY_RESPONSE);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_message_ids_strictly_increase() {
        let mut session = ChatSession::new(Box::new(FakeApi::new(vec![], vec![])), options());
        for q in ["a", "b", "c"] {
            session.submit(q).await;
        }
        let ids: Vec<u64> = session.transcript().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 7);
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {:?}", ids);
    }

    #[tokio::test]
    async fn test_reload_replaces_corpus() {
        let api = FakeApi::new(vec![john_doe()], vec![engineering()]);
        let mut session = ChatSession::new(Box::new(api), options());
        assert!(session.corpus().is_empty());
        session.reload().await;
        assert_eq!(session.corpus().departments.len(), 1);
        session.reload().await;
        assert_eq!(session.corpus().departments.len(), 1);
    }
}
