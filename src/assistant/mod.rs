//! Reading assistant: questions about the chapter answered by a hosted model.
//!
//! [`AssistantClient::ask`] never fails. Transport or service errors turn into
//! a fixed fallback reply so callers can append whatever comes back.

mod openai;

pub use openai::OpenAIChatBackend;

use crate::config::{AssistantPrompts, AssistantSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A hosted text-generation endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Complete a conversation. `turns` ends with the new user question.
    async fn complete(&self, system: &str, turns: &[Message]) -> Result<String>;
}

/// How much conversation history goes upstream with each question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Every call stands alone.
    None,
    /// Forward up to this many of the most recent turns.
    Recent(usize),
}

impl HistoryMode {
    /// The mode configured in the `[assistant]` section.
    pub fn from_settings(settings: &AssistantSettings) -> Self {
        if settings.send_history {
            Self::Recent(settings.max_history_messages)
        } else {
            Self::None
        }
    }
}

/// Stateless request/response wrapper around a [`ChatBackend`].
#[derive(Clone)]
pub struct AssistantClient {
    backend: Arc<dyn ChatBackend>,
    system_prompt: String,
    fallback: String,
    empty_reply: String,
    history: HistoryMode,
}

impl AssistantClient {
    /// Create a client with rendered prompts.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        prompts: &AssistantPrompts,
        history: HistoryMode,
    ) -> Self {
        Self {
            backend,
            system_prompt: prompts.system.clone(),
            fallback: prompts.fallback.clone(),
            empty_reply: prompts.empty_reply.clone(),
            history,
        }
    }

    /// Ask a question, with the conversation so far.
    ///
    /// Each call starts a fresh context seeded with the system prompt. Prior
    /// turns are forwarded according to the history mode.
    #[instrument(skip(self, question, prior_turns), fields(question = %question, prior = prior_turns.len()))]
    pub async fn ask(&self, question: &str, prior_turns: &[Message]) -> String {
        let turns = self.build_turns(question, prior_turns);
        debug!("Sending {} turns to the assistant backend", turns.len());

        match self.backend.complete(&self.system_prompt, &turns).await {
            Ok(reply) if reply.trim().is_empty() => {
                warn!("Assistant returned an empty reply");
                self.empty_reply.clone()
            }
            Ok(reply) => {
                info!("Assistant replied ({} chars)", reply.chars().count());
                reply
            }
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                self.fallback.clone()
            }
        }
    }

    /// Owned variant of [`ask`](Self::ask) for callers holding the future across turns.
    pub async fn ask_owned(self, question: String, prior_turns: Vec<Message>) -> String {
        self.ask(&question, &prior_turns).await
    }

    fn build_turns(&self, question: &str, prior_turns: &[Message]) -> Vec<Message> {
        let mut turns: Vec<Message> = match self.history {
            HistoryMode::None => Vec::new(),
            HistoryMode::Recent(max) => {
                let start = prior_turns.len().saturating_sub(max);
                prior_turns[start..].to_vec()
            }
        };

        // Some endpoints reject a history that opens with the model speaking.
        while turns.first().is_some_and(|m| m.role == Role::Assistant) {
            turns.remove(0);
        }

        turns.push(Message::user(question));
        turns
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ReaderError;
    use std::sync::Mutex;

    /// Backend returning a canned reply (or an error) and recording requests.
    #[derive(Default)]
    pub(crate) struct ScriptedBackend {
        pub reply: Option<String>,
        pub requests: Mutex<Vec<(String, Vec<Message>)>>,
    }

    impl ScriptedBackend {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, system: &str, turns: &[Message]) -> Result<String> {
            self.requests
                .lock()
                .unwrap()
                .push((system.to_string(), turns.to_vec()));
            self.reply
                .clone()
                .ok_or_else(|| ReaderError::OpenAI("connection refused".to_string()))
        }
    }

    fn prompts() -> AssistantPrompts {
        AssistantPrompts {
            system: "You analyse the chapter.".to_string(),
            greeting: "Hello.".to_string(),
            fallback: "Assistant unavailable.".to_string(),
            empty_reply: "No response.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ask_returns_reply_with_fresh_system_prompt() {
        let backend = Arc::new(ScriptedBackend::replying("She is grieving."));
        let client = AssistantClient::new(backend.clone(), &prompts(), HistoryMode::Recent(20));

        let reply = client.ask("How does Guo Xiang feel?", &[]).await;

        assert_eq!(reply, "She is grieving.");
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "You analyse the chapter.");
        assert_eq!(requests[0].1, vec![Message::user("How does Guo Xiang feel?")]);
    }

    #[tokio::test]
    async fn test_ask_failure_returns_fallback() {
        let client = AssistantClient::new(
            Arc::new(ScriptedBackend::failing()),
            &prompts(),
            HistoryMode::None,
        );
        assert_eq!(client.ask("Why?", &[]).await, "Assistant unavailable.");
    }

    #[tokio::test]
    async fn test_empty_reply_uses_no_response_text() {
        let client = AssistantClient::new(
            Arc::new(ScriptedBackend::replying("  ")),
            &prompts(),
            HistoryMode::None,
        );
        assert_eq!(client.ask("Why?", &[]).await, "No response.");
    }

    #[tokio::test]
    async fn test_history_is_forwarded_and_trimmed() {
        let backend = Arc::new(ScriptedBackend::replying("ok"));
        let client = AssistantClient::new(backend.clone(), &prompts(), HistoryMode::Recent(3));

        let prior = vec![
            Message::assistant("Hello."),
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
            Message::assistant("a2"),
        ];
        client.ask("q3", &prior).await;

        let requests = backend.requests.lock().unwrap();
        // The last three turns start with an assistant message, which is dropped.
        assert_eq!(
            requests[0].1,
            vec![Message::user("q2"), Message::assistant("a2"), Message::user("q3")]
        );
    }

    #[tokio::test]
    async fn test_history_disabled_sends_question_only() {
        let backend = Arc::new(ScriptedBackend::replying("ok"));
        let client = AssistantClient::new(backend.clone(), &prompts(), HistoryMode::None);

        client
            .ask_owned("q2".to_string(), vec![Message::user("q1"), Message::assistant("a1")])
            .await;

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].1, vec![Message::user("q2")]);
    }

    #[test]
    fn test_history_mode_follows_settings() {
        let mut settings = AssistantSettings::default();
        assert_eq!(HistoryMode::from_settings(&settings), HistoryMode::Recent(20));

        settings.max_history_messages = 4;
        assert_eq!(HistoryMode::from_settings(&settings), HistoryMode::Recent(4));

        settings.send_history = false;
        assert_eq!(HistoryMode::from_settings(&settings), HistoryMode::None);
    }

    #[test]
    fn test_role_accepts_model_alias() {
        let msg: Message = serde_json::from_str(r#"{"role":"model","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        let json = serde_json::to_string(&Message::user("x")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
