//! Presentation shell: UI-only state for a reading session.
//!
//! Holds the assistant panel visibility, the append-only conversation log,
//! the pending input, the in-flight flag and the active segment. At most one
//! assistant call is in flight at a time.

pub mod input;
pub mod view;

pub use input::ReaderCommand;

use crate::assistant::{AssistantClient, Message};
use crate::content::{ChapterData, TextSegment};
use crate::sync::{ScrollRequest, SyncEngine};
use tracing::debug;

/// A question taken from the input, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuestion {
    pub question: String,
    /// Conversation as it was before the question was appended.
    pub prior_turns: Vec<Message>,
}

/// UI state for one reading session.
pub struct ReaderShell {
    chapter: ChapterData,
    sync: SyncEngine,
    panel_open: bool,
    conversation: Vec<Message>,
    input: String,
    loading: bool,
}

impl ReaderShell {
    /// Create a shell; `greeting` seeds the conversation when not empty.
    pub fn new(chapter: ChapterData, sync: SyncEngine, greeting: &str) -> Self {
        let conversation = if greeting.trim().is_empty() {
            Vec::new()
        } else {
            vec![Message::assistant(greeting)]
        };

        Self {
            chapter,
            sync,
            panel_open: false,
            conversation,
            input: String::new(),
            loading: false,
        }
    }

    pub fn chapter(&self) -> &ChapterData {
        &self.chapter
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn active_id(&self) -> Option<u32> {
        self.sync.active()
    }

    /// The active segment, if any.
    pub fn active_segment(&self) -> Option<&TextSegment> {
        self.sync.active().and_then(|id| self.chapter.segment(id))
    }

    /// Show or hide the assistant panel. Returns the new visibility.
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    /// Replace the pending input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Feed a playback position; returns a scroll request when the active segment changes.
    pub fn on_position(&mut self, time: f64) -> Option<ScrollRequest> {
        self.sync.update(&self.chapter.content, time)
    }

    /// Take the pending input as a question.
    ///
    /// Does nothing while a call is in flight or when the input is blank.
    pub fn begin_send(&mut self) -> Option<PendingQuestion> {
        if self.loading || self.input.trim().is_empty() {
            return None;
        }

        let question = std::mem::take(&mut self.input);
        let prior_turns = self.conversation.clone();

        self.conversation.push(Message::user(question.clone()));
        self.loading = true;
        debug!("Question queued ({} prior turns)", prior_turns.len());

        Some(PendingQuestion {
            question,
            prior_turns,
        })
    }

    /// Append the reply for the in-flight question and clear the loading flag.
    pub fn finish_send(&mut self, reply: String) {
        self.conversation.push(Message::assistant(reply));
        self.loading = false;
    }

    /// Send the pending input and wait for the reply.
    ///
    /// Returns false when the send was a no-op.
    pub async fn send(&mut self, client: &AssistantClient) -> bool {
        let Some(pending) = self.begin_send() else {
            return false;
        };
        let reply = client.ask(&pending.question, &pending.prior_turns).await;
        self.finish_send(reply);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::tests::ScriptedBackend;
    use crate::assistant::{HistoryMode, Role};
    use crate::config::AssistantPrompts;
    use std::sync::Arc;

    fn shell() -> ReaderShell {
        let chapter = ChapterData {
            title: "T".to_string(),
            subtitle: "S".to_string(),
            content: vec![
                TextSegment::new(1, 0.0, "one"),
                TextSegment::new(2, 10.0, "two"),
                TextSegment::new(3, 25.0, "three"),
            ],
        };
        ReaderShell::new(chapter, SyncEngine::default(), "Welcome.")
    }

    fn client(backend: ScriptedBackend) -> AssistantClient {
        let prompts = AssistantPrompts {
            fallback: "Sorry, unavailable.".to_string(),
            ..AssistantPrompts::default()
        };
        AssistantClient::new(Arc::new(backend), &prompts, HistoryMode::Recent(20))
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        let mut shell = shell();
        for blank in ["", "   ", "\t\n"] {
            shell.set_input(blank);
            assert!(shell.begin_send().is_none());
            assert_eq!(shell.conversation().len(), 1);
            assert!(!shell.is_loading());
        }
    }

    #[test]
    fn test_begin_send_appends_question_and_blocks_second_send() {
        let mut shell = shell();
        shell.set_input("Who is Guo Xiang?");

        let pending = shell.begin_send().unwrap();
        assert_eq!(pending.question, "Who is Guo Xiang?");
        assert_eq!(pending.prior_turns, vec![Message::assistant("Welcome.")]);
        assert!(shell.is_loading());
        assert_eq!(shell.input(), "");
        assert_eq!(shell.conversation().len(), 2);

        shell.set_input("Another question");
        assert!(shell.begin_send().is_none());
        assert_eq!(shell.conversation().len(), 2);

        shell.finish_send("An answer".to_string());
        assert!(!shell.is_loading());
        assert_eq!(shell.conversation().last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_failed_call_appends_one_fallback() {
        let mut shell = shell();
        let client = client(ScriptedBackend::failing());
        shell.set_input("Why the cypress?");

        assert!(shell.send(&client).await);

        assert_eq!(shell.conversation().len(), 3);
        assert_eq!(
            shell.conversation()[2],
            Message::assistant("Sorry, unavailable.")
        );
        assert!(!shell.is_loading());
    }

    #[tokio::test]
    async fn test_send_forwards_prior_turns() {
        let backend = Arc::new(ScriptedBackend::replying("Because."));
        let client = AssistantClient::new(
            backend.clone(),
            &AssistantPrompts::default(),
            HistoryMode::Recent(20),
        );
        let mut shell = shell();

        shell.set_input("First?");
        shell.send(&client).await;
        shell.set_input("Second?");
        shell.send(&client).await;

        let requests = backend.requests.lock().unwrap();
        assert_eq!(
            requests[1].1,
            vec![
                Message::user("First?"),
                Message::assistant("Because."),
                Message::user("Second?"),
            ]
        );
    }

    #[test]
    fn test_position_drives_active_segment() {
        let mut shell = shell();
        assert_eq!(shell.on_position(9.9).map(|r| r.segment_id), Some(2));
        assert!(shell.on_position(12.0).is_none());
        assert_eq!(shell.active_segment().map(|s| s.text.as_str()), Some("two"));
    }

    #[test]
    fn test_panel_toggle() {
        let mut shell = shell();
        assert!(!shell.is_panel_open());
        assert!(shell.toggle_panel());
        assert!(!shell.toggle_panel());
    }
}
