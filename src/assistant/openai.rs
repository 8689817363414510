//! OpenAI-compatible chat completion backend.

use super::{ChatBackend, Message, Role};
use crate::config::AssistantSettings;
use crate::error::{ReaderError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

/// Chat backend using the OpenAI chat completions API.
pub struct OpenAIChatBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatBackend {
    /// Create a backend from assistant settings.
    pub fn new(settings: &AssistantSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
        let built: ChatCompletionRequestMessage = match message.role {
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| ReaderError::Assistant(e.to_string()))?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()
                .map_err(|e| ReaderError::Assistant(e.to_string()))?
                .into(),
        };
        Ok(built)
    }
}

#[async_trait]
impl ChatBackend for OpenAIChatBackend {
    async fn complete(&self, system: &str, turns: &[Message]) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| ReaderError::Assistant(e.to_string()))?
                .into(),
        ];
        for turn in turns {
            messages.push(Self::to_request_message(turn)?);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ReaderError::Assistant(e.to_string()))?;

        debug!("Requesting completion from {}", self.model);

        let response = self.client.chat().create(request).await.map_err(|e| {
            ReaderError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(answer)
    }
}
