//! Pre-flight checks before starting a command.
//!
//! Validates that the assistant credential is available before starting
//! operations that would otherwise only fail at the first question.

use crate::config::AssistantSettings;
use crate::error::{ReaderError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking a question requires an API key.
    Ask,
    /// Reading works without one; questions fall back to a fixed reply.
    Read,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &AssistantSettings) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Read => check_api_key(settings),
    }
}

/// Check if the OpenAI API key is configured.
///
/// A custom endpoint may not need a key, so a configured `api_base` passes.
fn check_api_key(settings: &AssistantSettings) -> Result<()> {
    if settings.api_base.as_deref().is_some_and(|b| !b.is_empty()) {
        return Ok(());
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ReaderError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(ReaderError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
