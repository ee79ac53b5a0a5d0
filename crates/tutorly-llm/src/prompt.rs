//! Prompt - instructions plus body text sent to a provider

use serde::{Deserialize, Serialize};

/// A single-turn prompt
///
/// `instructions` maps to the system role (OpenAI) or the system instruction
/// (Gemini); `body` is the user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    instructions: Option<String>,
    body: String,
}

impl Prompt {
    /// Create a prompt without instructions
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            instructions: None,
            body: body.into(),
        }
    }

    /// Attach instructions
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Instructions, if any
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Body text
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}
