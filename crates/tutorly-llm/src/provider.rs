//! Provider and job kind identifiers

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable consulted when no provider is given explicitly
pub const PROVIDER_ENV: &str = "PROVIDER";

/// Provider used when neither an argument nor `PROVIDER` is set
pub const DEFAULT_PROVIDER: Provider = Provider::OpenAi;

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions
    OpenAi,
    /// Google Gemini generateContent
    Gemini,
}

impl Provider {
    /// All supported providers
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Gemini];

    /// Stable lowercase identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Safebox entry holding this provider's API key
    #[must_use]
    pub fn secret_name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai_api_key",
            Provider::Gemini => "gemini_api_key",
        }
    }

    /// Resolve the provider from `PROVIDER`, falling back to OpenAI
    ///
    /// # Errors
    /// Returns `UnsupportedProvider` if the variable names an unknown vendor
    pub fn from_env() -> Result<Self> {
        match std::env::var(PROVIDER_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(DEFAULT_PROVIDER),
        }
    }

    /// Explicit name if given, otherwise [`Provider::from_env`]
    ///
    /// # Errors
    /// Returns `UnsupportedProvider` for an unknown vendor name
    pub fn resolve(name: Option<&str>) -> Result<Self> {
        match name {
            Some(name) => name.parse(),
            None => Self::from_env(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "" => Err(Error::UnsupportedProvider("NONE".to_string())),
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Category of request a client can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Single-turn chat completion
    ChatCompletion,
    /// Reserved, no client implements it yet
    TextEmbedding,
}

impl JobKind {
    /// Snake-case identifier used in logs and errors
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::ChatCompletion => "chat_completion",
            JobKind::TextEmbedding => "text_embedding",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chat_completion" => Ok(JobKind::ChatCompletion),
            "text_embedding" => Ok(JobKind::TextEmbedding),
            other => Err(Error::UnsupportedOperation(other.to_string())),
        }
    }
}
