//! Runtime provider selection
//!
//! [`LlmClient`] wraps the concrete backends so callers can pick a vendor
//! from a string (CLI flag, `PROVIDER` variable) and still use one type.

use crate::client::{CallMetadata, CallSelector, CostInfo, CostScope, ProviderClient};
use crate::error::Result;
use crate::gemini::{GeminiClient, GeminiConfig, GenerateContentResponse};
use crate::openai::{ChatCompletionResponse, OpenAiClient, OpenAiConfig};
use crate::params::ModelParams;
use crate::prompt::Prompt;
use crate::provider::{JobKind, Provider};
use crate::secrets::Safebox;
use secrecy::SecretString;
use serde::Serialize;
use tracing::info;

/// Raw response of whichever backend served the call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderResponse {
    /// OpenAI chat completion
    OpenAi(ChatCompletionResponse),
    /// Gemini generateContent
    Gemini(GenerateContentResponse),
}

impl ProviderResponse {
    /// Vendor response id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            ProviderResponse::OpenAi(r) => &r.id,
            ProviderResponse::Gemini(r) => r.id(),
        }
    }

    /// Generated text, if any
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            ProviderResponse::OpenAi(r) => r.text().map(str::to_string),
            ProviderResponse::Gemini(r) => r.text(),
        }
    }
}

/// A provider client selected at runtime
#[derive(Debug)]
pub enum LlmClient {
    /// OpenAI backend
    OpenAi(OpenAiClient),
    /// Gemini backend
    Gemini(GeminiClient),
}

impl LlmClient {
    /// Build a client for the provider named `provider`
    ///
    /// # Errors
    /// `UnsupportedProvider` for an unknown name, then any construction
    /// error of the backend (`UnknownModel`, `InvalidConfig`, `Http`)
    pub fn new(
        provider: &str,
        params: ModelParams,
        prompt: Prompt,
        api_key: SecretString,
    ) -> Result<Self> {
        let provider: Provider = provider.parse()?;
        Self::for_provider(provider, params, prompt, api_key)
    }

    /// Build a client for a known provider
    ///
    /// # Errors
    /// Any construction error of the backend
    pub fn for_provider(
        provider: Provider,
        params: ModelParams,
        prompt: Prompt,
        api_key: SecretString,
    ) -> Result<Self> {
        info!(%provider, model = %params.model, "Creating LLM client");
        match provider {
            Provider::OpenAi => {
                OpenAiClient::new(OpenAiConfig::new(api_key), params, prompt).map(Self::OpenAi)
            }
            Provider::Gemini => {
                GeminiClient::new(GeminiConfig::new(api_key), params, prompt).map(Self::Gemini)
            }
        }
    }

    /// Build a client taking the API key from the safebox
    ///
    /// # Errors
    /// `MissingSecret` or any backend construction error
    pub fn from_safebox(
        provider: Provider,
        safebox: &Safebox,
        params: ModelParams,
        prompt: Prompt,
    ) -> Result<Self> {
        let api_key = safebox.api_key(provider)?;
        Self::for_provider(provider, params, prompt, api_key)
    }

    /// Backend identifier
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            LlmClient::OpenAi(c) => c.provider(),
            LlmClient::Gemini(c) => c.provider(),
        }
    }

    /// Issue one call and record its usage
    ///
    /// # Errors
    /// `UnsupportedOperation` for jobs other than chat completion, vendor
    /// errors unchanged otherwise
    pub async fn submit(&mut self, job: JobKind) -> Result<ProviderResponse> {
        match self {
            LlmClient::OpenAi(c) => c.submit(job).await.map(ProviderResponse::OpenAi),
            LlmClient::Gemini(c) => c.submit(job).await.map(ProviderResponse::Gemini),
        }
    }

    /// See [`ProviderClient::cost_info`]
    ///
    /// # Errors
    /// Same as [`ProviderClient::cost_info`]
    pub fn cost_info(&mut self, scope: CostScope, call: Option<CallSelector>) -> Result<CostInfo> {
        match self {
            LlmClient::OpenAi(c) => c.cost_info(scope, call),
            LlmClient::Gemini(c) => c.cost_info(scope, call),
        }
    }

    /// See [`ProviderClient::metadata`]
    #[must_use]
    pub fn metadata(&self) -> CallMetadata {
        match self {
            LlmClient::OpenAi(c) => c.metadata(),
            LlmClient::Gemini(c) => c.metadata(),
        }
    }
}
