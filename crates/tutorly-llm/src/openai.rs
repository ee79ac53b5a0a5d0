//! OpenAI - chat completions provider
//!
//! This module implements the OpenAI backend over the Chat Completions REST
//! endpoint using reqwest. Each client owns its prompt, parameters and usage
//! ledger.

use crate::client::{ensure_supported, resolve_pricing, warn_ignored, ProviderClient};
use crate::cost::{CallRecord, ModelPricing, TokenCounts, UsageLedger};
use crate::error::{Error, Result};
use crate::params::ModelParams;
use crate::prompt::Prompt;
use crate::provider::{JobKind, Provider};
use crate::util::mask_secret;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// OpenAI API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the OpenAI provider
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key for authentication
    pub api_key: SecretString,
    /// Base URL (proxies, Azure-compatible gateways, tests)
    pub base_url: String,
    /// Request timeout duration
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: OPENAI_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
    n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    logprobs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_logprobs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a str>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat completion response as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response identifier
    pub id: String,
    /// Object type
    #[serde(default)]
    pub object: String,
    /// Creation time (unix seconds)
    #[serde(default)]
    pub created: u64,
    /// Model that served the request
    pub model: String,
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// One generated choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Choice index
    #[serde(default)]
    pub index: u32,
    /// Generated message
    pub message: ChatResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message of a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponseMessage {
    /// Message role
    pub role: String,
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
    /// Total tokens
    pub total_tokens: u64,
}

impl ChatCompletionResponse {
    /// Text of the first choice
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }

    /// Token counts reported in `usage`
    ///
    /// # Errors
    /// Returns `InvalidResponse` if the response carries no usage block
    pub fn token_counts(&self) -> Result<TokenCounts> {
        let usage = self
            .usage
            .ok_or_else(|| Error::InvalidResponse("No usage in OpenAI response".to_string()))?;
        if usage.total_tokens != usage.prompt_tokens.saturating_add(usage.completion_tokens) {
            debug!(
                reported = usage.total_tokens,
                "OpenAI total_tokens differs from prompt + completion"
            );
        }
        Ok(TokenCounts::new(usage.prompt_tokens, usage.completion_tokens))
    }
}

// ============================================================================
// Client
// ============================================================================

/// OpenAI chat completion client with its own usage ledger
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
    params: ModelParams,
    prompt: Prompt,
    pricing: ModelPricing,
    ledger: UsageLedger,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.config)
            .field("model", &self.params.model)
            .field("calls", &self.ledger.len())
            .finish()
    }
}

impl OpenAiClient {
    /// Creates a client for `params.model`
    ///
    /// # Errors
    /// `UnknownModel` if the model is not priced, `InvalidConfig` for bad
    /// parameters, `Http` if the HTTP client cannot be built
    pub fn new(config: OpenAiConfig, params: ModelParams, prompt: Prompt) -> Result<Self> {
        let pricing = resolve_pricing(Provider::OpenAi, &params)?;
        warn_ignored(
            Provider::OpenAi,
            &params,
            &[("top_k", params.top_k.is_some()), ("echo", params.echo)],
        );

        let http = Client::builder().timeout(config.timeout).build()?;

        info!(model = %params.model, "OpenAI client initialized");
        Ok(Self {
            http,
            config,
            params,
            prompt,
            pricing,
            ledger: UsageLedger::new(),
        })
    }

    fn build_request(&self) -> ChatRequest<'_> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = self.prompt.instructions() {
            messages.push(ChatMessage {
                role: "system",
                content: instructions,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: self.prompt.body(),
        });

        let params = &self.params;
        ChatRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_completion_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            stop: params.stop.as_deref(),
            n: params.n,
            logprobs: params.logprobs.map(|_| true),
            top_logprobs: params.logprobs,
            user: params.user.as_deref(),
            stream: false,
        }
    }

    #[instrument(skip(self), fields(model = %self.params.model))]
    async fn chat_completion(&self) -> Result<ChatCompletionResponse> {
        let request = self.build_request();

        debug!("Sending request to OpenAI");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                provider: Provider::OpenAi.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    fn call_record(&self, response: &ChatCompletionResponse) -> Result<CallRecord> {
        let tokens = response.token_counts()?;
        Ok(CallRecord::priced(&response.id, tokens, &self.pricing))
    }
}

#[async_trait::async_trait]
impl ProviderClient for OpenAiClient {
    type Response = ChatCompletionResponse;

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn params(&self) -> &ModelParams {
        &self.params
    }

    fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut UsageLedger {
        &mut self.ledger
    }

    async fn submit(&mut self, job: JobKind) -> Result<ChatCompletionResponse> {
        ensure_supported(Provider::OpenAi, job)?;
        info!("Calling OpenAI API and request with {} job...", job);

        let response = self.chat_completion().await?;
        let record = self.call_record(&response)?;
        self.ledger.record(record);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(params: ModelParams, prompt: Prompt) -> OpenAiClient {
        let config = OpenAiConfig::new(SecretString::from("sk-1234567890abcdefghijklmnop"));
        OpenAiClient::new(config, params, prompt).unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAiConfig::new(SecretString::from("test-key"))
            .with_base_url("http://localhost:8080/v1/")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_debug_masks_key() {
        let config = OpenAiConfig::new(SecretString::from("sk-1234567890abcdefghijklmnop"));
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("1234567890abcdefghijkl"));
        assert!(debug_str.contains("sk-1...mnop"));
    }

    #[test]
    fn test_unknown_model_rejected_at_construction() {
        let config = OpenAiConfig::new(SecretString::from("sk-test"));
        let err = OpenAiClient::new(config, ModelParams::new("gemini-1.5-pro"), Prompt::new("hi"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownModel { .. }));
    }

    #[test]
    fn test_request_shape() {
        let mut params = ModelParams::new("gpt-4o");
        params.stop = Some(vec!["END".to_string()]);
        params.logprobs = Some(3);
        params.user = Some("student-1".to_string());
        let client = client(
            params,
            Prompt::new("The people is goes to market.").with_instructions("You are a grammar checker."),
        );

        let json = serde_json::to_value(client.build_request()).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "The people is goes to market.");
        assert_eq!(json["max_completion_tokens"], 1024);
        assert_eq!(json["stop"][0], "END");
        assert_eq!(json["logprobs"], true);
        assert_eq!(json["top_logprobs"], 3);
        assert_eq!(json["user"], "student-1");
        assert_eq!(json["stream"], false);
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_request_without_instructions() {
        let client = client(ModelParams::new("gpt-4o-mini"), Prompt::new("hi"));
        let json = serde_json::to_value(client.build_request()).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_call_record_from_response() {
        let client = client(ModelParams::new("gpt-4o"), Prompt::new("hi"));
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-abc",
            "object": "chat.completion",
            "created": 1_700_000_000u64,
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "The people go to market."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150}
        }))
        .unwrap();

        assert_eq!(response.text(), Some("The people go to market."));

        let record = client.call_record(&response).unwrap();
        assert_eq!(record.id, "chatcmpl-abc");
        assert_eq!(record.total_tokens, 150);
        assert!((record.input_cost - 0.00025).abs() < 1e-12);
        assert!((record.output_cost - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn test_oversized_usage_does_not_overflow() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-big",
            "model": "gpt-4o",
            "usage": {"prompt_tokens": u64::MAX, "completion_tokens": 5, "total_tokens": 0}
        }))
        .unwrap();

        let tokens = response.token_counts().unwrap();
        assert_eq!(tokens.output_tokens, 5);
        assert_eq!(tokens.total(), u64::MAX);
    }

    #[test]
    fn test_missing_usage_is_invalid_response() {
        let response: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-abc",
            "model": "gpt-4o",
            "choices": []
        }))
        .unwrap();
        assert!(response.text().is_none());
        assert!(matches!(
            response.token_counts(),
            Err(Error::InvalidResponse(_))
        ));
    }
}
