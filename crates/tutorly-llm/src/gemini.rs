//! Gemini - Google Generative Language API provider
//!
//! Calls `models/{model}:generateContent` with the API key in the
//! `x-goog-api-key` header.

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

/// Gemini API base URL
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: SecretString,
    /// Base URL
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set timeout
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
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    presence_penalty: f32,
    frequency_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_logprobs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logprobs: Option<u32>,
}

/// `generateContent` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// Response identifier
    #[serde(default)]
    pub response_id: Option<String>,
    /// Model version that served the request
    #[serde(default)]
    pub model_version: Option<String>,
}

/// One generated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<CandidateContent>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content of a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateContent {
    /// Role (`model`)
    #[serde(default)]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// A content part; only text parts carry `text`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePart {
    /// Text of the part
    #[serde(default)]
    pub text: Option<String>,
}

/// Usage block of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_token_count: u64,
    /// May be absent for empty/thinking-only responses
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
    /// Total reported by the API, includes thinking tokens
    #[serde(default)]
    pub total_token_count: u64,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Response id, empty when the API omits it
    #[must_use]
    pub fn id(&self) -> &str {
        self.response_id.as_deref().unwrap_or_default()
    }

    /// Token counts from `usageMetadata`
    ///
    /// # Errors
    /// Returns `InvalidResponse` if the response carries no usage block
    pub fn token_counts(&self) -> Result<TokenCounts> {
        let usage = self
            .usage_metadata
            .ok_or_else(|| Error::InvalidResponse("No usageMetadata in Gemini response".to_string()))?;
        let output = usage.candidates_token_count.unwrap_or(0);
        if usage.total_token_count != usage.prompt_token_count.saturating_add(output) {
            debug!(
                reported = usage.total_token_count,
                "Gemini totalTokenCount differs from prompt + candidates"
            );
        }
        Ok(TokenCounts::new(usage.prompt_token_count, output))
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini generateContent client with its own usage ledger
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
    params: ModelParams,
    prompt: Prompt,
    pricing: ModelPricing,
    ledger: UsageLedger,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .field("model", &self.params.model)
            .field("calls", &self.ledger.len())
            .finish()
    }
}

impl GeminiClient {
    /// Creates a client for `params.model`
    ///
    /// # Errors
    /// `UnknownModel` if the model is not priced, `InvalidConfig` for bad
    /// parameters, `Http` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig, params: ModelParams, prompt: Prompt) -> Result<Self> {
        let pricing = resolve_pricing(Provider::Gemini, &params)?;
        warn_ignored(
            Provider::Gemini,
            &params,
            &[("user", params.user.is_some()), ("echo", params.echo)],
        );

        let http = Client::builder().timeout(config.timeout).build()?;

        info!(model = %params.model, "Gemini client initialized");
        Ok(Self {
            http,
            config,
            params,
            prompt,
            pricing,
            ledger: UsageLedger::new(),
        })
    }

    fn build_request(&self) -> GeminiRequest<'_> {
        let params = &self.params;
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![TextPart {
                    text: self.prompt.body(),
                }],
            }],
            system_instruction: self.prompt.instructions().map(|text| GeminiContent {
                role: None,
                parts: vec![TextPart { text }],
            }),
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_tokens,
                top_p: params.top_p,
                top_k: params.top_k.map(|k| k.round() as u32),
                presence_penalty: params.presence_penalty,
                frequency_penalty: params.frequency_penalty,
                stop_sequences: params.stop.as_deref(),
                candidate_count: params.n,
                response_logprobs: params.logprobs.map(|_| true),
                logprobs: params.logprobs,
            },
        }
    }

    #[instrument(skip(self), fields(model = %self.params.model))]
    async fn generate_content(&self) -> Result<GenerateContentResponse> {
        let request = self.build_request();
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.params.model
        );

        debug!("Sending request to Gemini");

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                provider: Provider::Gemini.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    fn call_record(&self, response: &GenerateContentResponse) -> Result<CallRecord> {
        let tokens = response.token_counts()?;
        Ok(CallRecord::priced(response.id(), tokens, &self.pricing))
    }
}

#[async_trait::async_trait]
impl ProviderClient for GeminiClient {
    type Response = GenerateContentResponse;

    fn provider(&self) -> Provider {
        Provider::Gemini
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

    async fn submit(&mut self, job: JobKind) -> Result<GenerateContentResponse> {
        ensure_supported(Provider::Gemini, job)?;
        info!("Calling Gemini API and request with {} job...", job);

        let response = self.generate_content().await?;
        let record = self.call_record(&response)?;
        self.ledger.record(record);

        Ok(response)
    }
}
