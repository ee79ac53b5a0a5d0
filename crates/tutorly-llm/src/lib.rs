//! Tutorly LLM - Provider clients with cost accounting
//!
//! This crate provides the LLM layer for Tutorly:
//! - Cost: static price table, per-call records and the usage ledger
//! - Client: `ProviderClient` trait with shared cost views
//! - OpenAI: Chat Completions backend
//! - Gemini: generateContent backend
//! - Factory: runtime provider selection (`LlmClient`)
//! - Params: model parameters loaded from named YAML blocks
//! - Secrets: `SECRET_*` environment variables (Safebox)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod cost;
pub mod error;
pub mod factory;
pub mod gemini;
pub mod openai;
pub mod params;
pub mod prompt;
pub mod provider;
pub mod secrets;
pub mod util;

pub use client::{CallMetadata, CallSelector, CostInfo, CostScope, ProviderClient};
pub use cost::{
    default_pricing, price_table, AggregatedUsage, CallRecord, LedgerSnapshot, ModelPricing,
    PriceTable, TokenCounts, UsageLedger,
};
pub use error::{Error, Result};
pub use factory::{LlmClient, ProviderResponse};
pub use params::{ModelParams, ParamOverrides, DEFAULT_PROFILE};
pub use prompt::Prompt;
pub use provider::{JobKind, Provider};
pub use secrets::Safebox;

// Re-export provider types
pub use gemini::{GeminiClient, GeminiConfig, GenerateContentResponse};
pub use openai::{ChatCompletionResponse, OpenAiClient, OpenAiConfig};
