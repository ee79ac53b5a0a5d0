//! Model Pricing - per-million-token prices for supported models
//!
//! Prices are USD per 1,000,000 tokens. The table is static reference data
//! shared by every client in the process.

use crate::error::{Error, Result};
use crate::provider::Provider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// OpenAI Pricing Constants (per 1M tokens, USD)
// ============================================================================

/// GPT-4.5 input cost per 1M tokens
pub const GPT45_INPUT_COST: f64 = 75.00;
/// GPT-4.5 output cost per 1M tokens
pub const GPT45_OUTPUT_COST: f64 = 150.00;
/// GPT-4o input cost per 1M tokens
pub const GPT4O_INPUT_COST: f64 = 2.50;
/// GPT-4o output cost per 1M tokens
pub const GPT4O_OUTPUT_COST: f64 = 10.00;
/// GPT-4o-mini input cost per 1M tokens
pub const GPT4O_MINI_INPUT_COST: f64 = 0.15;
/// GPT-4o-mini output cost per 1M tokens
pub const GPT4O_MINI_OUTPUT_COST: f64 = 0.60;
/// o1 input cost per 1M tokens
pub const O1_INPUT_COST: f64 = 15.00;
/// o1 output cost per 1M tokens
pub const O1_OUTPUT_COST: f64 = 60.00;
/// o3-mini input cost per 1M tokens
pub const O3_MINI_INPUT_COST: f64 = 1.10;
/// o3-mini output cost per 1M tokens
pub const O3_MINI_OUTPUT_COST: f64 = 4.40;

// ============================================================================
// Gemini Pricing Constants (per 1M tokens, USD)
// ============================================================================

/// Gemini 2.5 Flash preview input cost per 1M tokens
pub const GEMINI_25_FLASH_PREVIEW_INPUT_COST: f64 = 1.25;
/// Gemini 2.5 Flash preview output cost per 1M tokens
pub const GEMINI_25_FLASH_PREVIEW_OUTPUT_COST: f64 = 1.50;
/// Gemini 1.5 Pro input cost per 1M tokens
pub const GEMINI_15_PRO_INPUT_COST: f64 = 1.25;
/// Gemini 1.5 Pro output cost per 1M tokens
pub const GEMINI_15_PRO_OUTPUT_COST: f64 = 5.00;
/// Gemini 1.5 Flash input cost per 1M tokens
pub const GEMINI_15_FLASH_INPUT_COST: f64 = 0.075;
/// Gemini 1.5 Flash output cost per 1M tokens
pub const GEMINI_15_FLASH_OUTPUT_COST: f64 = 0.30;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Pricing information for a model (per 1M tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model name
    pub model: String,
    /// Provider
    pub provider: Provider,
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
    /// Cost per 1M cached input tokens (USD), when the vendor offers caching
    pub cached_input_cost_per_million: Option<f64>,
    /// Context window size
    pub context_window: Option<u32>,
}

impl ModelPricing {
    fn entry(
        provider: Provider,
        model: &str,
        input: f64,
        output: f64,
        cached_input: Option<f64>,
        context_window: Option<u32>,
    ) -> Self {
        Self {
            model: model.to_string(),
            provider,
            input_cost_per_million: input,
            output_cost_per_million: output,
            cached_input_cost_per_million: cached_input,
            context_window,
        }
    }

    /// Cost of `tokens` input tokens
    #[must_use]
    pub fn input_cost(&self, tokens: u64) -> f64 {
        (tokens as f64 / TOKENS_PER_MILLION) * self.input_cost_per_million
    }

    /// Cost of `tokens` output tokens
    #[must_use]
    pub fn output_cost(&self, tokens: u64) -> f64 {
        (tokens as f64 / TOKENS_PER_MILLION) * self.output_cost_per_million
    }
}

/// Read-only price table keyed by provider and model
#[derive(Debug, Clone)]
pub struct PriceTable {
    entries: HashMap<(Provider, String), ModelPricing>,
}

impl PriceTable {
    /// Build a table from explicit entries
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ModelPricing>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|p| ((p.provider, p.model.clone()), p))
                .collect(),
        }
    }

    /// Look up pricing for a model
    ///
    /// # Errors
    /// Returns `UnknownModel` if the model has no entry for this provider
    pub fn lookup(&self, provider: Provider, model: &str) -> Result<&ModelPricing> {
        self.entries
            .get(&(provider, model.to_string()))
            .ok_or_else(|| Error::UnknownModel {
                provider: provider.to_string(),
                model: model.to_string(),
            })
    }

    /// Whether a model is priced
    #[must_use]
    pub fn contains(&self, provider: Provider, model: &str) -> bool {
        self.entries.contains_key(&(provider, model.to_string()))
    }

    /// All entries for one provider, sorted by model name
    #[must_use]
    pub fn models(&self, provider: Provider) -> Vec<&ModelPricing> {
        let mut models: Vec<_> = self
            .entries
            .values()
            .filter(|p| p.provider == provider)
            .collect();
        models.sort_by(|a, b| a.model.cmp(&b.model));
        models
    }

    /// Number of priced models
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Default pricing for supported chat models
#[must_use]
pub fn default_pricing() -> PriceTable {
    use Provider::{Gemini, OpenAi};

    PriceTable::from_entries([
        // ====================================================================
        // OpenAI
        // ====================================================================
        ModelPricing::entry(
            OpenAi,
            "gpt-4.5",
            GPT45_INPUT_COST,
            GPT45_OUTPUT_COST,
            Some(37.50),
            Some(128_000),
        ),
        ModelPricing::entry(
            OpenAi,
            "gpt-4o",
            GPT4O_INPUT_COST,
            GPT4O_OUTPUT_COST,
            Some(1.25),
            Some(128_000),
        ),
        ModelPricing::entry(
            OpenAi,
            "gpt-4o-mini",
            GPT4O_MINI_INPUT_COST,
            GPT4O_MINI_OUTPUT_COST,
            Some(0.075),
            Some(128_000),
        ),
        ModelPricing::entry(
            OpenAi,
            "o1",
            O1_INPUT_COST,
            O1_OUTPUT_COST,
            Some(7.50),
            Some(200_000),
        ),
        ModelPricing::entry(
            OpenAi,
            "o3-mini",
            O3_MINI_INPUT_COST,
            O3_MINI_OUTPUT_COST,
            Some(0.55),
            Some(200_000),
        ),
        // Fine-tuned models are billed at their own rates
        ModelPricing::entry(OpenAi, "gpt-4o_fine_tuning", 3.75, 15.00, Some(1.875), None),
        ModelPricing::entry(OpenAi, "gpt-4o-mini_fine_tuning", 0.30, 1.20, Some(0.15), None),
        // ====================================================================
        // Gemini
        // ====================================================================
        ModelPricing::entry(
            Gemini,
            "gemini-2.5-flash-preview-05-20",
            GEMINI_25_FLASH_PREVIEW_INPUT_COST,
            GEMINI_25_FLASH_PREVIEW_OUTPUT_COST,
            None,
            None,
        ),
        ModelPricing::entry(
            Gemini,
            "gemini-1.5-pro",
            GEMINI_15_PRO_INPUT_COST,
            GEMINI_15_PRO_OUTPUT_COST,
            Some(0.3125),
            Some(2_000_000),
        ),
        ModelPricing::entry(
            Gemini,
            "gemini-1.5-pro-002",
            GEMINI_15_PRO_INPUT_COST,
            GEMINI_15_PRO_OUTPUT_COST,
            Some(0.3125),
            Some(2_000_000),
        ),
        ModelPricing::entry(
            Gemini,
            "gemini-1.5-flash",
            GEMINI_15_FLASH_INPUT_COST,
            GEMINI_15_FLASH_OUTPUT_COST,
            Some(0.01875),
            Some(1_000_000),
        ),
        ModelPricing::entry(
            Gemini,
            "gemini-1.5-flash-002",
            GEMINI_15_FLASH_INPUT_COST,
            GEMINI_15_FLASH_OUTPUT_COST,
            Some(0.01875),
            Some(1_000_000),
        ),
        ModelPricing::entry(
            Gemini,
            "gemini-1.5-flash-8b",
            0.0375,
            0.15,
            Some(0.009375),
            Some(1_000_000),
        ),
        ModelPricing::entry(Gemini, "gemini-1.0-pro", 0.50, 1.50, None, Some(30_720)),
    ])
}
