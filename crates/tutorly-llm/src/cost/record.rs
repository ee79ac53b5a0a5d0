//! Call Records and Aggregates
//!
//! This module contains the per-call cost record and the summed view over
//! all records of a ledger.

use super::pricing::ModelPricing;
use serde::{Deserialize, Serialize};

/// Token counts extracted from a provider response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    /// Prompt-side tokens
    pub input_tokens: u64,
    /// Generated tokens
    pub output_tokens: u64,
}

impl TokenCounts {
    /// Create token counts
    #[must_use]
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Input plus output
    #[must_use]
    pub fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Usage and cost of one completed provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Provider-assigned response identifier
    pub id: String,
    /// Input tokens
    pub input_tokens: u64,
    /// Output tokens
    pub output_tokens: u64,
    /// Input plus output tokens
    pub total_tokens: u64,
    /// Input cost (USD)
    pub input_cost: f64,
    /// Output cost (USD)
    pub output_cost: f64,
    /// Input plus output cost (USD)
    pub total_cost: f64,
}

impl CallRecord {
    /// Price a call. The same formula applies to every provider.
    #[must_use]
    pub fn priced(id: impl Into<String>, tokens: TokenCounts, pricing: &ModelPricing) -> Self {
        let input_cost = pricing.input_cost(tokens.input_tokens);
        let output_cost = pricing.output_cost(tokens.output_tokens);
        Self {
            id: id.into(),
            input_tokens: tokens.input_tokens,
            output_tokens: tokens.output_tokens,
            total_tokens: tokens.total(),
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}

/// Sums over every recorded call
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedUsage {
    /// Sum of input tokens
    pub overall_input_tokens: u64,
    /// Sum of output tokens
    pub overall_output_tokens: u64,
    /// Sum of total tokens
    pub overall_total_tokens: u64,
    /// Sum of input costs (USD)
    pub overall_input_cost: f64,
    /// Sum of output costs (USD)
    pub overall_output_cost: f64,
    /// Sum of total costs (USD)
    pub overall_total_cost: f64,
}

impl AggregatedUsage {
    /// Sum a sequence of records from zero
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CallRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut acc, record| {
                acc.overall_input_tokens =
                    acc.overall_input_tokens.saturating_add(record.input_tokens);
                acc.overall_output_tokens =
                    acc.overall_output_tokens.saturating_add(record.output_tokens);
                acc.overall_total_tokens =
                    acc.overall_total_tokens.saturating_add(record.total_tokens);
                acc.overall_input_cost += record.input_cost;
                acc.overall_output_cost += record.output_cost;
                acc.overall_total_cost += record.total_cost;
                acc
            })
    }
}

/// Ledger state as exposed in call metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Every recorded call in call order
    pub individual: Vec<CallRecord>,
    /// Last computed aggregate, `None` until the first aggregation
    pub aggregated: Option<AggregatedUsage>,
}
