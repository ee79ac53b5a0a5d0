//! Cost Tracking - token usage and cost accounting
//!
//! # Module Structure
//!
//! - `pricing`: Model pricing information and defaults
//! - `record`: Call records and aggregates
//! - `ledger`: Per-client usage ledger
//! - `global`: Process-wide price table

mod global;
mod ledger;
mod pricing;
mod record;


pub use global::price_table;
pub use ledger::UsageLedger;
pub use pricing::{default_pricing, ModelPricing, PriceTable};
pub use record::{AggregatedUsage, CallRecord, LedgerSnapshot, TokenCounts};
