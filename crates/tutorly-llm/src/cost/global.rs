//! Global Price Table
//!
//! This module provides the process-wide price table instance.

use super::pricing::{default_pricing, PriceTable};

lazy_static::lazy_static! {
    /// Global price table instance
    static ref PRICE_TABLE: PriceTable = default_pricing();
}

/// Get the global price table
#[must_use]
pub fn price_table() -> &'static PriceTable {
    &PRICE_TABLE
}
