//! Usage Ledger - per-client call history
//!
//! Append-only list of call records plus the most recently computed
//! aggregate. The aggregate is always recomputed from the full list.

use super::record::{AggregatedUsage, CallRecord, LedgerSnapshot};
use crate::error::{Error, Result};

/// Call history owned by one provider client
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    individual: Vec<CallRecord>,
    aggregated: Option<AggregatedUsage>,
}

impl UsageLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn record(&mut self, entry: CallRecord) {
        self.individual.push(entry);
    }

    /// Recompute the aggregate from every record and keep it as current state
    pub fn aggregate(&mut self) -> AggregatedUsage {
        let aggregated = AggregatedUsage::from_records(&self.individual);
        self.aggregated = Some(aggregated);
        aggregated
    }

    /// Record at `index`
    ///
    /// # Errors
    /// Returns `OutOfRange` if `index` is past the last record
    pub fn get(&self, index: usize) -> Result<&CallRecord> {
        self.individual.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.individual.len(),
        })
    }

    /// Snapshot of every record in call order
    #[must_use]
    pub fn all(&self) -> Vec<CallRecord> {
        self.individual.clone()
    }

    /// Last computed aggregate
    #[must_use]
    pub fn aggregated(&self) -> Option<&AggregatedUsage> {
        self.aggregated.as_ref()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.individual.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individual.is_empty()
    }

    /// Records and cached aggregate
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            individual: self.all(),
            aggregated: self.aggregated,
        }
    }
}
