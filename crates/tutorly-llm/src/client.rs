//! Provider client trait and the cost views it exposes
//!
//! Every backend owns its parameters, prompt and [`UsageLedger`]. The ledger
//! reads (`cost_info`, `metadata`) are shared default methods, so each
//! backend only implements the vendor call and its usage extraction.

use crate::cost::{
    price_table, AggregatedUsage, CallRecord, LedgerSnapshot, ModelPricing, UsageLedger,
};
use crate::error::{Error, Result};
use crate::params::ModelParams;
use crate::prompt::Prompt;
use crate::provider::{JobKind, Provider};
use serde::Serialize;
use std::str::FromStr;
use tracing::{error, info, warn};

/// Which view of the ledger to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostScope {
    /// Sums over every call
    Aggregated,
    /// Recorded calls themselves
    Individual,
}

impl FromStr for CostScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aggregated" => Ok(CostScope::Aggregated),
            "individual" => Ok(CostScope::Individual),
            other => Err(Error::InvalidConfig(format!("unknown cost scope '{other}'"))),
        }
    }
}

/// Which recorded call(s) an individual lookup returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSelector {
    /// Every call, in call order
    All,
    /// The call at this position
    Index(usize),
}

impl FromStr for CallSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(CallSelector::All);
        }
        s.parse::<usize>().map(CallSelector::Index).map_err(|_| {
            Error::InvalidConfig(format!("call selector must be 'all' or an index, got '{s}'"))
        })
    }
}

/// Result of a cost lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CostInfo {
    /// Aggregated sums
    Aggregated(AggregatedUsage),
    /// Every recorded call
    All(Vec<CallRecord>),
    /// One recorded call
    Single(CallRecord),
}

/// Parameters and ledger state of a client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallMetadata {
    /// Generation parameters in effect
    pub job_parameters: ModelParams,
    /// Recorded calls and last aggregate
    pub job_cost: LedgerSnapshot,
}

/// A provider backend with its own usage ledger
#[async_trait::async_trait]
pub trait ProviderClient: Send {
    /// Raw vendor response returned from `submit`
    type Response: Send;

    /// Backend identifier
    fn provider(&self) -> Provider;

    /// Parameters sent with every call
    fn params(&self) -> &ModelParams;

    /// Prompt sent with every call
    fn prompt(&self) -> &Prompt;

    /// Call history
    fn ledger(&self) -> &UsageLedger;

    /// Mutable call history
    fn ledger_mut(&mut self) -> &mut UsageLedger;

    /// Issue one request of kind `job`, record its usage and return the raw
    /// response. Vendor failures are returned as-is and nothing is recorded.
    async fn submit(&mut self, job: JobKind) -> Result<Self::Response>;

    /// Read aggregated or individual cost information
    ///
    /// # Errors
    /// `MissingArgument` for an individual lookup without selector,
    /// `EmptyLedger` before the first call, `OutOfRange` for a bad index
    fn cost_info(&mut self, scope: CostScope, call: Option<CallSelector>) -> Result<CostInfo> {
        match scope {
            CostScope::Aggregated => {
                info!("Calculating overall total cost...");
                let aggregated = self.ledger_mut().aggregate();
                info!(
                    "Total cost for all calls: USD {:.5}",
                    aggregated.overall_total_cost
                );
                Ok(CostInfo::Aggregated(aggregated))
            }
            CostScope::Individual => {
                let selector = call.ok_or(Error::MissingArgument)?;
                let ledger = self.ledger();
                if ledger.is_empty() {
                    return Err(Error::EmptyLedger);
                }
                match selector {
                    CallSelector::All => Ok(CostInfo::All(ledger.all())),
                    CallSelector::Index(index) => Ok(CostInfo::Single(ledger.get(index)?.clone())),
                }
            }
        }
    }

    /// Snapshot of parameters and ledger state
    fn metadata(&self) -> CallMetadata {
        CallMetadata {
            job_parameters: self.params().clone(),
            job_cost: self.ledger().snapshot(),
        }
    }
}

/// Reject job kinds no backend implements
pub(crate) fn ensure_supported(provider: Provider, job: JobKind) -> Result<()> {
    match job {
        JobKind::ChatCompletion => Ok(()),
        other => {
            error!(%provider, "The {} job is not currently available!", other);
            Err(Error::UnsupportedOperation(other.to_string()))
        }
    }
}

/// Pricing for the configured model, resolved before any request is made
pub(crate) fn resolve_pricing(provider: Provider, params: &ModelParams) -> Result<ModelPricing> {
    params.validate()?;
    price_table().lookup(provider, &params.model).cloned()
}

/// Warn about parameters a backend does not forward
pub(crate) fn warn_ignored(provider: Provider, params: &ModelParams, ignored: &[(&str, bool)]) {
    if params.stream {
        warn!(%provider, "stream=true is ignored, responses are returned whole");
    }
    for (name, set) in ignored {
        if *set {
            warn!(%provider, param = *name, "Parameter not supported by provider, ignoring");
        }
    }
}
