//! Error types for tutorly-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider identifier is not one of the supported backends
    #[error("client for {0} is not available")]
    UnsupportedProvider(String),

    /// Named configuration block not present in the config source
    #[error("configuration '{name}' not found in {source_name}")]
    MissingConfig {
        /// Requested block name
        name: String,
        /// Where the lookup happened (file path or "embedded defaults")
        source_name: String,
    },

    /// Configuration present but unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model has no entry in the price table
    #[error("no pricing for model '{model}' from provider '{provider}'")]
    UnknownModel {
        /// Provider name
        provider: String,
        /// Model name
        model: String,
    },

    /// Required secret was not found in the safebox
    #[error("secret {0} is not set")]
    MissingSecret(String),

    /// Job kind is not implemented by the client
    #[error("the {0} job is not currently available")]
    UnsupportedOperation(String),

    /// Individual cost lookup without a call selector
    #[error("a call selector must be provided for individual cost info")]
    MissingArgument,

    /// Individual cost lookup before any call was recorded
    #[error("no individual job data available")]
    EmptyLedger,

    /// Index past the end of the recorded calls
    #[error("call index {index} out of range ({len} recorded)")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of recorded calls
        len: usize,
    },

    /// Transport-level failure from the HTTP client
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the vendor API, body kept verbatim
    #[error("{provider} api error ({status}): {body}")]
    Api {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Vendor response could not be interpreted
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
