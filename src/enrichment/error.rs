//! Enrichment error types.
//!
//! Every variant is recorded per module in the batch result. None of them
//! abort a batch.

use std::time::Duration;

use thiserror::Error;

use super::types::ModuleKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("AI provider is not reachable at {0}")]
    ProviderConnection(String),

    #[error("AI provider returned error (status {status}): {body}")]
    ProviderStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Module timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Module run cancelled")]
    Cancelled,

    #[error("Trigger predicate panicked")]
    TriggerPanicked,

    #[error("Module run panicked")]
    RunPanicked,

    #[error("AI credit budget exceeded: requested {requested}, remaining {remaining}")]
    BudgetExceeded { requested: u64, remaining: u64 },

    #[error("No org to bill AI credits to")]
    MissingOrg,

    #[error("Module registered twice: {0}")]
    DuplicateModule(ModuleKey),
}
