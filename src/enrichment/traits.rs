//! Trait definitions for the enrichment gate.
//!
//! Two traits define the boundaries:
//! - AiProvider: the external LLM, a black box returning text
//! - AiModule: one costed, conditionally triggered enrichment step

use async_trait::async_trait;

use crate::context::ReportContext;

use super::error::EnrichmentError;
use super::types::{CostUnits, ModuleKey};

/// A single prompt sent to the AI provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
}

/// External AI provider client.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Run one completion. Non-2xx, timeout and unreadable bodies are errors.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnrichmentError>;
}

/// A costed enrichment step.
#[async_trait]
pub trait AiModule: Send + Sync {
    fn key(&self) -> ModuleKey;

    /// Credit units billed when `run` succeeds.
    fn cost(&self) -> CostUnits;

    /// Pure predicate deciding whether the module fires for `ctx`.
    fn trigger(&self, ctx: &ReportContext) -> bool;

    /// Produce the module's output. Must not assume any other module has
    /// already run in the same batch.
    async fn run(
        &self,
        ctx: &ReportContext,
        provider: &dyn AiProvider,
    ) -> Result<serde_json::Value, EnrichmentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _assert_provider(_: &dyn AiProvider) {}
        fn _assert_module(_: &dyn AiModule) {}
    }
}
