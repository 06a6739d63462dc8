//! AI enrichment: costed modules gated on report context.
//!
//! ```text
//! ReportContext → triggers (pure) → bounded parallel runs → EnrichmentBatchResult
//!                                       ↑ AiProvider (HTTP)
//! ```
//!
//! A failed module is recorded, never billed, and never aborts the batch.

pub mod error;
pub mod types;
pub mod traits;
pub mod sanitize;
pub mod budget;
pub mod provider;
pub mod modules;
pub mod gate;

pub use error::EnrichmentError;
pub use types::{CostUnits, EnrichmentBatchResult, ModuleKey, ModuleOutcome};
pub use traits::{AiModule, AiProvider, CompletionRequest};
pub use sanitize::{parse_ai_json, sanitize_ai_output};
pub use budget::{CreditBudget, CreditLedger, Reservation};
pub use provider::HttpAiProvider;
pub use modules::{
    DamageNarrativeModule, PhotoCaptionModule, ScopeReviewModule, StormCorrelationModule,
};
pub use gate::{AiModuleRegistry, EnrichmentGate};
