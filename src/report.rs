//! Report preparation pipeline.
//!
//! Single entry point that drives one document request:
//! required fields → outline → enrichment → render → missing-field check.
//!
//! Never fails. Enrichment problems surface as a notice, unknown section
//! keys are dropped, and absent data shows up in `missing_fields`.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::context::ReportContext;
use crate::enrichment::{
    AiModuleRegistry, CreditLedger, EnrichmentBatchResult, EnrichmentError, EnrichmentGate,
    HttpAiProvider,
};
use crate::placeholders::{get_required_placeholders, missing_placeholders, PlaceholderPath};
use crate::sections::{
    ComposedOutline, OutlineWarning, RenderedSection, SectionComposer, SectionRegistry,
};

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// Template identity as stored with the document template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub slug: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub template: TemplateRef,
    /// Section keys persisted with the template, in order.
    #[serde(default)]
    pub sections: Vec<String>,
    pub context: ReportContext,
}

/// Everything the document renderer needs for one report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub template: TemplateRef,
    pub outline: ComposedOutline,
    pub required_fields: Vec<PlaceholderPath>,
    /// Required fields the enriched data still does not supply.
    pub missing_fields: Vec<PlaceholderPath>,
    pub outline_warnings: Vec<OutlineWarning>,
    pub sections: Vec<RenderedSection>,
    pub enrichment: EnrichmentBatchResult,
    /// Set when at least one triggered enrichment did not complete.
    pub notice: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ReportEngine {
    sections: SectionRegistry,
    gate: EnrichmentGate,
}

impl ReportEngine {
    pub fn new(sections: SectionRegistry, gate: EnrichmentGate) -> Self {
        Self { sections, gate }
    }

    /// Standard sections and modules over the configured HTTP provider.
    /// A configured credit limit meters AI spend per request org.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EnrichmentError> {
        let provider = HttpAiProvider::from_config(config)?;
        let mut gate = EnrichmentGate::from_config(
            config,
            Arc::new(AiModuleRegistry::standard()),
            Arc::new(provider),
        );
        if let Some(limit) = config.credit_limit {
            gate = gate.with_ledger(Arc::new(CreditLedger::new(limit)));
        }
        Ok(Self::new(SectionRegistry::standard(), gate))
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn gate(&self) -> &EnrichmentGate {
        &self.gate
    }

    pub async fn prepare(&self, request: ReportRequest) -> PreparedReport {
        self.prepare_until(request, std::future::pending()).await
    }

    /// Same as `prepare`, cutting enrichment short when `cancel` resolves.
    pub async fn prepare_until<F>(&self, request: ReportRequest, cancel: F) -> PreparedReport
    where
        F: Future<Output = ()>,
    {
        let ReportRequest {
            template,
            sections,
            context,
        } = request;
        let report_id = Uuid::new_v4();

        // Step 1: placeholder contract
        let required_fields =
            get_required_placeholders(&template.slug, template.category.as_deref());

        // Step 2: outline
        let composer = SectionComposer::new(&self.sections);
        let outline = composer.compose_persisted(&sections, &context);
        let outline_warnings = composer.validate_outline(&outline, &context);

        // Step 3: enrichment over a shared read-only context
        let shared = Arc::new(context);
        let enrichment = self.gate.run_batch_until(Arc::clone(&shared), cancel).await;
        let mut context = Arc::try_unwrap(shared).unwrap_or_else(|arc| (*arc).clone());
        context.apply_enrichments(&enrichment);

        // Steps 4-5: render, then check the contract against enriched data
        let rendered = composer.render_outline(&outline, &context);
        let missing_fields = missing_placeholders(&context.data, &required_fields);
        let notice = enrichment.unavailable_notice();

        tracing::info!(
            report_id = %report_id,
            template = %template.slug,
            sections = outline.len(),
            missing = missing_fields.len(),
            ai_cost = enrichment.total_cost,
            "Report prepared"
        );

        PreparedReport {
            report_id,
            generated_at: Utc::now(),
            template,
            outline,
            required_fields,
            missing_fields,
            outline_warnings,
            sections: rendered,
            enrichment,
            notice,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
