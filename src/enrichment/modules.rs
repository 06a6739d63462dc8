//! Standard enrichment modules.
//!
//! Each module: trigger on a context signal, build a short prompt from the
//! placeholder-filled data, call the provider, parse one JSON object.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::{Capability, ReportContext};

use super::error::EnrichmentError;
use super::sanitize::parse_ai_json;
use super::traits::{AiModule, AiProvider, CompletionRequest};
use super::types::{CostUnits, ModuleKey};

const SYSTEM_PROMPT: &str = "You are an assistant for a roofing contractor preparing \
    insurance and retail documents. Answer with a single valid JSON object only.";

/// Cap on list items forwarded into one prompt.
const MAX_PROMPT_ITEMS: usize = 40;

fn request(prompt: String) -> CompletionRequest {
    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        prompt,
    }
}

fn compact(items: &[Value]) -> String {
    let slice = &items[..items.len().min(MAX_PROMPT_ITEMS)];
    serde_json::to_string(slice).unwrap_or_default()
}

// ─── Photo captions ──────────────────────────────────────────────────────────

pub struct PhotoCaptionModule;

#[async_trait]
impl AiModule for PhotoCaptionModule {
    fn key(&self) -> ModuleKey {
        ModuleKey::PhotoCaptions
    }

    fn cost(&self) -> CostUnits {
        2
    }

    fn trigger(&self, ctx: &ReportContext) -> bool {
        ctx.has(Capability::Photos)
    }

    async fn run(
        &self,
        ctx: &ReportContext,
        provider: &dyn AiProvider,
    ) -> Result<Value, EnrichmentError> {
        let photos: Vec<Value> = ctx
            .photos
            .iter()
            .map(|p| json!({ "photoId": p.id, "existingCaption": p.caption }))
            .collect();
        let prompt = format!(
            "Write a one-sentence roof inspection caption for each photo. \
             Keep existing captions' meaning.\nPhotos: {}\n\
             Respond as {{\"captions\": [{{\"photoId\": string, \"caption\": string}}]}}",
            compact(&photos)
        );

        let raw = provider.complete(&request(prompt)).await?;
        let value = parse_ai_json(&raw, "captions")?;
        if !value["captions"].is_array() {
            return Err(EnrichmentError::MalformedResponse(
                "\"captions\" is not a list".into(),
            ));
        }
        Ok(value)
    }
}

// ─── Damage narrative ────────────────────────────────────────────────────────

pub struct DamageNarrativeModule;

#[async_trait]
impl AiModule for DamageNarrativeModule {
    fn key(&self) -> ModuleKey {
        ModuleKey::DamageNarrative
    }

    fn cost(&self) -> CostUnits {
        3
    }

    fn trigger(&self, ctx: &ReportContext) -> bool {
        ctx.data_list("findings").is_some()
    }

    async fn run(
        &self,
        ctx: &ReportContext,
        provider: &dyn AiProvider,
    ) -> Result<Value, EnrichmentError> {
        let findings = ctx.data_list("findings").map(Vec::as_slice).unwrap_or(&[]);
        let prompt = format!(
            "Summarize these roof inspection findings into a factual damage narrative \
             for an insurance adjuster (max 150 words).\nRoof type: {}\nFindings: {}\n\
             Respond as {{\"narrative\": string}}",
            ctx.data_field("property.roofType").unwrap_or(&Value::Null),
            compact(findings)
        );

        let raw = provider.complete(&request(prompt)).await?;
        parse_ai_json(&raw, "narrative")
    }
}

// ─── Storm correlation ───────────────────────────────────────────────────────

pub struct StormCorrelationModule;

#[async_trait]
impl AiModule for StormCorrelationModule {
    fn key(&self) -> ModuleKey {
        ModuleKey::StormCorrelation
    }

    fn cost(&self) -> CostUnits {
        2
    }

    fn trigger(&self, ctx: &ReportContext) -> bool {
        ctx.has(Capability::Latlng)
            && ctx
                .data_field("claim.dateOfLoss")
                .and_then(|v| v.as_str())
                .is_some_and(|d| !d.trim().is_empty())
    }

    async fn run(
        &self,
        ctx: &ReportContext,
        provider: &dyn AiProvider,
    ) -> Result<Value, EnrichmentError> {
        let Some((lat, lng)) = ctx.coordinates() else {
            return Err(EnrichmentError::MalformedResponse(
                "Context lost coordinates".into(),
            ));
        };
        let prompt = format!(
            "Given a reported date of loss {} at latitude {lat:.4}, longitude {lng:.4}, \
             and recorded weather {}, assess whether a hail or wind event plausibly \
             caused roof damage.\n\
             Respond as {{\"assessment\": string, \"confidence\": \"low\"|\"medium\"|\"high\"}}",
            ctx.data_field("claim.dateOfLoss").unwrap_or(&Value::Null),
            ctx.data_field("weather").unwrap_or(&Value::Null),
        );

        let raw = provider.complete(&request(prompt)).await?;
        parse_ai_json(&raw, "assessment")
    }
}

// ─── Scope review ────────────────────────────────────────────────────────────

pub struct ScopeReviewModule;

#[async_trait]
impl AiModule for ScopeReviewModule {
    fn key(&self) -> ModuleKey {
        ModuleKey::ScopeReview
    }

    fn cost(&self) -> CostUnits {
        1
    }

    fn trigger(&self, ctx: &ReportContext) -> bool {
        ctx.data_list("scopeItems").is_some()
    }

    async fn run(
        &self,
        ctx: &ReportContext,
        provider: &dyn AiProvider,
    ) -> Result<Value, EnrichmentError> {
        let items = ctx.data_list("scopeItems").map(Vec::as_slice).unwrap_or(&[]);
        let prompt = format!(
            "Review this roofing scope of work for commonly missed line items \
             (drip edge, starter, ice and water shield, ventilation, permits).\n\
             Items: {}\n\
             Respond as {{\"suggestions\": [{{\"item\": string, \"reason\": string}}]}}",
            compact(items)
        );

        let raw = provider.complete(&request(prompt)).await?;
        parse_ai_json(&raw, "suggestions")
    }
}
