//! Render hooks for the standard sections.
//!
//! Each hook slices the enriched report context into the payload the
//! external renderer expects for that section. Hooks read only; missing data
//! becomes `null` or an empty list, never a panic.

use serde_json::{json, Value};

use crate::config::APP_NAME;
use crate::context::ReportContext;

fn field(ctx: &ReportContext, dotted: &str) -> Value {
    ctx.data_field(dotted).cloned().unwrap_or(Value::Null)
}

fn list(ctx: &ReportContext, key: &str) -> Value {
    ctx.data
        .get(key)
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

pub fn render_cover(ctx: &ReportContext) -> Value {
    let branding = ctx.branding.clone().unwrap_or_default();
    let logo_url = branding
        .logo_url
        .map(Value::String)
        .unwrap_or_else(|| field(ctx, "org.logoUrl"));
    json!({
        "orgName": field(ctx, "org.name"),
        "logoUrl": logo_url,
        "primaryColor": branding.primary_color,
        "clientName": field(ctx, "client.name"),
        "propertyAddress": field(ctx, "property.address"),
    })
}

pub fn render_summary(ctx: &ReportContext) -> Value {
    let findings_count = ctx.data_list("findings").map_or(0, |f| f.len());
    json!({
        "claimNumber": field(ctx, "claim.claimNumber"),
        "jobNumber": field(ctx, "job.jobNumber"),
        "dateOfLoss": field(ctx, "claim.dateOfLoss"),
        "findingsCount": findings_count,
        "narrative": field(ctx, "ai.damage_narrative.narrative"),
    })
}

/// Photos with AI captions filled in where the photo has none.
pub fn render_photos(ctx: &ReportContext) -> Value {
    let ai_captions = ctx
        .data_field("ai.photo_captions.captions")
        .and_then(|v| v.as_array());

    let photos: Vec<Value> = ctx
        .photos
        .iter()
        .map(|photo| {
            let caption = photo
                .caption
                .clone()
                .filter(|c| !c.trim().is_empty())
                .or_else(|| {
                    ai_captions?
                        .iter()
                        .find(|c| {
                            c.get("photoId").and_then(|id| id.as_str()) == Some(photo.id.as_str())
                        })
                        .and_then(|c| c.get("caption"))
                        .and_then(|c| c.as_str())
                        .map(str::to_string)
                });
            json!({ "id": photo.id, "url": photo.url, "caption": caption })
        })
        .collect();

    json!({ "photos": photos })
}

pub fn render_map(ctx: &ReportContext) -> Value {
    let (lat, lng) = ctx.coordinates().unzip();
    json!({ "lat": lat, "lng": lng, "address": field(ctx, "property.address") })
}

pub fn render_weather(ctx: &ReportContext) -> Value {
    json!({
        "weather": field(ctx, "weather"),
        "correlation": field(ctx, "ai.storm_correlation"),
    })
}

pub fn render_findings(ctx: &ReportContext) -> Value {
    json!({ "findings": list(ctx, "findings") })
}

/// Scope items with a computed grand total over numeric `total` values.
pub fn render_scope(ctx: &ReportContext) -> Value {
    let items = list(ctx, "scopeItems");
    let grand_total: f64 = items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.get("total").and_then(|t| t.as_f64()))
                .sum()
        })
        .unwrap_or(0.0);

    json!({
        "items": items,
        "grandTotal": grand_total,
        "review": field(ctx, "ai.scope_review"),
    })
}

pub fn render_vendor(ctx: &ReportContext) -> Value {
    json!({ "vendor": ctx.vendor })
}

pub fn render_notes(ctx: &ReportContext) -> Value {
    json!({ "notes": list(ctx, "notes") })
}

pub fn render_signature(ctx: &ReportContext) -> Value {
    json!({
        "preparedBy": field(ctx, "employee.name"),
        "preparedByTitle": field(ctx, "employee.title"),
        "client": field(ctx, "client.name"),
    })
}

pub fn render_footer(ctx: &ReportContext) -> Value {
    json!({
        "orgName": field(ctx, "org.name"),
        "phone": field(ctx, "org.phone"),
        "licenseNumber": field(ctx, "org.licenseNumber"),
        "generatedBy": APP_NAME,
    })
}
