//! Report context: the caller-owned view of one claim/job handed to the
//! composer and the enrichment gate.
//!
//! The composer only reads capabilities from it. The gate reads it through a
//! shared reference and never mutates it; enrichment outputs are folded back
//! in afterwards by the pipeline via `apply_enrichments`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::enrichment::{EnrichmentBatchResult, ModuleOutcome};

// ═══════════════════════════════════════════
// Capability
// ═══════════════════════════════════════════

/// Context signals that gate section auto-injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Branding,
    Latlng,
    Photos,
    Vendor,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branding => "branding",
            Self::Latlng => "latlng",
            Self::Photos => "photos",
            Self::Vendor => "vendor",
        }
    }

    pub fn all() -> &'static [Capability] {
        &[Self::Branding, Self::Latlng, Self::Photos, Self::Vendor]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Context
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branding {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInfo {
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// Everything known about one document request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContext {
    #[serde(default)]
    pub org_id: Option<String>,
    /// Latitude; malformed input deserializes as absent.
    #[serde(default, deserialize_with = "lenient_latitude")]
    pub lat: Option<f64>,
    /// Longitude; malformed input deserializes as absent.
    #[serde(default, deserialize_with = "lenient_longitude")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub branding: Option<Branding>,
    #[serde(default)]
    pub photos: Vec<PhotoRef>,
    #[serde(default)]
    pub vendor: Option<VendorInfo>,
    /// Placeholder-filled report data (`claim`, `job`, `findings`, ...).
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ReportContext {
    /// Both coordinates, when each is a finite, in-range number.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.filter(|v| valid_latitude(*v))?;
        let lng = self.lng.filter(|v| valid_longitude(*v))?;
        Some((lat, lng))
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Branding => self.branding.as_ref().is_some_and(|b| {
                not_blank(b.logo_url.as_deref()) || not_blank(b.primary_color.as_deref())
            }),
            Capability::Latlng => self.coordinates().is_some(),
            Capability::Photos => !self.photos.is_empty(),
            Capability::Vendor => self
                .vendor
                .as_ref()
                .is_some_and(|v| not_blank(Some(v.name.as_str()))),
        }
    }

    /// The set of capabilities present in this context.
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// Look up a dotted field in `data` (`claim.dateOfLoss`).
    pub fn data_field(&self, dotted: &str) -> Option<&serde_json::Value> {
        dotted
            .split('.')
            .try_fold(&self.data, |value, segment| value.get(segment))
            .filter(|v| !v.is_null())
    }

    /// Non-empty array at a top-level data key (`findings`, `scopeItems`).
    pub fn data_list(&self, key: &str) -> Option<&Vec<serde_json::Value>> {
        self.data
            .get(key)
            .and_then(|v| v.as_array())
            .filter(|items| !items.is_empty())
    }

    /// Write every successful module output to `data.ai.<module_key>`.
    ///
    /// Failed modules leave no trace in the data. Returns how many outputs
    /// were applied.
    pub fn apply_enrichments(&mut self, batch: &EnrichmentBatchResult) -> usize {
        if !self.data.is_object() {
            self.data = serde_json::Value::Object(serde_json::Map::new());
        }
        let Some(root) = self.data.as_object_mut() else {
            return 0;
        };
        let ai = root
            .entry("ai")
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if !ai.is_object() {
            *ai = serde_json::Value::Object(serde_json::Map::new());
        }
        let Some(ai) = ai.as_object_mut() else {
            return 0;
        };

        let mut applied = 0;
        for (key, outcome) in &batch.results {
            if let ModuleOutcome::Completed { output, .. } = outcome {
                ai.insert(key.as_str().to_string(), output.clone());
                applied += 1;
            }
        }
        applied
    }
}

fn not_blank(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

fn valid_latitude(v: f64) -> bool {
    v.is_finite() && (-90.0..=90.0).contains(&v)
}

fn valid_longitude(v: f64) -> bool {
    v.is_finite() && (-180.0..=180.0).contains(&v)
}

/// Accept any JSON value; keep it only when it is a number passing `valid`.
fn lenient_coordinate<'de, D>(
    deserializer: D,
    valid: fn(f64) -> bool,
) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_f64().filter(|v| valid(*v)))
}

fn lenient_latitude<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_coordinate(deserializer, valid_latitude)
}

fn lenient_longitude<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_coordinate(deserializer, valid_longitude)
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
