//! Core section types: closed key set, static definitions, rendered output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{Capability, ReportContext};

// ═══════════════════════════════════════════
// Section Key
// ═══════════════════════════════════════════

/// Every section a report outline can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Cover,
    Summary,
    Photos,
    Map,
    Weather,
    Findings,
    Scope,
    Vendor,
    Notes,
    Signature,
    Footer,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Summary => "summary",
            Self::Photos => "photos",
            Self::Map => "map",
            Self::Weather => "weather",
            Self::Findings => "findings",
            Self::Scope => "scope",
            Self::Vendor => "vendor",
            Self::Notes => "notes",
            Self::Signature => "signature",
            Self::Footer => "footer",
        }
    }

    /// Parse a persisted key. Unknown keys are `None`, never an error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "cover" => Some(Self::Cover),
            "summary" => Some(Self::Summary),
            "photos" => Some(Self::Photos),
            "map" => Some(Self::Map),
            "weather" => Some(Self::Weather),
            "findings" => Some(Self::Findings),
            "scope" => Some(Self::Scope),
            "vendor" => Some(Self::Vendor),
            "notes" => Some(Self::Notes),
            "signature" => Some(Self::Signature),
            "footer" => Some(Self::Footer),
            _ => None,
        }
    }

    pub fn all() -> &'static [SectionKey] {
        &[
            Self::Cover,
            Self::Summary,
            Self::Photos,
            Self::Map,
            Self::Weather,
            Self::Findings,
            Self::Scope,
            Self::Vendor,
            Self::Notes,
            Self::Signature,
            Self::Footer,
        ]
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════
// Section Definition
// ═══════════════════════════════════════════

/// Produces the renderer payload for one section.
pub type RenderHook = fn(&ReportContext) -> serde_json::Value;

/// Static definition of one document section.
#[derive(Debug, Clone)]
pub struct SectionDef {
    pub key: SectionKey,
    pub title: &'static str,
    /// Injected by the composer when every `requires` capability is present.
    pub auto: bool,
    /// Marks the section as single-instance for editors. Descriptive: the
    /// composer keeps every key once whatever this says.
    pub dedupe: bool,
    /// Capabilities the section draws on. Descriptive: the composer never
    /// filters on it.
    pub requires: &'static [Capability],
    pub render: RenderHook,
}

impl SectionDef {
    /// Required capabilities absent from `ctx`.
    pub fn missing_capabilities(&self, ctx: &ReportContext) -> Vec<Capability> {
        self.requires
            .iter()
            .copied()
            .filter(|c| !ctx.has(*c))
            .collect()
    }

    pub fn is_satisfied_by(&self, ctx: &ReportContext) -> bool {
        self.requires.iter().all(|c| ctx.has(*c))
    }
}

// ═══════════════════════════════════════════
// Rendered output
// ═══════════════════════════════════════════

/// One section as handed to the document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSection {
    pub key: SectionKey,
    pub title: String,
    pub body: serde_json::Value,
}

/// A section whose declared capabilities are missing from the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineWarning {
    pub section: SectionKey,
    pub missing: Vec<Capability>,
}
