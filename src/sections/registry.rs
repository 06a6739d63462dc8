//! Section registry: the catalog of document sections, built once at
//! process start and shared by reference.

use crate::context::Capability;

use super::render;
use super::types::{SectionDef, SectionKey};

/// Ordered, read-only catalog of section definitions.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: Vec<SectionDef>,
}

impl SectionRegistry {
    /// Build from explicit definitions. A repeated key keeps its first
    /// definition.
    pub fn with_sections(definitions: Vec<SectionDef>) -> Self {
        let mut sections: Vec<SectionDef> = Vec::with_capacity(definitions.len());
        for def in definitions {
            if sections.iter().any(|s| s.key == def.key) {
                tracing::warn!(section = %def.key, "Duplicate section definition ignored");
                continue;
            }
            sections.push(def);
        }
        Self { sections }
    }

    /// The standard roofing report catalog.
    pub fn standard() -> Self {
        Self::with_sections(vec![
            SectionDef {
                key: SectionKey::Cover,
                title: "Cover Page",
                auto: false,
                dedupe: true,
                requires: &[Capability::Branding],
                render: render::render_cover,
            },
            SectionDef {
                key: SectionKey::Summary,
                title: "Executive Summary",
                auto: false,
                dedupe: true,
                requires: &[],
                render: render::render_summary,
            },
            SectionDef {
                key: SectionKey::Photos,
                title: "Photo Documentation",
                auto: false,
                dedupe: false,
                requires: &[Capability::Photos],
                render: render::render_photos,
            },
            SectionDef {
                key: SectionKey::Map,
                title: "Property Location",
                auto: true,
                dedupe: true,
                requires: &[Capability::Latlng],
                render: render::render_map,
            },
            SectionDef {
                key: SectionKey::Weather,
                title: "Weather History",
                auto: false,
                dedupe: false,
                requires: &[],
                render: render::render_weather,
            },
            SectionDef {
                key: SectionKey::Findings,
                title: "Inspection Findings",
                auto: false,
                dedupe: false,
                requires: &[],
                render: render::render_findings,
            },
            SectionDef {
                key: SectionKey::Scope,
                title: "Scope of Work",
                auto: false,
                dedupe: false,
                requires: &[],
                render: render::render_scope,
            },
            SectionDef {
                key: SectionKey::Vendor,
                title: "Vendor & Materials",
                auto: false,
                dedupe: false,
                requires: &[Capability::Vendor],
                render: render::render_vendor,
            },
            SectionDef {
                key: SectionKey::Notes,
                title: "Notes",
                auto: false,
                dedupe: false,
                requires: &[],
                render: render::render_notes,
            },
            SectionDef {
                key: SectionKey::Signature,
                title: "Authorization & Signature",
                auto: false,
                dedupe: true,
                requires: &[],
                render: render::render_signature,
            },
            SectionDef {
                key: SectionKey::Footer,
                title: "Footer",
                auto: false,
                dedupe: true,
                requires: &[],
                render: render::render_footer,
            },
        ])
    }

    pub fn get(&self, key: SectionKey) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Resolve a persisted key string. Keys removed from the catalog (or
    /// never known) resolve to `None`.
    pub fn lookup(&self, raw: &str) -> Option<&SectionDef> {
        let def = SectionKey::parse(raw).and_then(|key| self.get(key));
        if def.is_none() {
            tracing::warn!(section = raw, "Unknown section key, skipping");
        }
        def
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDef> {
        self.sections.iter()
    }

    /// Sections the composer injects on its own when their capabilities
    /// are present.
    pub fn auto_sections(&self) -> impl Iterator<Item = &SectionDef> {
        self.sections.iter().filter(|s| s.auto)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
