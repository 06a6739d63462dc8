//! Section composer: turns a caller-requested section list into the final
//! ordered, deduplicated outline for one document.
//!
//! Steps, in order:
//! 1. caller keys, first occurrence wins
//! 2. capability-triggered auto sections (`map` when lat/lng are present)
//! 3. mandatory `summary`, then `footer`
//!
//! Every step is "ensure present" against a uniqueness set, so composing an
//! already-composed outline against the same context changes nothing.
//! `requires` is never used to drop a section; see `validate_outline`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::context::ReportContext;

use super::registry::SectionRegistry;
use super::types::{OutlineWarning, RenderedSection, SectionKey};

/// Sections every outline carries exactly once, appended in this order.
pub const MANDATORY_SECTIONS: [SectionKey; 2] = [SectionKey::Summary, SectionKey::Footer];

/// Final ordered list of unique section keys for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComposedOutline(Vec<SectionKey>);

impl ComposedOutline {
    pub fn as_slice(&self) -> &[SectionKey] {
        &self.0
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.0.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionKey> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<SectionKey> {
        self.0
    }
}

/// Insertion-ordered unique set.
#[derive(Default)]
struct OutlineBuilder {
    order: Vec<SectionKey>,
    seen: HashSet<SectionKey>,
}

impl OutlineBuilder {
    fn ensure(&mut self, key: SectionKey) {
        if self.seen.insert(key) {
            self.order.push(key);
        }
    }

    fn finish(self) -> ComposedOutline {
        ComposedOutline(self.order)
    }
}

/// Composes outlines against a shared registry.
#[derive(Debug, Clone, Copy)]
pub struct SectionComposer<'a> {
    registry: &'a SectionRegistry,
}

impl<'a> SectionComposer<'a> {
    pub fn new(registry: &'a SectionRegistry) -> Self {
        Self { registry }
    }

    pub fn compose(&self, base: &[SectionKey], ctx: &ReportContext) -> ComposedOutline {
        let mut builder = OutlineBuilder::default();

        for key in base {
            builder.ensure(*key);
        }

        for def in self.registry.auto_sections() {
            if def.is_satisfied_by(ctx) {
                builder.ensure(def.key);
            }
        }

        for key in MANDATORY_SECTIONS {
            builder.ensure(key);
        }

        builder.finish()
    }

    /// Compose from persisted key strings, dropping keys the registry no
    /// longer knows.
    pub fn compose_persisted(&self, raw_keys: &[String], ctx: &ReportContext) -> ComposedOutline {
        let base: Vec<SectionKey> = raw_keys
            .iter()
            .filter_map(|raw| self.registry.lookup(raw).map(|def| def.key))
            .collect();
        self.compose(&base, ctx)
    }

    /// Sections in `outline` whose declared capabilities are absent. Nothing
    /// is removed; this is advisory output for template tooling.
    pub fn validate_outline(
        &self,
        outline: &ComposedOutline,
        ctx: &ReportContext,
    ) -> Vec<OutlineWarning> {
        outline
            .iter()
            .filter_map(|key| self.registry.get(*key))
            .filter_map(|def| {
                let missing = def.missing_capabilities(ctx);
                (!missing.is_empty()).then_some(OutlineWarning {
                    section: def.key,
                    missing,
                })
            })
            .collect()
    }

    /// Invoke each section's render hook once, in outline order.
    pub fn render_outline(
        &self,
        outline: &ComposedOutline,
        ctx: &ReportContext,
    ) -> Vec<RenderedSection> {
        outline
            .iter()
            .filter_map(|key| {
                let Some(def) = self.registry.get(*key) else {
                    tracing::warn!(section = %key, "Section not in registry, not rendered");
                    return None;
                };
                Some(RenderedSection {
                    key: def.key,
                    title: def.title.to_string(),
                    body: (def.render)(ctx),
                })
            })
            .collect()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
