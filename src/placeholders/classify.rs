//! Template classification: decides which field bundle a template needs
//! from its slug alone.
//!
//! Ordered rule table, first match wins. Claim keywords sit ahead of retail
//! keywords, so a slug matching both resolves to the claim bundle. A slug
//! matching nothing falls back to the claim bundle too.

use serde::{Deserialize, Serialize};

use super::schema::PlaceholderGroup;

/// The two alternative field bundles layered on top of the base groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateBundle {
    /// Insurance-claim documents: inspections, rebuttals, appraisals.
    ClaimHeavy,
    /// Retail documents: estimates, proposals, warranties.
    RetailHeavy,
}

impl TemplateBundle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimHeavy => "claim_heavy",
            Self::RetailHeavy => "retail_heavy",
        }
    }

    /// Groups contributed by this bundle.
    pub fn groups(&self) -> &'static [PlaceholderGroup] {
        match self {
            Self::ClaimHeavy => &[
                PlaceholderGroup::Claim,
                PlaceholderGroup::Weather,
                PlaceholderGroup::Photos,
                PlaceholderGroup::Findings,
                PlaceholderGroup::Notes,
            ],
            Self::RetailHeavy => &[
                PlaceholderGroup::Job,
                PlaceholderGroup::ScopeItems,
                PlaceholderGroup::Photos,
                PlaceholderGroup::Notes,
            ],
        }
    }
}

/// Keyword → bundle. Order is significant.
pub const CLASSIFICATION_RULES: &[(&str, TemplateBundle)] = &[
    ("claim", TemplateBundle::ClaimHeavy),
    ("damage", TemplateBundle::ClaimHeavy),
    ("inspection", TemplateBundle::ClaimHeavy),
    ("weather", TemplateBundle::ClaimHeavy),
    ("rebuttal", TemplateBundle::ClaimHeavy),
    ("depreciation", TemplateBundle::ClaimHeavy),
    ("bad-faith", TemplateBundle::ClaimHeavy),
    ("appraisal", TemplateBundle::ClaimHeavy),
    ("umpire", TemplateBundle::ClaimHeavy),
    ("expert", TemplateBundle::ClaimHeavy),
    ("litigation", TemplateBundle::ClaimHeavy),
    ("estimate", TemplateBundle::RetailHeavy),
    ("quote", TemplateBundle::RetailHeavy),
    ("proposal", TemplateBundle::RetailHeavy),
    ("authorization", TemplateBundle::RetailHeavy),
    ("warranty", TemplateBundle::RetailHeavy),
    ("maintenance", TemplateBundle::RetailHeavy),
];

/// Outcome of classifying one slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub bundle: TemplateBundle,
    /// Keyword that decided the bundle; `None` when the default applied.
    pub matched_keyword: Option<&'static str>,
}

/// Classify a template slug. Matching is ASCII case-insensitive.
pub fn classify_template(slug: &str) -> Classification {
    let normalized = slug.to_ascii_lowercase();

    CLASSIFICATION_RULES
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|&(keyword, bundle)| Classification {
            bundle,
            matched_keyword: Some(keyword),
        })
        .unwrap_or(Classification {
            bundle: TemplateBundle::ClaimHeavy,
            matched_keyword: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_keywords_precede_retail_keywords() {
        let first_retail = CLASSIFICATION_RULES
            .iter()
            .position(|(_, b)| *b == TemplateBundle::RetailHeavy)
            .unwrap();
        assert!(CLASSIFICATION_RULES[first_retail..]
            .iter()
            .all(|(_, b)| *b == TemplateBundle::RetailHeavy));
    }

    #[test]
    fn claim_slug_is_claim_heavy() {
        let c = classify_template("hail-damage-inspection-report");
        assert_eq!(c.bundle, TemplateBundle::ClaimHeavy);
        assert_eq!(c.matched_keyword, Some("damage"));
    }

    #[test]
    fn retail_slug_is_retail_heavy() {
        let c = classify_template("retail-proposal-estimate");
        assert_eq!(c.bundle, TemplateBundle::RetailHeavy);
        assert_eq!(c.matched_keyword, Some("estimate"));
    }

    #[test]
    fn overlap_resolves_to_claim() {
        for slug in [
            "claim-estimate",
            "depreciation-quote",
            "warranty-expert-letter",
            "maintenance-weather-log",
        ] {
            assert_eq!(
                classify_template(slug).bundle,
                TemplateBundle::ClaimHeavy,
                "{slug} matches both keyword sets"
            );
        }
    }

    #[test]
    fn unmatched_and_empty_default_to_claim() {
        for slug in ["", "cover-letter", "   ", "ünïcødé-☂"] {
            let c = classify_template(slug);
            assert_eq!(c.bundle, TemplateBundle::ClaimHeavy);
            assert_eq!(c.matched_keyword, None);
        }
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(
            classify_template("Roof-WARRANTY").bundle,
            TemplateBundle::RetailHeavy
        );
    }

    #[test]
    fn bad_faith_requires_hyphenated_form() {
        assert_eq!(
            classify_template("bad-faith-demand").matched_keyword,
            Some("bad-faith")
        );
    }
}
