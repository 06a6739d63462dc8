//! Static placeholder schema: every field a report template may reference,
//! grouped by the domain object that supplies it.
//!
//! Arrays hold a single element shape; the schema never varies per index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One node of the static schema tree.
#[derive(Debug, PartialEq, Eq)]
pub enum SchemaNode {
    /// A scalar leaf.
    Field,
    /// Named children, in declaration order.
    Object(&'static [(&'static str, SchemaNode)]),
    /// A list whose elements all share this shape.
    List(&'static SchemaNode),
}

/// Top-level placeholder groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlaceholderGroup {
    #[serde(rename = "org")]
    Org,
    #[serde(rename = "employee")]
    Employee,
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "property")]
    Property,
    #[serde(rename = "claim")]
    Claim,
    #[serde(rename = "job")]
    Job,
    #[serde(rename = "weather")]
    Weather,
    #[serde(rename = "photos")]
    Photos,
    #[serde(rename = "findings")]
    Findings,
    #[serde(rename = "scopeItems")]
    ScopeItems,
    #[serde(rename = "notes")]
    Notes,
}

impl PlaceholderGroup {
    /// Data key of the group, as it appears in placeholder paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Org => "org",
            Self::Employee => "employee",
            Self::Client => "client",
            Self::Property => "property",
            Self::Claim => "claim",
            Self::Job => "job",
            Self::Weather => "weather",
            Self::Photos => "photos",
            Self::Findings => "findings",
            Self::ScopeItems => "scopeItems",
            Self::Notes => "notes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|g| g.as_str() == s)
    }

    pub fn all() -> &'static [PlaceholderGroup] {
        &[
            Self::Org,
            Self::Employee,
            Self::Client,
            Self::Property,
            Self::Claim,
            Self::Job,
            Self::Weather,
            Self::Photos,
            Self::Findings,
            Self::ScopeItems,
            Self::Notes,
        ]
    }

    /// Groups every template needs regardless of classification.
    pub fn base() -> &'static [PlaceholderGroup] {
        &[Self::Org, Self::Employee, Self::Client, Self::Property]
    }

    /// Schema subtree for this group.
    pub fn schema(&self) -> &'static SchemaNode {
        match self {
            Self::Org => &ORG,
            Self::Employee => &EMPLOYEE,
            Self::Client => &CLIENT,
            Self::Property => &PROPERTY,
            Self::Claim => &CLAIM,
            Self::Job => &JOB,
            Self::Weather => &WEATHER,
            Self::Photos => &PHOTOS,
            Self::Findings => &FINDINGS,
            Self::ScopeItems => &SCOPE_ITEMS,
            Self::Notes => &NOTES,
        }
    }
}

impl fmt::Display for PlaceholderGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Group schemas ───────────────────────────────────────────────────────────

const ADDRESS: SchemaNode = SchemaNode::Object(&[
    ("street", SchemaNode::Field),
    ("city", SchemaNode::Field),
    ("state", SchemaNode::Field),
    ("zip", SchemaNode::Field),
]);

const CONTACT: SchemaNode = SchemaNode::Object(&[
    ("name", SchemaNode::Field),
    ("phone", SchemaNode::Field),
    ("email", SchemaNode::Field),
]);

static ORG: SchemaNode = SchemaNode::Object(&[
    ("name", SchemaNode::Field),
    ("phone", SchemaNode::Field),
    ("email", SchemaNode::Field),
    ("website", SchemaNode::Field),
    ("licenseNumber", SchemaNode::Field),
    ("logoUrl", SchemaNode::Field),
    ("address", ADDRESS),
]);

static EMPLOYEE: SchemaNode = SchemaNode::Object(&[
    ("name", SchemaNode::Field),
    ("title", SchemaNode::Field),
    ("phone", SchemaNode::Field),
    ("email", SchemaNode::Field),
]);

static CLIENT: SchemaNode = CONTACT;

static PROPERTY: SchemaNode = SchemaNode::Object(&[
    ("address", ADDRESS),
    ("roofType", SchemaNode::Field),
    ("roofAge", SchemaNode::Field),
    ("stories", SchemaNode::Field),
    ("pitch", SchemaNode::Field),
]);

static CLAIM: SchemaNode = SchemaNode::Object(&[
    ("claimNumber", SchemaNode::Field),
    ("policyNumber", SchemaNode::Field),
    ("carrier", SchemaNode::Field),
    ("dateOfLoss", SchemaNode::Field),
    ("deductible", SchemaNode::Field),
    ("status", SchemaNode::Field),
    ("adjuster", CONTACT),
    ("perils", SchemaNode::List(&SchemaNode::Field)),
]);

static JOB: SchemaNode = SchemaNode::Object(&[
    ("jobNumber", SchemaNode::Field),
    ("type", SchemaNode::Field),
    ("status", SchemaNode::Field),
    ("startDate", SchemaNode::Field),
    ("total", SchemaNode::Field),
]);

static WEATHER: SchemaNode = SchemaNode::Object(&[
    ("stormDate", SchemaNode::Field),
    ("eventType", SchemaNode::Field),
    ("hailSize", SchemaNode::Field),
    ("windSpeed", SchemaNode::Field),
    ("source", SchemaNode::Field),
]);

static PHOTOS: SchemaNode = SchemaNode::List(&SchemaNode::Object(&[
    ("url", SchemaNode::Field),
    ("caption", SchemaNode::Field),
    ("tag", SchemaNode::Field),
    ("takenAt", SchemaNode::Field),
]));

static FINDINGS: SchemaNode = SchemaNode::List(&SchemaNode::Object(&[
    ("area", SchemaNode::Field),
    ("description", SchemaNode::Field),
    ("severity", SchemaNode::Field),
    ("photoRefs", SchemaNode::List(&SchemaNode::Field)),
]));

static SCOPE_ITEMS: SchemaNode = SchemaNode::List(&SchemaNode::Object(&[
    ("code", SchemaNode::Field),
    ("description", SchemaNode::Field),
    ("quantity", SchemaNode::Field),
    ("unit", SchemaNode::Field),
    ("unitPrice", SchemaNode::Field),
    ("total", SchemaNode::Field),
]));

static NOTES: SchemaNode = SchemaNode::List(&SchemaNode::Object(&[
    ("author", SchemaNode::Field),
    ("body", SchemaNode::Field),
    ("createdAt", SchemaNode::Field),
]));
