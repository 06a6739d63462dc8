//! Placeholder resolver: flattens the static schema into dot/bracket paths
//! and derives the required path set for a template.
//!
//! Pure functions over static data: no I/O, no randomness, no panics for any
//! input string.

use std::collections::{BTreeMap, BTreeSet};

use super::classify::{classify_template, TemplateBundle};
use super::schema::{PlaceholderGroup, SchemaNode};

/// A flattened locator into report data, e.g. `claim.claimNumber` or
/// `photos[].caption`.
pub type PlaceholderPath = String;

/// Category hint that is accepted but has no effect on requirements yet.
const LEGAL_CATEGORY: &str = "legal";

const ARRAY_SUFFIX: &str = "[]";

// ═══════════════════════════════════════════
// Schema flattening
// ═══════════════════════════════════════════

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn walk_schema(prefix: &str, node: &SchemaNode, out: &mut BTreeSet<PlaceholderPath>) {
    match node {
        SchemaNode::Field => {
            out.insert(prefix.to_string());
        }
        SchemaNode::Object(children) => {
            for (name, child) in children.iter() {
                walk_schema(&join(prefix, name), child, out);
            }
        }
        SchemaNode::List(element) => {
            walk_schema(&format!("{prefix}{ARRAY_SUFFIX}"), element, out);
        }
    }
}

fn group_paths(group: PlaceholderGroup) -> BTreeSet<PlaceholderPath> {
    let mut out = BTreeSet::new();
    walk_schema(group.as_str(), group.schema(), &mut out);
    out
}

/// Every placeholder path in the schema, sorted and deduplicated.
pub fn list_all_placeholder_paths() -> Vec<PlaceholderPath> {
    PlaceholderGroup::all()
        .iter()
        .flat_map(|g| group_paths(*g))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Placeholder paths keyed by group, each list sorted.
pub fn list_placeholder_paths_by_group() -> BTreeMap<PlaceholderGroup, Vec<PlaceholderPath>> {
    PlaceholderGroup::all()
        .iter()
        .map(|g| (*g, group_paths(*g).into_iter().collect()))
        .collect()
}

// ═══════════════════════════════════════════
// Required placeholders
// ═══════════════════════════════════════════

/// Groups a template needs: base groups plus its classified bundle.
pub fn required_groups(slug: &str, category: Option<&str>) -> Vec<PlaceholderGroup> {
    let classification = classify_template(slug);

    if category.is_some_and(|c| c.eq_ignore_ascii_case(LEGAL_CATEGORY)) {
        // Accepted for forward compatibility; does not change requirements.
        tracing::debug!(slug, "Legal category hint has no effect on required placeholders");
    }

    let mut groups: BTreeSet<PlaceholderGroup> =
        PlaceholderGroup::base().iter().copied().collect();
    groups.extend(classification.bundle.groups().iter().copied());
    groups.into_iter().collect()
}

/// The sorted, deduplicated set of paths a template must supply.
///
/// Base groups (org, employee, client, property) are always present, plus
/// exactly one of the claim-oriented or retail-oriented bundles.
pub fn get_required_placeholders(slug: &str, category: Option<&str>) -> Vec<PlaceholderPath> {
    required_groups(slug, category)
        .into_iter()
        .flat_map(group_paths)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Convenience: is this slug served by the retail bundle?
pub fn is_retail_template(slug: &str) -> bool {
    classify_template(slug).bundle == TemplateBundle::RetailHeavy
}

// ═══════════════════════════════════════════
// Filled data checks
// ═══════════════════════════════════════════

fn walk_value(prefix: &str, value: &serde_json::Value, out: &mut BTreeSet<PlaceholderPath>) {
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Object(map) => {
            for (name, child) in map {
                walk_value(&join(prefix, name), child, out);
            }
        }
        serde_json::Value::Array(items) => {
            let element_prefix = format!("{prefix}{ARRAY_SUFFIX}");
            match items.first() {
                Some(first) => walk_value(&element_prefix, first, out),
                None => {
                    out.insert(element_prefix);
                }
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string());
            }
        }
    }
}

/// Flatten filled report data the same way the schema is flattened.
///
/// Only the first element of each array is consulted. Empty arrays yield
/// their bare `group[]` path; null leaves are omitted.
pub fn data_paths(data: &serde_json::Value) -> Vec<PlaceholderPath> {
    let mut out = BTreeSet::new();
    walk_value("", data, &mut out);
    out.into_iter().collect()
}

/// Is `path` supplied by `data`?
///
/// `[]` segments step into the first element. A present but empty array
/// supplies every path beneath it.
fn is_supplied(data: &serde_json::Value, path: &str) -> bool {
    let mut current = data;
    for segment in path.split('.') {
        let (name, is_array) = match segment.strip_suffix(ARRAY_SUFFIX) {
            Some(name) => (name, true),
            None => (segment, false),
        };
        let Some(next) = current.get(name) else {
            return false;
        };
        if !is_array {
            current = next;
            continue;
        }
        let Some(items) = next.as_array() else {
            return false;
        };
        match items.first() {
            Some(first) => current = first,
            None => return true,
        }
    }
    !current.is_null()
}

/// Required paths the filled `data` does not supply, sorted.
pub fn missing_placeholders(
    data: &serde_json::Value,
    required: &[PlaceholderPath],
) -> Vec<PlaceholderPath> {
    required
        .iter()
        .filter(|path| !is_supplied(data, path))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
